// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

// ---
// Company (o "Tenant")
// ---
// Raiz de todos os dados; nunca é apagada em operação normal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    #[schema(example = "Demo Company AB")]
    pub name: String,

    #[schema(example = "demo-company-ab")]
    pub slug: String,

    #[schema(example = "demo.com")]
    pub domain: Option<String>,

    // Mapa opaco (assinatura de e-mail, fuso horário...)
    #[schema(value_type = Object, example = json!({"timezone": "Europe/Stockholm"}))]
    pub settings: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gera o slug do jeito que o onboarding sempre gerou:
/// minúsculas e tudo fora de `[a-z0-9]` vira `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_replaces_everything_outside_ascii_alnum() {
        assert_eq!(slugify("Demo Company"), "demo-company");
        assert_eq!(slugify("Åkesson & Co AB"), "-kesson---co-ab");
        assert_eq!(slugify("acme42"), "acme42");
    }
}
