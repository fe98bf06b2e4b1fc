// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use utoipa::ToSchema;

// ---
// Papel do usuário dentro da empresa
// ---
// Fechado em duas variantes: toda decisão de política faz `match` exaustivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

// Representa um perfil vindo do banco de dados (tabela user_profiles)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    // ID do usuário no provedor de sessão
    pub user_id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "anna@empresa.se")]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para criar um perfil (caminho de onboarding)
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

// ---
// Principal: identidade + tenant + papel, derivado a cada requisição
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// ID do perfil (é o que `assigned_to_id`, `sent_by_id` etc. referenciam)
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
    pub active: bool,
}

impl From<&UserProfile> for Principal {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            company_id: profile.company_id,
            role: profile.role,
            active: profile.is_active,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT de sessão
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário no provedor)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    // Metadados livres do cadastro (nome, empresa...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}

impl Claims {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
