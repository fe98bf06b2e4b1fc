// src/services/onboarding_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{CompanyStore, ProfileStore},
    models::{
        auth::{Claims, NewProfile, Role, UserProfile},
        company::slugify,
    },
};

pub const DEMO_COMPANY_NAME: &str = "Demo Company";
pub const DEMO_COMPANY_SLUG: &str = "demo-company";

/// Caminho elevado de bootstrap: é o único lugar que cria empresas e
/// perfis sem um Principal (o usuário ainda não tem um).
#[derive(Clone)]
pub struct OnboardingService {
    profiles: Arc<dyn ProfileStore>,
    companies: Arc<dyn CompanyStore>,
}

impl OnboardingService {
    pub fn new(profiles: Arc<dyn ProfileStore>, companies: Arc<dyn CompanyStore>) -> Self {
        Self { profiles, companies }
    }

    /// Garante o perfil do usuário da sessão. O `bool` diz se ele foi criado agora.
    pub async fn provision(&self, claims: &Claims) -> Result<(UserProfile, bool), AppError> {
        if let Some(existing) = self.profiles.find_by_user_id(claims.sub).await? {
            return Ok((existing, false));
        }

        let email = claims
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::invalid("email", "A sessão não traz um e-mail."))?;

        // Empresa informada no cadastro vira um tenant próprio; sem ela o
        // usuário cai na empresa de demonstração.
        let (company, role) = match claims.metadata_str("company_name") {
            Some(name) if name != DEMO_COMPANY_NAME => {
                let (company, created) = self.companies.ensure_by_slug(name, &slugify(name)).await?;
                // Só quem cria a empresa vira ADMIN; entrar numa existente pelo nome não dá privilégio.
                let role = if created { Role::Admin } else { Role::User };
                (company, role)
            }
            _ => {
                let (company, _) = self
                    .companies
                    .ensure_by_slug(DEMO_COMPANY_NAME, DEMO_COMPANY_SLUG)
                    .await?;
                (company, Role::User)
            }
        };

        let new_profile = NewProfile {
            user_id: claims.sub,
            company_id: company.id,
            email,
            first_name: claims.metadata_str("first_name").map(str::to_string),
            last_name: claims.metadata_str("last_name").map(str::to_string),
            role,
        };

        match self.profiles.create(new_profile).await {
            Ok(profile) => {
                tracing::info!(
                    user_id = %profile.user_id,
                    company_id = %profile.company_id,
                    role = ?profile.role,
                    "👤 Perfil provisionado"
                );
                Ok((profile, true))
            }
            // Corrida com outro callback do mesmo usuário: o perfil já existe.
            Err(AppError::InvalidInput { field: "userId", .. }) => {
                let existing = self
                    .profiles
                    .find_by_user_id(claims.sub)
                    .await?
                    .ok_or(AppError::ProfileMissing)?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{claims_for, MemoryDb};
    use serde_json::json;
    use uuid::Uuid;

    fn service(db: &Arc<MemoryDb>) -> OnboardingService {
        OnboardingService::new(db.clone(), db.clone())
    }

    #[tokio::test]
    async fn new_company_makes_the_user_its_admin() {
        let db = MemoryDb::new();
        let mut claims = claims_for(Uuid::new_v4());
        claims.user_metadata = Some(json!({
            "company_name": "Kund AB",
            "first_name": "Anna",
            "last_name": "Svensson",
        }));

        let (profile, created) = service(&db).provision(&claims).await.unwrap();

        assert!(created);
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.first_name.as_deref(), Some("Anna"));
        let company = db.company(profile.company_id).unwrap();
        assert_eq!(company.slug, "kund-ab");
    }

    #[tokio::test]
    async fn joining_an_existing_company_by_name_is_not_admin() {
        let db = MemoryDb::new();
        let onboarding = service(&db);

        let mut first = claims_for(Uuid::new_v4());
        first.user_metadata = Some(json!({ "company_name": "Kund AB" }));
        let (founder, _) = onboarding.provision(&first).await.unwrap();

        let mut second = claims_for(Uuid::new_v4());
        second.user_metadata = Some(json!({ "company_name": "Kund AB" }));
        let (joiner, _) = onboarding.provision(&second).await.unwrap();

        assert_eq!(joiner.company_id, founder.company_id);
        assert_eq!(joiner.role, Role::User);
    }

    #[tokio::test]
    async fn missing_or_demo_company_lands_in_the_demo_tenant() {
        let db = MemoryDb::new();
        let onboarding = service(&db);

        let (a, _) = onboarding.provision(&claims_for(Uuid::new_v4())).await.unwrap();

        let mut demo = claims_for(Uuid::new_v4());
        demo.user_metadata = Some(json!({ "company_name": "Demo Company" }));
        let (b, _) = onboarding.provision(&demo).await.unwrap();

        assert_eq!(a.company_id, b.company_id);
        assert_eq!(db.company(a.company_id).unwrap().slug, DEMO_COMPANY_SLUG);
        assert_eq!(a.role, Role::User);
        assert_eq!(b.role, Role::User);
    }

    #[tokio::test]
    async fn second_provision_returns_the_existing_profile() {
        let db = MemoryDb::new();
        let onboarding = service(&db);
        let claims = claims_for(Uuid::new_v4());

        let (first, created) = onboarding.provision(&claims).await.unwrap();
        let (again, created_again) = onboarding.provision(&claims).await.unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, again.id);
    }
}
