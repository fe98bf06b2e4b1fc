// src/services/company_service.rs

use std::sync::Arc;

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::CompanyStore,
    models::{
        auth::{Principal, Role},
        company::Company,
    },
};

#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyStore>,
}

impl CompanyService {
    pub fn new(companies: Arc<dyn CompanyStore>) -> Self {
        Self { companies }
    }

    // Sempre a empresa do próprio principal: não existe acesso por ID arbitrário.
    pub async fn current(&self, principal: &Principal) -> Result<Company, AppError> {
        if !principal.active {
            return Err(AppError::ProfileMissing);
        }
        self.companies
            .find(principal.company_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_settings(&self, principal: &Principal, settings: Value) -> Result<Company, AppError> {
        if !principal.active {
            return Err(AppError::ProfileMissing);
        }
        match principal.role {
            Role::Admin => {}
            Role::User => return Err(AppError::Forbidden),
        }
        if !settings.is_object() {
            return Err(AppError::invalid("settings", "As configurações devem ser um objeto JSON."));
        }

        let company = self
            .companies
            .update_settings(principal.company_id, &settings)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(company_id = %company.id, "Configurações da empresa atualizadas");
        Ok(company)
    }
}
