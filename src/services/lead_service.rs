// src/services/lead_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{LeadStore, ProfileStore, TagStore},
    models::{
        auth::{Principal, Role},
        lead::{Lead, LeadDetail, LeadDraft, LeadFilters, LeadPatch, LeadStatus, NewLead, Tag},
    },
    services::visibility::{scope, Operation, Resource},
};

/// Nomes de tag como o cliente mandou -> nomes a gravar:
/// aparados, sem vazios e sem repetição dentro da mesma submissão.
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !out.iter().any(|seen| seen == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn LeadStore>,
    tags: Arc<dyn TagStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadStore>, tags: Arc<dyn TagStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { leads, tags, profiles }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        mut filters: LeadFilters,
        page: PageRequest,
    ) -> Result<(Vec<Lead>, i64), AppError> {
        let scope = scope(principal, Resource::Lead, Operation::Read)?;

        // Filtro por responsável é coisa de ADMIN; para USER o escopo já decide.
        match principal.role {
            Role::Admin => {}
            Role::User => {
                if filters.assigned_to.take().is_some() {
                    tracing::debug!(profile_id = %principal.id, "Filtro de responsável ignorado para USER");
                }
            }
        }

        self.leads.list(&scope, &filters, page).await
    }

    pub async fn create(
        &self,
        principal: &Principal,
        draft: LeadDraft,
        tag_names: &[String],
    ) -> Result<LeadDetail, AppError> {
        let first_name = draft.first_name.trim();
        if first_name.is_empty() {
            return Err(AppError::invalid("firstName", "O nome é obrigatório."));
        }

        let lead_scope = scope(principal, Resource::Lead, Operation::Write)?;

        let assigned_to_id = match draft.assigned_to_id {
            None => principal.id,
            Some(id) if id == principal.id => id,
            Some(id) => {
                self.ensure_assignable(lead_scope.company_id(), id).await?;
                id
            }
        };

        let lead = self
            .leads
            .insert(NewLead {
                company_id: lead_scope.company_id(),
                created_by_id: principal.id,
                assigned_to_id,
                first_name: first_name.to_string(),
                last_name: draft.last_name,
                email: draft.email,
                phone: draft.phone,
                company: draft.company,
                title: draft.title,
                status: draft.status.unwrap_or(LeadStatus::New),
                notes: draft.notes,
                source: draft.source,
            })
            .await?;

        let tags = self.attach_tags(principal, lead.id, tag_names).await?;

        tracing::info!(
            lead_id = %lead.id,
            company_id = %lead.company_id,
            tags = tags.len(),
            "Lead criado"
        );

        Ok(LeadDetail { lead, tags })
    }

    pub async fn get(&self, principal: &Principal, lead_id: Uuid) -> Result<LeadDetail, AppError> {
        let scope = scope(principal, Resource::Lead, Operation::Read)?;
        let lead = self.leads.find(&scope, lead_id).await?.ok_or(AppError::NotFound)?;
        let tags = self.leads.tags_for(lead.id).await?;
        Ok(LeadDetail { lead, tags })
    }

    pub async fn update(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        mut patch: LeadPatch,
    ) -> Result<LeadDetail, AppError> {
        let scope = scope(principal, Resource::Lead, Operation::Write)?;

        if let Some(name) = patch.first_name.take() {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::invalid("firstName", "O nome não pode ficar vazio."));
            }
            patch.first_name = Some(name.to_string());
        }

        if let Some(assignee) = patch.assigned_to_id {
            match principal.role {
                Role::User => return Err(AppError::Forbidden),
                Role::Admin => self.ensure_assignable(scope.company_id(), assignee).await?,
            }
        }

        let lead = self
            .leads
            .update(&scope, lead_id, &patch)
            .await?
            .ok_or(AppError::NotFound)?;
        let tags = self.leads.tags_for(lead.id).await?;

        Ok(LeadDetail { lead, tags })
    }

    /// Soft delete
    pub async fn deactivate(&self, principal: &Principal, lead_id: Uuid) -> Result<(), AppError> {
        let scope = scope(principal, Resource::Lead, Operation::Write)?;
        if !self.leads.deactivate(&scope, lead_id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(lead_id = %lead_id, "Lead desativado");
        Ok(())
    }

    pub async fn tags(&self, principal: &Principal) -> Result<Vec<Tag>, AppError> {
        let scope = scope(principal, Resource::Tag, Operation::Read)?;
        self.tags.list(&scope).await
    }

    async fn ensure_assignable(&self, company_id: Uuid, profile_id: Uuid) -> Result<(), AppError> {
        self.profiles
            .find_active_in_company(company_id, profile_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                AppError::invalid("assignedToId", "O responsável precisa ser um usuário ativo da mesma empresa.")
            })
    }

    async fn attach_tags(&self, principal: &Principal, lead_id: Uuid, names: &[String]) -> Result<Vec<Tag>, AppError> {
        let names = normalize_tag_names(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let tag_scope = scope(principal, Resource::Tag, Operation::Write)?;
        let mut tag_ids = Vec::with_capacity(names.len());
        for name in &names {
            let tag = self.tags.find_or_create(&tag_scope, name).await?;
            tag_ids.push(tag.id);
        }

        self.leads.link_tags(lead_id, &tag_ids).await?;
        self.leads.tags_for(lead_id).await
    }
}
