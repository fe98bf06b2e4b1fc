// src/services/email_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{EmailLogStore, LeadStore},
    integrations::{MailError, MailProvider, OutboundEmail},
    models::{
        auth::Principal,
        email::{EmailDraft, EmailLog, NewEmailLog},
    },
    services::visibility::{scope, Operation, Resource},
};

/// Token novo: UUID v4 em hex minúsculo, sem hífens (32 caracteres).
pub fn new_tracking_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Só tokens neste formato chegam ao banco.
pub fn is_tracking_token(candidate: &str) -> bool {
    candidate.len() == 32 && candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub fn tracking_pixel(app_url: &str, token: &str) -> String {
    format!(
        r#"<img src="{}/api/email/track/{}" width="1" height="1" style="display:none;" alt="" />"#,
        app_url, token
    )
}

pub fn with_tracking(content: &str, app_url: &str, token: &str) -> String {
    format!("{}\n{}", content, tracking_pixel(app_url, token))
}

// "Nome <endereco@dominio>" -> "endereco@dominio"
fn mailbox_address(from: &str) -> String {
    match (from.find('<'), from.rfind('>')) {
        (Some(start), Some(end)) if start < end => from[start + 1..end].trim().to_string(),
        _ => from.trim().to_string(),
    }
}

#[derive(Clone)]
pub struct EmailService {
    mail: Arc<dyn MailProvider>,
    logs: Arc<dyn EmailLogStore>,
    leads: Arc<dyn LeadStore>,
    app_url: String,
    from: String,
    sender_email: String,
}

impl EmailService {
    pub fn new(
        mail: Arc<dyn MailProvider>,
        logs: Arc<dyn EmailLogStore>,
        leads: Arc<dyn LeadStore>,
        app_url: &str,
        from: &str,
    ) -> Self {
        Self {
            mail,
            logs,
            leads,
            app_url: app_url.trim_end_matches('/').to_string(),
            from: from.to_string(),
            sender_email: mailbox_address(from),
        }
    }

    /// Envia e registra. Falha no provedor não deixa log nenhum para trás.
    pub async fn send(&self, principal: &Principal, draft: EmailDraft) -> Result<EmailLog, AppError> {
        let log_scope = scope(principal, Resource::EmailLog, Operation::Write)?;

        if let Some(lead_id) = draft.lead_id {
            let lead_scope = scope(principal, Resource::Lead, Operation::Write)?;
            self.leads
                .find(&lead_scope, lead_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let tracking_id = new_tracking_token();
        let html = with_tracking(&draft.content, &self.app_url, &tracking_id);

        let provider_id = self
            .mail
            .send(&OutboundEmail {
                from: self.from.clone(),
                to: draft.to.clone(),
                subject: draft.subject.clone(),
                html: html.clone(),
            })
            .await
            .map_err(|e| match e {
                MailError::Rejected(reason) => AppError::DispatchFailure(reason),
                MailError::Transport(err) => AppError::DispatchFailure(err.to_string()),
            })?;

        let log = self
            .logs
            .insert(NewEmailLog {
                company_id: log_scope.company_id(),
                lead_id: draft.lead_id,
                sent_by_id: principal.id,
                subject: draft.subject,
                content: html,
                recipient_email: draft.to,
                sender_email: self.sender_email.clone(),
                tracking_id: tracking_id.clone(),
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    tracking_id = %tracking_id,
                    provider_id = %provider_id,
                    "E-mail enviado mas não registrado: {:?}",
                    e
                );
            })?;

        tracing::info!(email_log_id = %log.id, provider_id = %provider_id, "📧 E-mail enviado");
        Ok(log)
    }

    /// `true` se alguma linha foi atualizada. Token desconhecido ou malformado não é erro.
    pub async fn record_open(&self, token: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        if !is_tracking_token(token) {
            tracing::debug!("Token de rastreamento malformado ignorado");
            return Ok(false);
        }

        let updated = self.logs.record_open(token, at).await?;
        if updated.is_none() {
            tracing::debug!(tracking_id = %token, "Token de rastreamento desconhecido");
        }
        Ok(updated.is_some())
    }

    pub async fn list(
        &self,
        principal: &Principal,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<EmailLog>, i64), AppError> {
        let scope = scope(principal, Resource::EmailLog, Operation::Read)?;
        self.logs.list(&scope, lead_id, page).await
    }
}
