// src/models/email.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "email_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailStatus {
    Sent,
    Delivered,
    Opened,
    Failed,
    Bounced,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: Uuid,
    pub company_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub sent_by_id: Uuid,

    #[schema(example = "Uppföljning")]
    pub subject: String,
    // HTML já com a referência de rastreamento
    pub content: String,
    #[schema(example = "anna@kund.se")]
    pub recipient_email: String,
    pub sender_email: String,

    pub status: EmailStatus,

    // Token único e imutável
    pub tracking_id: String,
    pub opened_at: Option<DateTime<Utc>>,
    // Só cresce
    pub open_count: i32,

    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub company_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub sent_by_id: Uuid,
    pub subject: String,
    pub content: String,
    pub recipient_email: String,
    pub sender_email: String,
    pub tracking_id: String,
}

// O que o remetente pediu para enviar (antes do rastreamento)
#[derive(Debug, Clone)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub content: String,
    pub lead_id: Option<Uuid>,
}
