// src/models/reminder.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reminder_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReminderStatus {
    Pending,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub lead_id: Uuid,
    // Dono do lembrete
    pub user_id: Uuid,
    #[schema(example = "Ring Anna")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: ReminderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// PENDING vencido é reportado como OVERDUE (derivado na leitura, não gravado).
    pub fn with_effective_status(mut self, now: DateTime<Utc>) -> Self {
        if self.status == ReminderStatus::Pending && self.due_date < now {
            self.status = ReminderStatus::Overdue;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub company_id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}
