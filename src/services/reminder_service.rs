// src/services/reminder_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{LeadStore, ReminderStore},
    models::{
        auth::Principal,
        reminder::{NewReminder, Reminder, ReminderStatus},
    },
    services::visibility::{scope, Operation, Resource},
};

#[derive(Clone)]
pub struct ReminderService {
    reminders: Arc<dyn ReminderStore>,
    leads: Arc<dyn LeadStore>,
}

impl ReminderService {
    pub fn new(reminders: Arc<dyn ReminderStore>, leads: Arc<dyn LeadStore>) -> Self {
        Self { reminders, leads }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        title: &str,
        description: Option<String>,
        due_date: DateTime<Utc>,
    ) -> Result<Reminder, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::invalid("title", "O título é obrigatório."));
        }

        let reminder_scope = scope(principal, Resource::Reminder, Operation::Write)?;
        let lead_scope = scope(principal, Resource::Lead, Operation::Write)?;
        self.leads
            .find(&lead_scope, lead_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let reminder = self
            .reminders
            .insert(NewReminder {
                company_id: reminder_scope.company_id(),
                lead_id,
                user_id: principal.id,
                title: title.to_string(),
                description,
                due_date,
            })
            .await?;

        Ok(reminder.with_effective_status(Utc::now()))
    }

    /// Ordenados pelo vencimento. PENDING vencido sai como OVERDUE.
    pub async fn list(
        &self,
        principal: &Principal,
        status: Option<ReminderStatus>,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Reminder>, i64), AppError> {
        let scope = scope(principal, Resource::Reminder, Operation::Read)?;
        let (reminders, total) = self.reminders.list(&scope, status, now, page).await?;

        let reminders = reminders
            .into_iter()
            .map(|r| r.with_effective_status(now))
            .collect();
        Ok((reminders, total))
    }

    pub async fn complete(&self, principal: &Principal, reminder_id: Uuid) -> Result<Reminder, AppError> {
        let scope = scope(principal, Resource::Reminder, Operation::Write)?;
        self.reminders
            .complete(&scope, reminder_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
