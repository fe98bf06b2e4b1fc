// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    common::error::AppError,
    db::{DashboardStore, LeadCount},
    models::{auth::Principal, dashboard::DashboardStats, lead::LeadStatus},
    services::visibility::{scope, Operation, Resource, Scope},
};

// Contador que falhou vira 0: o dashboard não cai por causa de um card.
fn or_zero(label: &str, result: Result<i64, AppError>) -> i64 {
    result.unwrap_or_else(|e| {
        tracing::warn!(counter = label, "Contador do dashboard falhou, usando 0: {:?}", e);
        0
    })
}

/// Percentual com uma casa decimal; 0 sem leads.
pub fn conversion_rate(won: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    ((won as f64 / total as f64) * 1000.0).round() / 10.0
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DashboardStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self, principal: &Principal) -> Result<DashboardStats, AppError> {
        let leads: Scope = scope(principal, Resource::Lead, Operation::Read)?;
        let reminders = scope(principal, Resource::Reminder, Operation::Read)?;
        let emails = scope(principal, Resource::EmailLog, Operation::Read)?;
        let week_ago = Utc::now() - Duration::days(7);

        // Tudo em paralelo; o resultado só é montado depois que todos voltarem.
        let (total, recent, qualified, won, pending, sent, opened) = tokio::join!(
            self.store.count_leads(&leads, LeadCount::All),
            self.store.count_leads(&leads, LeadCount::CreatedSince(week_ago)),
            self.store.count_leads(&leads, LeadCount::WithStatus(LeadStatus::Qualified)),
            self.store.count_leads(&leads, LeadCount::WithStatus(LeadStatus::ClosedWon)),
            self.store.count_pending_reminders(&reminders),
            self.store.count_emails(&emails, false),
            self.store.count_emails(&emails, true),
        );

        let total_leads = or_zero("total_leads", total);
        let closed_won_leads = or_zero("closed_won_leads", won);

        Ok(DashboardStats {
            total_leads,
            new_leads: or_zero("new_leads", recent),
            qualified_leads: or_zero("qualified_leads", qualified),
            closed_won_leads,
            pending_reminders: or_zero("pending_reminders", pending),
            emails_sent: or_zero("emails_sent", sent),
            emails_opened: or_zero("emails_opened", opened),
            conversion_rate: conversion_rate(closed_won_leads, total_leads),
        })
    }
}
