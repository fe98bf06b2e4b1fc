// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Os cards do topo do dashboard.
// Contadores são "best effort": um contador que falhou vem como 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: i64,
    pub new_leads: i64,         // Últimos 7 dias
    pub qualified_leads: i64,
    pub closed_won_leads: i64,
    pub pending_reminders: i64,
    pub emails_sent: i64,
    pub emails_opened: i64,
    pub conversion_rate: f64,   // Percentual, uma casa decimal
}
