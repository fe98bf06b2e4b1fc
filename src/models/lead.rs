// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
    Inactive,
}

// --- LEAD ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub company_id: Uuid,

    #[schema(example = "Anna")]
    pub first_name: String,
    #[schema(example = "Svensson")]
    pub last_name: Option<String>,
    #[schema(example = "anna@kund.se")]
    pub email: Option<String>,
    pub phone: Option<String>,
    // Empresa do contato (texto livre, não é o tenant)
    #[schema(example = "Kund AB")]
    pub company: Option<String>,
    pub title: Option<String>,

    pub status: LeadStatus,
    pub score: i32,
    pub notes: Option<String>,
    pub source: Option<String>,

    pub assigned_to_id: Option<Uuid>,
    pub created_by_id: Uuid,

    pub is_active: bool,
    pub last_contact: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lead com as tags vinculadas (resposta de detalhe/criação)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub tags: Vec<Tag>,
}

// Dados de criação como chegam do cliente (empresa e autoria ainda não resolvidas)
#[derive(Debug, Clone, Default)]
pub struct LeadDraft {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub assigned_to_id: Option<Uuid>,
}

// Linha pronta para INSERT: company/created_by/assigned_to já resolvidos
#[derive(Debug, Clone)]
pub struct NewLead {
    pub company_id: Uuid,
    pub created_by_id: Uuid,
    pub assigned_to_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// Atualização parcial: `None` mantém o valor atual.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0, max = 100, message = "A pontuação vai de 0 a 100."))]
    pub score: Option<i32>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub assigned_to_id: Option<Uuid>,
    pub last_contact: Option<DateTime<Utc>>,
}

/// Filtros opcionais da listagem (sempre somados ao escopo, nunca no lugar dele)
#[derive(Debug, Clone, Default)]
pub struct LeadFilters {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<Uuid>,
}

// --- TAGS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "VIP")]
    pub name: String,
    #[schema(example = "#DC2626")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}
