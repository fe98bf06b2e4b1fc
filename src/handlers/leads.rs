// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::lead::{Lead, LeadDetail, LeadDraft, LeadFilters, LeadPatch, LeadStatus, Tag},
};

// =============================================================================
//  LISTAGEM
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeadListParams {
    #[param(example = 1)]
    pub page: Option<i64>,
    #[param(example = 10)]
    pub limit: Option<i64>,
    /// Busca literal em nome, sobrenome, e-mail e empresa
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    /// Só tem efeito para ADMIN
    pub assigned_to: Option<Uuid>,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadListParams),
    responses(
        (status = 200, description = "Página de leads visíveis", body = Vec<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Query(params), _): WithRejection<Query<LeadListParams>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit);
    let filters = LeadFilters {
        search: params.search,
        status: params.status,
        assigned_to: params.assigned_to,
    };

    let (leads, total) = app_state.lead_service.list(&principal, filters, page).await?;

    Ok(Json(Paginated::new(leads, page, total)))
}

// =============================================================================
//  CRIAÇÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "Anna")]
    pub first_name: String,

    #[validate(length(max = 100))]
    pub last_name: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "anna@kund.se")]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub assigned_to_id: Option<Uuid>,

    #[serde(default)]
    #[schema(example = json!(["Hot", "Inbound"]))]
    pub tags: Vec<String>,
}

impl CreateLeadPayload {
    fn into_parts(self) -> (LeadDraft, Vec<String>) {
        let draft = LeadDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            title: self.title,
            status: self.status,
            notes: self.notes,
            source: self.source,
            assigned_to_id: self.assigned_to_id,
        };
        (draft, self.tags)
    }
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = LeadDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Json(payload), _): WithRejection<Json<CreateLeadPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (draft, tags) = payload.into_parts();
    let lead = app_state.lead_service.create(&principal, draft, &tags).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(lead, "Lead criado com sucesso.")),
    ))
}

// =============================================================================
//  LEAD INDIVIDUAL
// =============================================================================

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com suas tags", body = LeadDetail),
        (status = 404, description = "Lead inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get(&principal, lead_id).await?;
    Ok(Json(ApiResponse::ok(lead)))
}

// PATCH /api/leads/{id}
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = LeadPatch,
    responses(
        (status = 200, description = "Lead atualizado", body = LeadDetail),
        (status = 403, description = "Reatribuição exige ADMIN"),
        (status = 404, description = "Lead inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
    WithRejection(Json(patch), _): WithRejection<Json<LeadPatch>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    patch.validate()?;

    let lead = app_state.lead_service.update(&principal, lead_id, patch).await?;
    Ok(Json(ApiResponse::with_message(lead, "Lead atualizado.")))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead desativado"),
        (status = 404, description = "Lead inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.deactivate(&principal, lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/tags
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Leads",
    responses(
        (status = 200, description = "Tags da empresa", body = Vec<Tag>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tags(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let tags = app_state.lead_service.tags(&principal).await?;
    Ok(Json(ApiResponse::ok(tags)))
}
