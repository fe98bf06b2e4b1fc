// src/handlers/reminders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
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
    models::reminder::{Reminder, ReminderStatus},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReminderListParams {
    /// OVERDUE inclui lembretes PENDING já vencidos
    pub status: Option<ReminderStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/reminders
#[utoipa::path(
    get,
    path = "/api/reminders",
    tag = "Reminders",
    params(ReminderListParams),
    responses(
        (status = 200, description = "Lembretes por data de vencimento", body = Vec<Reminder>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reminders(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Query(params), _): WithRejection<Query<ReminderListParams>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit);
    let (reminders, total) = app_state
        .reminder_service
        .list(&principal, params.status, page, Utc::now())
        .await?;
    Ok(Json(Paginated::new(reminders, page, total)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderPayload {
    pub lead_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    #[schema(example = "Ligar para a Anna")]
    pub title: String,

    pub description: Option<String>,

    #[schema(example = "2025-06-01T09:00:00Z")]
    pub due_date: DateTime<Utc>,
}

// POST /api/reminders
#[utoipa::path(
    post,
    path = "/api/reminders",
    tag = "Reminders",
    request_body = CreateReminderPayload,
    responses(
        (status = 201, description = "Lembrete criado", body = Reminder),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reminder(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Json(payload), _): WithRejection<Json<CreateReminderPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reminder = app_state
        .reminder_service
        .create(&principal, payload.lead_id, &payload.title, payload.description, payload.due_date)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(reminder, "Lembrete criado.")),
    ))
}

// POST /api/reminders/{id}/complete
#[utoipa::path(
    post,
    path = "/api/reminders/{id}/complete",
    tag = "Reminders",
    params(("id" = Uuid, Path, description = "ID do lembrete")),
    responses(
        (status = 200, description = "Lembrete concluído", body = Reminder),
        (status = 404, description = "Lembrete inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_reminder(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(reminder_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let reminder = app_state.reminder_service.complete(&principal, reminder_id).await?;
    Ok(Json(ApiResponse::ok(reminder)))
}
