// src/handlers/email.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
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
    models::email::{EmailDraft, EmailLog},
};

// PNG 1x1 transparente servido pelo endpoint de rastreamento
pub const TRACKING_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
    0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0xF8, 0x5F,
    0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailPayload {
    #[validate(email(message = "Destinatário inválido."))]
    #[schema(example = "anna@kund.se")]
    pub to: String,

    #[validate(length(min = 1, max = 200, message = "O assunto é obrigatório."))]
    #[schema(example = "Proposta comercial")]
    pub subject: String,

    #[validate(length(min = 1, message = "O conteúdo é obrigatório."))]
    #[schema(example = "<p>Olá Anna</p>")]
    pub content: String,

    pub lead_id: Option<Uuid>,
}

// POST /api/email/send
#[utoipa::path(
    post,
    path = "/api/email/send",
    tag = "Email",
    request_body = SendEmailPayload,
    responses(
        (status = 201, description = "E-mail enviado e registrado", body = EmailLog),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead inexistente ou fora do escopo"),
        (status = 502, description = "Provedor recusou o envio")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_email(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Json(payload), _): WithRejection<Json<SendEmailPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let draft = EmailDraft {
        to: payload.to,
        subject: payload.subject,
        content: payload.content,
        lead_id: payload.lead_id,
    };
    let log = app_state.email_service.send(&principal, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(log, "E-mail enviado com sucesso.")),
    ))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmailLogParams {
    pub lead_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/email/logs
#[utoipa::path(
    get,
    path = "/api/email/logs",
    tag = "Email",
    params(EmailLogParams),
    responses(
        (status = 200, description = "Histórico de envios visível", body = Vec<EmailLog>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_email_logs(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Query(params), _): WithRejection<Query<EmailLogParams>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit);
    let (logs, total) = app_state.email_service.list(&principal, params.lead_id, page).await?;
    Ok(Json(Paginated::new(logs, page, total)))
}

// GET /api/email/track/{token}
// Público. Sempre 200 com o pixel: falha de registro nunca chega ao cliente de e-mail.
#[utoipa::path(
    get,
    path = "/api/email/track/{token}",
    tag = "Email",
    params(("token" = String, Path, description = "Token de rastreamento")),
    responses(
        (status = 200, description = "Pixel PNG 1x1 (image/png), sempre")
    )
)]
pub async fn track_open(State(app_state): State<AppState>, Path(token): Path<String>) -> impl IntoResponse {
    match app_state.email_service.record_open(&token, Utc::now()).await {
        Ok(true) => tracing::debug!("Abertura registrada"),
        Ok(false) => tracing::debug!("Token de rastreamento desconhecido"),
        Err(e) => tracing::warn!("Falha ao registrar abertura: {:?}", e),
    }

    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        TRACKING_PIXEL,
    )
}
