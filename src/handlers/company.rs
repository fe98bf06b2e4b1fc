// src/handlers/company.rs

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::company::Company,
};

// GET /api/company
#[utoipa::path(
    get,
    path = "/api/company",
    tag = "Company",
    responses(
        (status = 200, description = "Empresa do usuário logado", body = Company)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.current(&principal).await?;
    Ok(Json(ApiResponse::ok(company)))
}

// PUT /api/company/settings
#[utoipa::path(
    put,
    path = "/api/company/settings",
    tag = "Company",
    request_body(content = Object, description = "Mapa de configurações (substitui o atual)"),
    responses(
        (status = 200, description = "Configurações atualizadas", body = Company),
        (status = 400, description = "Corpo não é um objeto JSON"),
        (status = 403, description = "Apenas ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Json(settings), _): WithRejection<Json<Value>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.update_settings(&principal, settings).await?;
    Ok(Json(ApiResponse::with_message(company, "Configurações salvas.")))
}
