// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::dashboard::DashboardStats,
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do dashboard (contador com falha vem como 0)", body = DashboardStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.stats(&principal).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
