// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::{CurrentPrincipal, SessionClaims},
    models::auth::UserProfile,
};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = UserProfile),
        (status = 401, description = "Sem sessão ou sem perfil")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.auth_service.current_profile(&principal).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// POST /api/auth/provision
// Exige sessão válida, mas não perfil: é aqui que o perfil nasce.
#[utoipa::path(
    post,
    path = "/api/auth/provision",
    tag = "Auth",
    responses(
        (status = 201, description = "Perfil criado", body = UserProfile),
        (status = 200, description = "Perfil já existia", body = UserProfile),
        (status = 401, description = "Sessão inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn provision(
    State(app_state): State<AppState>,
    SessionClaims(claims): SessionClaims,
) -> Result<impl IntoResponse, AppError> {
    let (profile, created) = app_state.onboarding_service.provision(&claims).await?;

    if created {
        let body = ApiResponse::with_message(profile, "Perfil criado com sucesso.");
        Ok((StatusCode::CREATED, Json(body)))
    } else {
        Ok((StatusCode::OK, Json(ApiResponse::ok(profile))))
    }
}
