// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Claims, Principal},
};

/// Token da sessão: `Authorization: Bearer` primeiro, cookie da sessão depois.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn session_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

// O guardião: resolve o Principal, roda o handler e, se a sessão estiver
// perto de expirar, anexa o cookie renovado à resposta.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_name = app_state.config.session.cookie_name.clone();
    let token = session_token(request.headers(), &cookie_name).ok_or(AppError::Unauthenticated)?;

    let session = app_state.auth_service.resolve(&token).await?;

    let refreshed = app_state
        .auth_service
        .refreshed_token(&session.claims, Utc::now())
        .unwrap_or_else(|e| {
            tracing::warn!("Falha ao renovar a sessão: {:?}", e);
            None
        });

    request.extensions_mut().insert(session.principal);
    let response = next.run(request).await;

    match refreshed {
        Some(token) => {
            let jar = CookieJar::new().add(session_cookie(&cookie_name, token));
            Ok((jar, response).into_response())
        }
        None => Ok(response),
    }
}

// Extrator para obter o Principal diretamente nos handlers
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AppError::Unauthenticated)
    }
}

/// Sessão verificada sem exigir perfil (só o onboarding usa).
#[derive(Debug, Clone)]
pub struct SessionClaims(pub Claims);

impl FromRequestParts<AppState> for SessionClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session.cookie_name)
            .ok_or(AppError::Unauthenticated)?;
        state.auth_service.verify(&token).map(SessionClaims)
    }
}
