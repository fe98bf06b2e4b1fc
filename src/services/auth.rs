// src/services/auth.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    config::SessionSettings,
    db::ProfileStore,
    models::auth::{Claims, Principal, UserProfile},
};

/// Resultado da resolução de uma sessão: quem é + os claims que vieram no token.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct AuthService {
    profiles: Arc<dyn ProfileStore>,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    audience: String,
    refresh_window_secs: i64,
    ttl_secs: i64,
}

impl AuthService {
    pub fn new(profiles: Arc<dyn ProfileStore>, settings: &SessionSettings) -> Self {
        Self {
            profiles,
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            audience: settings.audience.clone(),
            refresh_window_secs: settings.refresh_window_secs,
            ttl_secs: settings.ttl_secs,
        }
    }

    /// Só a verificação criptográfica. Qualquer falha é `Unauthenticated`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token de sessão rejeitado: {}", e);
                AppError::Unauthenticated
            })
    }

    /// Token -> Principal. Não mexe em cookies nem em nada do transporte.
    pub async fn resolve(&self, token: &str) -> Result<Session, AppError> {
        let claims = self.verify(token)?;

        let profile = self
            .profiles
            .find_active_by_user_id(claims.sub)
            .await?
            .ok_or(AppError::ProfileMissing)?;

        Ok(Session {
            principal: Principal::from(&profile),
            claims,
        })
    }

    pub async fn current_profile(&self, principal: &Principal) -> Result<UserProfile, AppError> {
        self.profiles
            .find_active_by_user_id(principal.user_id)
            .await?
            .ok_or(AppError::ProfileMissing)
    }

    /// Emite um token novo quando o atual expira dentro da janela de renovação.
    /// `None` se ainda não é hora (ou se o token já expirou).
    pub fn refreshed_token(&self, claims: &Claims, now: DateTime<Utc>) -> Result<Option<String>, AppError> {
        let now_ts = now.timestamp();
        let exp = claims.exp as i64;

        if exp <= now_ts || exp - now_ts > self.refresh_window_secs {
            return Ok(None);
        }

        let renewed = Claims {
            exp: (now_ts + self.ttl_secs) as usize,
            iat: now_ts as usize,
            aud: Some(self.audience.clone()),
            ..claims.clone()
        };

        let token = encode(&Header::new(Algorithm::HS256), &renewed, &self.encoding_key)?;
        tracing::debug!(user_id = %claims.sub, "Sessão renovada");
        Ok(Some(token))
    }
}
