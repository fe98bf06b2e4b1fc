use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Sem sessão ou sessão inválida
    #[error("Não autenticado")]
    Unauthenticated,

    // Sessão válida, mas sem perfil ativo
    #[error("Perfil de usuário não encontrado")]
    ProfileMissing,

    // Papel insuficiente para a operação
    #[error("Acesso negado")]
    Forbidden,

    // Ausente OU fora do escopo: nunca distinguimos os dois
    #[error("Recurso não encontrado")]
    NotFound,

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação feita fora do `validator` (regras que dependem do banco)
    #[error("Entrada inválida em '{field}': {message}")]
    InvalidInput { field: &'static str, message: String },

    // Corpo JSON ou query string que nem chegou a desserializar
    #[error("Requisição malformada em '{field}': {message}")]
    MalformedRequest { field: String, message: String },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro no object storage: {0}")]
    ObjectStorage(String),

    // O provedor de e-mail recusou ou falhou
    #[error("Falha no envio do e-mail: {0}")]
    DispatchFailure(String),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidInput { field, message: message.into() }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let (field, message) = rejected_field(&rejection.body_text(), "body");
        AppError::MalformedRequest { field, message }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let (field, message) = rejected_field(&rejection.body_text(), "query");
        AppError::MalformedRequest { field, message }
    }
}

/// Tira do texto da rejeição o campo culpado. O axum prefixa a mensagem do
/// serde com o caminho do campo (`status: unknown variant ...`), e campos
/// ausentes vêm como ``missing field `firstName` ``.
fn rejected_field(text: &str, fallback: &str) -> (String, String) {
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);

    if let Some(name) = detail
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(name, _)| name)
    {
        return (name.to_string(), "Campo obrigatório.".to_string());
    }

    match detail.split_once(": ") {
        Some((path, message)) if is_field_path(path) => (path.to_string(), message.to_string()),
        _ => (fallback.to_string(), detail.to_string()),
    }
}

fn is_field_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

// `first_name` -> `firstName`, o mesmo nome que o cliente enviou
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(wire_name(&field), messages);
                }
                return validation_response(details);
            }
            AppError::InvalidInput { field, message } => {
                let details = HashMap::from([(field.to_string(), vec![message])]);
                return validation_response(details);
            }
            AppError::MalformedRequest { field, message } => {
                let details = HashMap::from([(field, vec![message])]);
                return validation_response(details);
            }
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Autenticação necessária.".to_string()),
            AppError::ProfileMissing => {
                tracing::info!("Sessão válida sem perfil ativo");
                (StatusCode::UNAUTHORIZED, "Autenticação necessária.".to_string())
            }
            AppError::JwtError(ref e) => {
                tracing::debug!("Token de sessão rejeitado: {}", e);
                (StatusCode::UNAUTHORIZED, "Autenticação necessária.".to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Você não tem permissão para esta ação.".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Recurso não encontrado.".to_string()),
            AppError::DispatchFailure(reason) => {
                tracing::warn!("Provedor de e-mail recusou o envio: {}", reason);
                (StatusCode::BAD_GATEWAY, format!("Falha ao enviar o e-mail: {}", reason))
            }

            // Todo o resto vira 500 com mensagem genérica; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}

fn validation_response(details: HashMap<String, Vec<String>>) -> Response {
    let body = Json(json!({
        "success": false,
        "error": "Um ou mais campos são inválidos.",
        "details": details,
    }));
    (StatusCode::BAD_REQUEST, body).into_response()
}
