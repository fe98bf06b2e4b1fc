// src/handlers/files.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated},
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::file::{DownloadLink, FileRecord, FileUpload},
};

const FALLBACK_MIME: &str = "application/octet-stream";

fn multipart_error(e: MultipartError) -> AppError {
    AppError::invalid("file", e.body_text())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

// Só para a documentação: o corpo real é multipart/form-data
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(format = Binary, value_type = String)]
    file: Vec<u8>,
    lead_id: Option<Uuid>,
    is_public: Option<bool>,
}

// POST /api/files
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "Files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Arquivo guardado", body = FileRecord),
        (status = 400, description = "Arquivo ausente ou vazio"),
        (status = 404, description = "Lead inexistente ou fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = FileUpload {
        bytes: Vec::new(),
        filename: String::new(),
        mime_type: FALLBACK_MIME.to_string(),
        lead_id: None,
        is_public: false,
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().unwrap_or_default().to_string();
                upload.mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| FALLBACK_MIME.to_string());
                upload.bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            "leadId" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    let lead_id = Uuid::parse_str(text)
                        .map_err(|_| AppError::invalid("leadId", "ID de lead inválido."))?;
                    upload.lead_id = Some(lead_id);
                }
            }
            "isPublic" => {
                upload.is_public = parse_flag(&field.text().await.map_err(multipart_error)?);
            }
            other => tracing::debug!(field = other, "Campo de upload ignorado"),
        }
    }

    let record = app_state.file_service.upload(&principal, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(record, "Arquivo enviado com sucesso.")),
    ))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileListParams {
    pub lead_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "Files",
    params(FileListParams),
    responses(
        (status = 200, description = "Arquivos da empresa, mais novos primeiro", body = Vec<FileRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_files(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    WithRejection(Query(params), _): WithRejection<Query<FileListParams>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit);
    let (files, total) = app_state.file_service.list(&principal, params.lead_id, page).await?;
    Ok(Json(Paginated::new(files, page, total)))
}

// DELETE /api/files/{id}
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "ID do arquivo")),
    responses(
        (status = 204, description = "Arquivo removido"),
        (status = 404, description = "Arquivo inexistente ou de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_file(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.file_service.delete(&principal, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DownloadParams {
    /// Validade da URL em segundos (60 a 604800, padrão 3600)
    pub expires_in: Option<u64>,
}

// GET /api/files/{id}/download
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "Files",
    params(("id" = Uuid, Path, description = "ID do arquivo"), DownloadParams),
    responses(
        (status = 200, description = "URL de download", body = DownloadLink),
        (status = 404, description = "Arquivo inexistente ou de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_file(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<Uuid>,
    WithRejection(Query(params), _): WithRejection<Query<DownloadParams>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let link = app_state
        .file_service
        .download_url(&principal, file_id, params.expires_in)
        .await?;
    Ok(Json(ApiResponse::ok(link)))
}
