// src/models/file.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

// Metadados de um objeto guardado no object storage
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub uploaded_by_id: Uuid,

    #[schema(example = "1735689600000_k3j9x0a1b2c3.pdf")]
    pub filename: String,
    #[schema(example = "offert.pdf")]
    pub original_filename: String,
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    pub file_size: i64,

    // Chave opaca e única no bucket
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub public_url: Option<String>,
    pub is_public: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub company_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub uploaded_by_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_key: String,
    pub public_url: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub url: String,
    // `None` para arquivos públicos (URL estável)
    pub expires_in: Option<u64>,
}

// Arquivo recebido do cliente, ainda não gravado
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub lead_id: Option<Uuid>,
    pub is_public: bool,
}
