// src/services/file_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{FileStore, LeadStore},
    integrations::{ObjectStorage, PutObject},
    models::{
        auth::Principal,
        file::{DownloadLink, FileRecord, FileUpload, NewFileRecord},
    },
    services::visibility::{scope, Operation, Resource},
};

pub const DEFAULT_URL_TTL_SECS: u64 = 3600;
pub const MIN_URL_TTL_SECS: u64 = 60;
pub const MAX_URL_TTL_SECS: u64 = 7 * 24 * 3600;

pub fn clamp_url_ttl(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_URL_TTL_SECS)
        .clamp(MIN_URL_TTL_SECS, MAX_URL_TTL_SECS)
}

/// Extensão segura para a chave: só `[a-z0-9]`, no máximo 16 caracteres, `bin` se não houver.
pub fn file_extension(filename: &str) -> String {
    let ext: String = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() { "bin".to_string() } else { ext }
}

/// `{empresa}/{lead|general}/{nome gravado}`
pub fn storage_key(company_id: Uuid, lead_id: Option<Uuid>, stored_name: &str) -> String {
    let segment = lead_id.map_or_else(|| "general".to_string(), |id| id.to_string());
    format!("{}/{}/{}", company_id, segment, stored_name)
}

// `{unix_millis}_{aleatório de 12}.{ext}`
fn stored_name(filename: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}.{}", Utc::now().timestamp_millis(), &suffix[..12], file_extension(filename))
}

#[derive(Clone)]
pub struct FileService {
    files: Arc<dyn FileStore>,
    storage: Arc<dyn ObjectStorage>,
    leads: Arc<dyn LeadStore>,
}

impl FileService {
    pub fn new(files: Arc<dyn FileStore>, storage: Arc<dyn ObjectStorage>, leads: Arc<dyn LeadStore>) -> Self {
        Self { files, storage, leads }
    }

    pub async fn upload(&self, principal: &Principal, upload: FileUpload) -> Result<FileRecord, AppError> {
        if upload.bytes.is_empty() {
            return Err(AppError::invalid("file", "O arquivo está vazio."));
        }
        let original_filename = upload.filename.trim().to_string();
        if original_filename.is_empty() {
            return Err(AppError::invalid("file", "O arquivo precisa de um nome."));
        }

        let file_scope = scope(principal, Resource::File, Operation::Write)?;

        if let Some(lead_id) = upload.lead_id {
            let lead_scope = scope(principal, Resource::Lead, Operation::Write)?;
            self.leads
                .find(&lead_scope, lead_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let company_id = file_scope.company_id();
        let filename = stored_name(&original_filename);
        let key = storage_key(company_id, upload.lead_id, &filename);
        let file_size = upload.bytes.len() as i64;

        let mut metadata = HashMap::from([
            ("original-filename".to_string(), original_filename.clone()),
            ("company-id".to_string(), company_id.to_string()),
            ("uploaded-by".to_string(), principal.id.to_string()),
        ]);
        if let Some(lead_id) = upload.lead_id {
            metadata.insert("lead-id".to_string(), lead_id.to_string());
        }

        self.storage
            .put(PutObject {
                key: key.clone(),
                body: upload.bytes,
                content_type: upload.mime_type.clone(),
                metadata,
                public: upload.is_public,
            })
            .await?;

        let public_url = upload.is_public.then(|| self.storage.public_url(&key));

        let inserted = self
            .files
            .insert(NewFileRecord {
                company_id,
                lead_id: upload.lead_id,
                uploaded_by_id: principal.id,
                filename,
                original_filename,
                mime_type: upload.mime_type,
                file_size,
                storage_key: key.clone(),
                public_url,
                is_public: upload.is_public,
            })
            .await;

        match inserted {
            Ok(record) => {
                tracing::info!(file_id = %record.id, company_id = %company_id, size = file_size, "📎 Arquivo enviado");
                Ok(record)
            }
            Err(e) => {
                // Metadados falharam: o objeto recém-gravado não pode ficar órfão.
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(storage_key = %key, "Objeto órfão no storage após falha no upload: {:?}", cleanup);
                }
                Err(e)
            }
        }
    }

    /// Remove o objeto e depois os metadados (não é transacional).
    pub async fn delete(&self, principal: &Principal, file_id: Uuid) -> Result<(), AppError> {
        let scope = scope(principal, Resource::File, Operation::Write)?;
        let file = self.files.find(&scope, file_id).await?.ok_or(AppError::NotFound)?;

        self.storage.delete(&file.storage_key).await?;

        match self.files.delete(&scope, file_id).await {
            Ok(true) => {
                tracing::info!(file_id = %file_id, "Arquivo removido");
                Ok(())
            }
            Ok(false) => {
                tracing::warn!(file_id = %file_id, "Metadados já haviam sido removidos");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    file_id = %file_id,
                    storage_key = %file.storage_key,
                    "Inconsistência: objeto removido mas metadados não"
                );
                Err(e)
            }
        }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<FileRecord>, i64), AppError> {
        let scope = scope(principal, Resource::File, Operation::Read)?;
        self.files.list(&scope, lead_id, page).await
    }

    pub async fn download_url(
        &self,
        principal: &Principal,
        file_id: Uuid,
        expires_in: Option<u64>,
    ) -> Result<DownloadLink, AppError> {
        let scope = scope(principal, Resource::File, Operation::Read)?;
        let file = self.files.find(&scope, file_id).await?.ok_or(AppError::NotFound)?;

        if let (true, Some(url)) = (file.is_public, file.public_url) {
            return Ok(DownloadLink { url, expires_in: None });
        }

        let ttl = clamp_url_ttl(expires_in);
        let url = self
            .storage
            .sign_url(&file.storage_key, Duration::from_secs(ttl))
            .await?;

        Ok(DownloadLink {
            url,
            expires_in: Some(ttl),
        })
    }
}
