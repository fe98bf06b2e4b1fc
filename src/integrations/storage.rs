// src/integrations/storage.rs

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Credentials, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client as S3Client,
};

use crate::common::error::AppError;

/// Objeto a gravar. `public` aplica a ACL `public-read`.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub public: bool,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, object: PutObject) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// URL GET assinada, válida por `expires_in`
    async fn sign_url(&self, key: &str, expires_in: Duration) -> Result<String, AppError>;

    /// URL estável de objetos públicos
    fn public_url(&self, key: &str) -> String;
}

// Configuração do bucket (Cloudflare R2 ou qualquer S3 compatível)
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub public_url: String,
}

#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base: String,
}

fn storage_error<E: std::error::Error>(operation: &str, err: E) -> AppError {
    AppError::ObjectStorage(format!("{}: {}", operation, DisplayErrorContext(err)))
}

impl S3Storage {
    pub async fn connect(settings: &StorageSettings) -> Self {
        // R2 usa a região "auto"
        let base_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&settings.endpoint)
            .region(Region::new("auto"))
            .credentials_provider(Credentials::new(
                settings.access_key_id.clone(),
                settings.secret_access_key.clone(),
                None,
                None,
                "static",
            ))
            .load()
            .await;

        let s3_config = S3ConfigBuilder::from(&base_config).force_path_style(true).build();

        tracing::info!(bucket = %settings.bucket, "✅ Cliente de object storage configurado");

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            public_base: settings.public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, object: PutObject) -> Result<(), AppError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .content_type(&object.content_type)
            .set_metadata(Some(object.metadata))
            .body(ByteStream::from(object.body));

        if object.public {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| storage_error("put_object", e))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error("delete_object", e))?;
        Ok(())
    }

    async fn sign_url(&self, key: &str, expires_in: Duration) -> Result<String, AppError> {
        let presign = PresigningConfig::expires_in(expires_in).map_err(|e| storage_error("presign", e))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign)
            .await
            .map_err(|e| storage_error("get_object", e))?;

        Ok(request.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
