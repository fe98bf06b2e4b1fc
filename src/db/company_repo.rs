// src/db/company_repo.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::company::Company};

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find(&self, company_id: Uuid) -> Result<Option<Company>, AppError>;

    /// Cria a empresa pelo slug ou devolve a existente.
    /// O `bool` diz se ela foi criada agora.
    async fn ensure_by_slug(&self, name: &str, slug: &str) -> Result<(Company, bool), AppError>;

    async fn update_settings(&self, company_id: Uuid, settings: &Value) -> Result<Option<Company>, AppError>;
}

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    async fn find(&self, company_id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    async fn ensure_by_slug(&self, name: &str, slug: &str) -> Result<(Company, bool), AppError> {
        // ON CONFLICT DO NOTHING não devolve linha quando o slug já existe
        let created = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(company) = created {
            return Ok((company, true));
        }

        let existing = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE slug = $1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok((existing, false))
    }

    async fn update_settings(&self, company_id: Uuid, settings: &Value) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET settings = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(settings)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }
}
