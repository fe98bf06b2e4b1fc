// src/db/file_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::file::{FileRecord, NewFileRecord},
    services::visibility::Scope,
};

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord, AppError>;

    async fn find(&self, scope: &Scope, file_id: Uuid) -> Result<Option<FileRecord>, AppError>;

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<FileRecord>, i64), AppError>;

    /// `false` se nada foi removido (fora do escopo ou já removido)
    async fn delete(&self, scope: &Scope, file_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_file_predicate(qb: &mut QueryBuilder<'static, Postgres>, scope: &Scope, lead_id: Option<Uuid>) {
    scope.push_where(qb, "f");
    if let Some(lead_id) = lead_id {
        qb.push(" AND f.lead_id = ").push_bind(lead_id);
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord, AppError> {
        let created = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (
                company_id, lead_id, uploaded_by_id, filename, original_filename,
                mime_type, file_size, storage_key, public_url, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(file.company_id)
        .bind(file.lead_id)
        .bind(file.uploaded_by_id)
        .bind(&file.filename)
        .bind(&file.original_filename)
        .bind(&file.mime_type)
        .bind(file.file_size)
        .bind(&file.storage_key)
        .bind(&file.public_url)
        .bind(file.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find(&self, scope: &Scope, file_id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let mut qb = QueryBuilder::new("SELECT f.* FROM files f");
        push_file_predicate(&mut qb, scope, None);
        qb.push(" AND f.id = ").push_bind(file_id);

        let file = qb.build_query_as::<FileRecord>().fetch_optional(&self.pool).await?;
        Ok(file)
    }

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<FileRecord>, i64), AppError> {
        let mut qb = QueryBuilder::new("SELECT f.* FROM files f");
        push_file_predicate(&mut qb, scope, lead_id);
        qb.push(" ORDER BY f.created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let files = qb.build_query_as::<FileRecord>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM files f");
        push_file_predicate(&mut count, scope, lead_id);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((files, total))
    }

    async fn delete(&self, scope: &Scope, file_id: Uuid) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM files f");
        push_file_predicate(&mut qb, scope, None);
        qb.push(" AND f.id = ").push_bind(file_id);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
