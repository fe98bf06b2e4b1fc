// src/db/tag_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{common::error::AppError, models::lead::Tag, services::visibility::Scope};

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn list(&self, scope: &Scope) -> Result<Vec<Tag>, AppError>;

    /// Busca a tag pelo nome dentro da empresa ou cria. Idempotente: a
    /// unicidade (company_id, name) decide quem ganha uma corrida.
    async fn find_or_create(&self, scope: &Scope, name: &str) -> Result<Tag, AppError>;
}

#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Tag>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT t.* FROM tags t");
        scope.push_where(&mut qb, "t");
        qb.push(" AND t.name = ").push_bind(name.to_string());

        let tag = qb.build_query_as::<Tag>().fetch_optional(&self.pool).await?;
        Ok(tag)
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn list(&self, scope: &Scope) -> Result<Vec<Tag>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT t.* FROM tags t");
        scope.push_where(&mut qb, "t");
        qb.push(" ORDER BY t.name ASC");

        let tags = qb.build_query_as::<Tag>().fetch_all(&self.pool).await?;
        Ok(tags)
    }

    async fn find_or_create(&self, scope: &Scope, name: &str) -> Result<Tag, AppError> {
        if let Some(existing) = self.find_by_name(scope, name).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (company_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(scope.company_id())
        .bind(name)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(tag) => Ok(tag),
            // Outra requisição criou a mesma tag entre o SELECT e o INSERT: usa a dela.
            Err(e) if e.as_database_error().is_some_and(|db| db.is_unique_violation()) => {
                tracing::debug!(tag = name, "Tag criada em paralelo, reutilizando");
                self.find_by_name(scope, name).await?.ok_or(AppError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }
}
