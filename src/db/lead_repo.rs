// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::lead::{Lead, LeadFilters, LeadPatch, NewLead, Tag},
    services::visibility::Scope,
};

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Página de leads ativos dentro do escopo + total para a paginação
    async fn list(
        &self,
        scope: &Scope,
        filters: &LeadFilters,
        page: PageRequest,
    ) -> Result<(Vec<Lead>, i64), AppError>;

    async fn find(&self, scope: &Scope, lead_id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError>;

    async fn update(&self, scope: &Scope, lead_id: Uuid, patch: &LeadPatch) -> Result<Option<Lead>, AppError>;

    /// Soft delete (`is_active = false`). `false` se não estava no escopo.
    async fn deactivate(&self, scope: &Scope, lead_id: Uuid) -> Result<bool, AppError>;

    async fn link_tags(&self, lead_id: Uuid, tag_ids: &[Uuid]) -> Result<(), AppError>;

    async fn tags_for(&self, lead_id: Uuid) -> Result<Vec<Tag>, AppError>;
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapa curingas do LIKE: a busca é por substring literal.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// Escopo primeiro, filtros depois. Compartilhado entre a página e o COUNT.
fn push_lead_predicate(qb: &mut QueryBuilder<'static, Postgres>, scope: &Scope, filters: &LeadFilters) {
    scope.push_where(qb, "l");
    qb.push(" AND l.is_active = true");

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (l.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.company ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(status) = filters.status {
        qb.push(" AND l.status = ").push_bind(status);
    }

    if let Some(assignee) = filters.assigned_to {
        qb.push(" AND l.assigned_to_id = ").push_bind(assignee);
    }
}

pub(crate) fn lead_page_query(scope: &Scope, filters: &LeadFilters, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT l.* FROM leads l");
    push_lead_predicate(&mut qb, scope, filters);
    qb.push(" ORDER BY l.created_at DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

pub(crate) fn lead_count_query(scope: &Scope, filters: &LeadFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads l");
    push_lead_predicate(&mut qb, scope, filters);
    qb
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn list(
        &self,
        scope: &Scope,
        filters: &LeadFilters,
        page: PageRequest,
    ) -> Result<(Vec<Lead>, i64), AppError> {
        let leads = lead_page_query(scope, filters, page)
            .build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await?;

        let total = lead_count_query(scope, filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((leads, total))
    }

    async fn find(&self, scope: &Scope, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let mut qb = QueryBuilder::new("SELECT l.* FROM leads l");
        scope.push_where(&mut qb, "l");
        qb.push(" AND l.is_active = true AND l.id = ").push_bind(lead_id);

        let lead = qb.build_query_as::<Lead>().fetch_optional(&self.pool).await?;
        Ok(lead)
    }

    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        let created = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                company_id, created_by_id, assigned_to_id,
                first_name, last_name, email, phone, company, title,
                status, notes, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(lead.company_id)
        .bind(lead.created_by_id)
        .bind(lead.assigned_to_id)
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.title)
        .bind(lead.status)
        .bind(&lead.notes)
        .bind(&lead.source)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, scope: &Scope, lead_id: Uuid, patch: &LeadPatch) -> Result<Option<Lead>, AppError> {
        // COALESCE: campo ausente no patch mantém o valor atual
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE leads l SET ");
        qb.push("first_name = COALESCE(").push_bind(patch.first_name.clone()).push(", l.first_name)")
            .push(", last_name = COALESCE(").push_bind(patch.last_name.clone()).push(", l.last_name)")
            .push(", email = COALESCE(").push_bind(patch.email.clone()).push(", l.email)")
            .push(", phone = COALESCE(").push_bind(patch.phone.clone()).push(", l.phone)")
            .push(", company = COALESCE(").push_bind(patch.company.clone()).push(", l.company)")
            .push(", title = COALESCE(").push_bind(patch.title.clone()).push(", l.title)")
            .push(", status = COALESCE(").push_bind(patch.status).push(", l.status)")
            .push(", score = COALESCE(").push_bind(patch.score).push(", l.score)")
            .push(", notes = COALESCE(").push_bind(patch.notes.clone()).push(", l.notes)")
            .push(", source = COALESCE(").push_bind(patch.source.clone()).push(", l.source)")
            .push(", assigned_to_id = COALESCE(").push_bind(patch.assigned_to_id).push(", l.assigned_to_id)")
            .push(", last_contact = COALESCE(").push_bind(patch.last_contact).push(", l.last_contact)")
            .push(", updated_at = NOW()");

        scope.push_where(&mut qb, "l");
        qb.push(" AND l.is_active = true AND l.id = ").push_bind(lead_id);
        qb.push(" RETURNING l.*");

        let lead = qb.build_query_as::<Lead>().fetch_optional(&self.pool).await?;
        Ok(lead)
    }

    async fn deactivate(&self, scope: &Scope, lead_id: Uuid) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE leads l SET is_active = false, updated_at = NOW()");
        scope.push_where(&mut qb, "l");
        qb.push(" AND l.is_active = true AND l.id = ").push_bind(lead_id);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_tags(&self, lead_id: Uuid, tag_ids: &[Uuid]) -> Result<(), AppError> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO lead_tags (lead_id, tag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(lead_id)
        .bind(tag_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn tags_for(&self, lead_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.*
            FROM tags t
            INNER JOIN lead_tags lt ON lt.tag_id = t.id
            WHERE lt.lead_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}
