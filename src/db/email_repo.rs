// src/db/email_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::email::{EmailLog, NewEmailLog},
    services::visibility::Scope,
};

#[async_trait]
pub trait EmailLogStore: Send + Sync {
    async fn insert(&self, log: NewEmailLog) -> Result<EmailLog, AppError>;

    /// Registra uma abertura de forma atômica. `None` se o token não existe.
    async fn record_open(&self, tracking_id: &str, at: DateTime<Utc>) -> Result<Option<EmailLog>, AppError>;

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<EmailLog>, i64), AppError>;
}

#[derive(Clone)]
pub struct EmailRepository {
    pool: PgPool,
}

impl EmailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_log_predicate(qb: &mut QueryBuilder<'static, Postgres>, scope: &Scope, lead_id: Option<Uuid>) {
    scope.push_where(qb, "e");
    if let Some(lead_id) = lead_id {
        qb.push(" AND e.lead_id = ").push_bind(lead_id);
    }
}

#[async_trait]
impl EmailLogStore for EmailRepository {
    async fn insert(&self, log: NewEmailLog) -> Result<EmailLog, AppError> {
        let created = sqlx::query_as::<_, EmailLog>(
            r#"
            INSERT INTO email_logs (
                company_id, lead_id, sent_by_id, subject, content,
                recipient_email, sender_email, status, tracking_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'SENT', $8)
            RETURNING *
            "#,
        )
        .bind(log.company_id)
        .bind(log.lead_id)
        .bind(log.sent_by_id)
        .bind(&log.subject)
        .bind(&log.content)
        .bind(&log.recipient_email)
        .bind(&log.sender_email)
        .bind(&log.tracking_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn record_open(&self, tracking_id: &str, at: DateTime<Utc>) -> Result<Option<EmailLog>, AppError> {
        // Um único UPDATE: o incremento acontece no banco, sem ler-modificar-gravar.
        let updated = sqlx::query_as::<_, EmailLog>(
            r#"
            UPDATE email_logs
            SET open_count = open_count + 1,
                opened_at = COALESCE(opened_at, $2),
                status = 'OPENED'
            WHERE tracking_id = $1
            RETURNING *
            "#,
        )
        .bind(tracking_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn list(
        &self,
        scope: &Scope,
        lead_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<EmailLog>, i64), AppError> {
        let mut qb = QueryBuilder::new("SELECT e.* FROM email_logs e");
        push_log_predicate(&mut qb, scope, lead_id);
        qb.push(" ORDER BY e.sent_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let logs = qb.build_query_as::<EmailLog>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM email_logs e");
        push_log_predicate(&mut count, scope, lead_id);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((logs, total))
    }
}
