// src/db/dashboard_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::lead::LeadStatus,
    services::visibility::Scope,
};

/// Recortes de contagem de leads usados pelos cards do dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadCount {
    All,
    CreatedSince(DateTime<Utc>),
    WithStatus(LeadStatus),
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn count_leads(&self, scope: &Scope, which: LeadCount) -> Result<i64, AppError>;

    async fn count_pending_reminders(&self, scope: &Scope) -> Result<i64, AppError>;

    /// `opened_only` conta só e-mails com ao menos uma abertura
    async fn count_emails(&self, scope: &Scope, opened_only: bool) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scalar(&self, mut qb: QueryBuilder<'static, Postgres>) -> Result<i64, AppError> {
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

pub(crate) fn lead_count_sql(scope: &Scope, which: LeadCount) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads l");
    scope.push_where(&mut qb, "l");
    qb.push(" AND l.is_active = true");
    match which {
        LeadCount::All => {}
        LeadCount::CreatedSince(since) => {
            qb.push(" AND l.created_at >= ").push_bind(since);
        }
        LeadCount::WithStatus(status) => {
            qb.push(" AND l.status = ").push_bind(status);
        }
    }
    qb
}

#[async_trait]
impl DashboardStore for DashboardRepository {
    async fn count_leads(&self, scope: &Scope, which: LeadCount) -> Result<i64, AppError> {
        self.scalar(lead_count_sql(scope, which)).await
    }

    async fn count_pending_reminders(&self, scope: &Scope) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM reminders r");
        scope.push_where(&mut qb, "r");
        qb.push(" AND r.status = 'PENDING'");
        self.scalar(qb).await
    }

    async fn count_emails(&self, scope: &Scope, opened_only: bool) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM email_logs e");
        scope.push_where(&mut qb, "e");
        if opened_only {
            qb.push(" AND e.open_count > 0");
        }
        self.scalar(qb).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::auth::{Principal, Role},
        services::visibility::{scope, Operation, Resource},
    };
    use uuid::Uuid;

    fn admin_scope() -> Scope {
        let p = Principal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role: Role::Admin,
            active: true,
        };
        scope(&p, Resource::Lead, Operation::Read).unwrap()
    }

    #[test]
    fn status_count_binds_after_the_company() {
        let qb = lead_count_sql(&admin_scope(), LeadCount::WithStatus(LeadStatus::ClosedWon));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM leads l WHERE l.company_id = $1 AND l.is_active = true AND l.status = $2"
        );
    }

    #[test]
    fn recent_count_filters_on_creation_date() {
        let qb = lead_count_sql(&admin_scope(), LeadCount::CreatedSince(Utc::now()));
        assert!(qb.sql().ends_with("AND l.created_at >= $2"));
    }
}
