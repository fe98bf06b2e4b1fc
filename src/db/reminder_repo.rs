// src/db/reminder_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::reminder::{NewReminder, Reminder, ReminderStatus},
    services::visibility::Scope,
};

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, AppError>;

    /// `status` é o status efetivo (OVERDUE inclui PENDING vencido em `now`)
    async fn list(
        &self,
        scope: &Scope,
        status: Option<ReminderStatus>,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Reminder>, i64), AppError>;

    async fn complete(&self, scope: &Scope, reminder_id: Uuid) -> Result<Option<Reminder>, AppError>;
}

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_reminder_predicate(
    qb: &mut QueryBuilder<'static, Postgres>,
    scope: &Scope,
    status: Option<ReminderStatus>,
    now: DateTime<Utc>,
) {
    scope.push_where(qb, "r");
    match status {
        None => {}
        Some(ReminderStatus::Completed) => {
            qb.push(" AND r.status = 'COMPLETED'");
        }
        Some(ReminderStatus::Pending) => {
            qb.push(" AND r.status = 'PENDING' AND r.due_date >= ").push_bind(now);
        }
        Some(ReminderStatus::Overdue) => {
            qb.push(" AND (r.status = 'OVERDUE' OR (r.status = 'PENDING' AND r.due_date < ")
                .push_bind(now)
                .push("))");
        }
    }
}

#[async_trait]
impl ReminderStore for ReminderRepository {
    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, AppError> {
        let created = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (company_id, lead_id, user_id, title, description, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(reminder.company_id)
        .bind(reminder.lead_id)
        .bind(reminder.user_id)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(
        &self,
        scope: &Scope,
        status: Option<ReminderStatus>,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Vec<Reminder>, i64), AppError> {
        let mut qb = QueryBuilder::new("SELECT r.* FROM reminders r");
        push_reminder_predicate(&mut qb, scope, status, now);
        qb.push(" ORDER BY r.due_date ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let reminders = qb.build_query_as::<Reminder>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reminders r");
        push_reminder_predicate(&mut count, scope, status, now);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((reminders, total))
    }

    async fn complete(&self, scope: &Scope, reminder_id: Uuid) -> Result<Option<Reminder>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE reminders r SET status = 'COMPLETED', updated_at = NOW()",
        );
        scope.push_where(&mut qb, "r");
        qb.push(" AND r.id = ").push_bind(reminder_id);
        qb.push(" RETURNING r.*");

        let reminder = qb.build_query_as::<Reminder>().fetch_optional(&self.pool).await?;
        Ok(reminder)
    }
}
