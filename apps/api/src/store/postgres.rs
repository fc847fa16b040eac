use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::pool::PoolConnection;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::db::{with_pool_retry, RetryPolicy};
use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::models::streak::StreakRow;
use crate::store::{NewAssessment, RecordedAssessment, WellnessStore};
use crate::streak::tracker::{self, StreakRecord};

/// PostgreSQL-backed store.
///
/// Streak writes lock the user's row with `SELECT ... FOR UPDATE` inside a
/// transaction, so two submissions racing on the same day cannot both
/// observe a one-day gap and double-increment. The assessment insert shares
/// that transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>, AppError> {
        Ok(with_pool_retry(self.retry, || self.pool.acquire()).await?)
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(with_pool_retry(self.retry, || self.pool.begin()).await?)
    }

    /// Materialises the streak row if needed and locks it for the rest of
    /// the transaction.
    async fn lock_streak(
        tx: &mut Transaction<'static, Postgres>,
        user_id: i64,
    ) -> Result<StreakRecord, AppError> {
        sqlx::query("INSERT INTO streaks (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        let row: StreakRow = sqlx::query_as("SELECT * FROM streaks WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.into())
    }

    async fn insert_row(
        tx: &mut Transaction<'static, Postgres>,
        new: &NewAssessment<'_>,
    ) -> Result<AssessmentRow, AppError> {
        let labels = &new.result.severity_labels;

        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO assessments
                (id, user_id, assessment_date, phq9_total, gad7_total, pss_total,
                 phq9_severity, gad7_severity, pss_severity, answers, crisis_flagged)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.assessment_date)
        .bind(new.result.phq9)
        .bind(new.result.gad7)
        .bind(new.result.pss)
        .bind(&labels.phq9)
        .bind(&labels.gad7)
        .bind(&labels.pss)
        .bind(Json(new.answers))
        .bind(new.crisis_flagged)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    async fn write_streak(
        tx: &mut Transaction<'static, Postgres>,
        user_id: i64,
        record: &StreakRecord,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE streaks
            SET current_streak = $2,
                longest_streak = $3,
                last_assessment_date = $4,
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(record.current_streak)
        .bind(record.longest_streak)
        .bind(record.last_assessment_date)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl WellnessStore for PgStore {
    async fn record_assessment(
        &self,
        new: NewAssessment<'_>,
        now: DateTime<Utc>,
    ) -> Result<RecordedAssessment, AppError> {
        let mut tx = self.begin().await?;
        let row = Self::insert_row(&mut tx, &new).await?;
        let current = Self::lock_streak(&mut tx, new.user_id).await?;

        // DeadlinePassed keeps the row and leaves the streak untouched.
        let streak = tracker::update(Some(&current), new.assessment_date, now);
        if let Ok(outcome) = &streak {
            if !outcome.same_day() {
                Self::write_streak(&mut tx, new.user_id, &outcome.record).await?;
            }
            debug!("Streak for user {}: {:?}", new.user_id, outcome.transition);
        }
        tx.commit().await?;

        Ok(RecordedAssessment { row, streak })
    }

    async fn list_assessments(&self, user_id: i64, limit: i64) -> Result<Vec<AssessmentRow>, AppError> {
        let mut conn = self.conn().await?;
        Ok(sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?)
    }

    async fn assessment_exists_for_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, AppError> {
        let mut conn = self.conn().await?;
        Ok(sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM assessments WHERE user_id = $1 AND assessment_date = $2)",
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&mut *conn)
        .await?)
    }

    async fn get_or_create_streak(&self, user_id: i64) -> Result<StreakRecord, AppError> {
        let mut conn = self.conn().await?;
        let row: StreakRow = sqlx::query_as(
            r#"
            INSERT INTO streaks (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.into())
    }

    async fn users_with_active_streaks(&self) -> Result<Vec<i64>, AppError> {
        let mut conn = self.conn().await?;
        Ok(sqlx::query_scalar(
            "SELECT user_id FROM streaks WHERE current_streak > 0 ORDER BY user_id",
        )
        .fetch_all(&mut *conn)
        .await?)
    }

    async fn apply_missed_deadline(
        &self,
        user_id: i64,
        assessed_yesterday: bool,
    ) -> Result<bool, AppError> {
        let mut tx = self.begin().await?;
        let current = Self::lock_streak(&mut tx, user_id).await?;

        let next = tracker::reset_if_missed_deadline(&current, assessed_yesterday);
        let changed = next != current;
        if changed {
            Self::write_streak(&mut tx, user_id, &next).await?;
        }
        tx.commit().await?;
        Ok(changed)
    }
}
