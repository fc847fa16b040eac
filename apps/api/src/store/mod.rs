//! Persistence for assessments and streaks.
//!
//! Handlers and services talk to `Arc<dyn WellnessStore>` so the Postgres
//! backend can be swapped for the in-memory one in tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::scoring::AssessmentResult;
use crate::streak::{StreakError, StreakRecord, StreakUpdate};

pub use postgres::PgStore;

/// A scored submission ready to be written.
pub struct NewAssessment<'a> {
    pub user_id: i64,
    pub assessment_date: NaiveDate,
    pub result: &'a AssessmentResult,
    pub answers: &'a BTreeMap<String, i32>,
    pub crisis_flagged: bool,
}

/// What a single `record_assessment` call wrote.
#[derive(Debug)]
pub struct RecordedAssessment {
    pub row: AssessmentRow,
    /// `Err` when the assessment earns no streak credit. The row is stored
    /// either way.
    pub streak: Result<StreakUpdate, StreakError>,
}

#[async_trait]
pub trait WellnessStore: Send + Sync {
    /// Inserts the assessment and applies `tracker::update` to the user's
    /// streak (with `new.assessment_date` as today) in one transaction.
    /// Either both are written or neither is. Concurrent calls for the same
    /// user are serialised on the streak row.
    async fn record_assessment(
        &self,
        new: NewAssessment<'_>,
        now: DateTime<Utc>,
    ) -> Result<RecordedAssessment, AppError>;

    /// Newest first.
    async fn list_assessments(&self, user_id: i64, limit: i64) -> Result<Vec<AssessmentRow>, AppError>;

    async fn assessment_exists_for_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, AppError>;

    /// Returns the user's streak, creating a zeroed record on first access.
    async fn get_or_create_streak(&self, user_id: i64) -> Result<StreakRecord, AppError>;

    async fn users_with_active_streaks(&self) -> Result<Vec<i64>, AppError>;

    /// Applies `tracker::reset_if_missed_deadline` under the same per-user
    /// serialisation as `record_assessment`. Returns true if the streak was reset.
    async fn apply_missed_deadline(
        &self,
        user_id: i64,
        assessed_yesterday: bool,
    ) -> Result<bool, AppError>;
}
