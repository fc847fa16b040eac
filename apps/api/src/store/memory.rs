use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::AssessmentRow;
use crate::store::{NewAssessment, RecordedAssessment, WellnessStore};
use crate::streak::tracker::{self, StreakRecord};

/// In-process store for handler and service tests. A single mutex per table
/// stands in for row locks; `record_assessment` holds both.
#[derive(Default)]
pub struct MemoryStore {
    assessments: Mutex<Vec<AssessmentRow>>,
    streaks: Mutex<HashMap<i64, StreakRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Every `record_assessment` fails at commit, as a rolled-back
    /// transaction would, leaving both tables untouched.
    pub fn with_failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn with_streak(user_id: i64, record: StreakRecord) -> Self {
        let store = Self::default();
        store.streaks.lock().unwrap().insert(user_id, record);
        store
    }

    pub fn streak(&self, user_id: i64) -> Option<StreakRecord> {
        self.streaks.lock().unwrap().get(&user_id).copied()
    }

    pub fn assessment_count(&self) -> usize {
        self.assessments.lock().unwrap().len()
    }
}

#[async_trait]
impl WellnessStore for MemoryStore {
    async fn record_assessment(
        &self,
        new: NewAssessment<'_>,
        now: DateTime<Utc>,
    ) -> Result<RecordedAssessment, AppError> {
        let mut assessments = self.assessments.lock().unwrap();
        let mut streaks = self.streaks.lock().unwrap();

        let labels = &new.result.severity_labels;
        let row = AssessmentRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            assessment_date: new.assessment_date,
            phq9_total: new.result.phq9,
            gad7_total: new.result.gad7,
            pss_total: new.result.pss,
            phq9_severity: labels.phq9.clone(),
            gad7_severity: labels.gad7.clone(),
            pss_severity: labels.pss.clone(),
            answers: serde_json::to_value(new.answers).map_err(anyhow::Error::from)?,
            crisis_flagged: new.crisis_flagged,
            created_at: Utc::now(),
        };
        let streak = tracker::update(streaks.get(&new.user_id), new.assessment_date, now);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        if let Ok(outcome) = &streak {
            streaks.insert(new.user_id, outcome.record);
        }
        assessments.push(row.clone());
        Ok(RecordedAssessment { row, streak })
    }

    async fn list_assessments(&self, user_id: i64, limit: i64) -> Result<Vec<AssessmentRow>, AppError> {
        let rows = self.assessments.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn assessment_exists_for_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, AppError> {
        let rows = self.assessments.lock().unwrap();
        Ok(rows
            .iter()
            .any(|r| r.user_id == user_id && r.assessment_date == date))
    }

    async fn get_or_create_streak(&self, user_id: i64) -> Result<StreakRecord, AppError> {
        let mut streaks = self.streaks.lock().unwrap();
        Ok(*streaks.entry(user_id).or_default())
    }

    async fn users_with_active_streaks(&self) -> Result<Vec<i64>, AppError> {
        let streaks = self.streaks.lock().unwrap();
        let mut users: Vec<i64> = streaks
            .iter()
            .filter(|(_, r)| r.current_streak > 0)
            .map(|(id, _)| *id)
            .collect();
        users.sort_unstable();
        Ok(users)
    }

    async fn apply_missed_deadline(
        &self,
        user_id: i64,
        assessed_yesterday: bool,
    ) -> Result<bool, AppError> {
        let mut streaks = self.streaks.lock().unwrap();
        let current = *streaks.entry(user_id).or_default();
        let next = tracker::reset_if_missed_deadline(&current, assessed_yesterday);
        streaks.insert(user_id, next);
        Ok(next != current)
    }
}
