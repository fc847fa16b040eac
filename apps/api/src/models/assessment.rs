use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::scoring::{AssessmentResult, SeverityLabels};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: i64,
    pub assessment_date: NaiveDate,
    pub phq9_total: i32,
    pub gad7_total: i32,
    pub pss_total: i32,
    pub phq9_severity: String,
    pub gad7_severity: String,
    pub pss_severity: String,
    pub answers: Value,
    pub crisis_flagged: bool,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRow {
    pub fn result(&self) -> AssessmentResult {
        AssessmentResult {
            phq9: self.phq9_total,
            gad7: self.gad7_total,
            pss: self.pss_total,
            severity_labels: SeverityLabels {
                phq9: self.phq9_severity.clone(),
                gad7: self.gad7_severity.clone(),
                pss: self.pss_severity.clone(),
            },
        }
    }
}
