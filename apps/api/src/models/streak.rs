use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::streak::StreakRecord;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StreakRow {
    pub user_id: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_assessment_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<StreakRow> for StreakRecord {
    fn from(row: StreakRow) -> Self {
        StreakRecord {
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_assessment_date: row.last_assessment_date,
        }
    }
}
