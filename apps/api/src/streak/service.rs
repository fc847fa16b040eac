use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::store::WellnessStore;
use crate::streak::{StreakError, StreakRecord, StreakTransition, StreakUpdate};

/// Streak outcome attached to a recorded assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreakCredit {
    Updated {
        record: StreakRecord,
        transition: StreakTransition,
        same_day: bool,
    },
    /// The assessment was stored but earns no streak credit.
    NotCounted { reason: String },
}

/// Turns the streak half of a recorded assessment into what the caller sees.
///
/// `DeadlinePassed` is not an error for the caller: the assessment stands,
/// only the streak credit is refused.
pub fn streak_credit(user_id: i64, outcome: Result<StreakUpdate, StreakError>) -> StreakCredit {
    match outcome {
        Ok(outcome) => {
            info!(
                "Streak for user {user_id} {:?}: current {} longest {}",
                outcome.transition, outcome.record.current_streak, outcome.record.longest_streak
            );
            StreakCredit::Updated {
                record: outcome.record,
                transition: outcome.transition,
                same_day: outcome.same_day(),
            }
        }
        Err(err) => {
            warn!("No streak credit for user {user_id}: {err}");
            StreakCredit::NotCounted {
                reason: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub date: NaiveDate,
    pub examined: usize,
    pub reset: usize,
}

/// Daily job: zeroes every active streak whose owner did not assess on
/// `yesterday`.
pub async fn reset_missed_streaks(
    store: &dyn WellnessStore,
    yesterday: NaiveDate,
) -> Result<ResetSummary, AppError> {
    let users = store.users_with_active_streaks().await?;
    let mut reset = 0;

    for &user_id in &users {
        let assessed = store.assessment_exists_for_date(user_id, yesterday).await?;
        if store.apply_missed_deadline(user_id, assessed).await? {
            reset += 1;
        }
    }

    info!(
        "Missed-deadline reset for {yesterday}: examined {} users, reset {reset}",
        users.len()
    );
    Ok(ResetSummary {
        date: yesterday,
        examined: users.len(),
        reset,
    })
}
