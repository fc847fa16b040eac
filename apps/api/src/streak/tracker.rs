//! Consecutive-day assessment streaks.
//!
//! Pure transition functions over a `StreakRecord`. Persistence and locking
//! are the store's job; see `WellnessStore::record_assessment`.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::streak::StreakError;

/// Per-user streak state. `longest_streak >= current_streak` after every
/// transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_assessment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    Started,
    Extended,
    Reset,
    SameDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub record: StreakRecord,
    pub transition: StreakTransition,
}

impl StreakUpdate {
    pub fn same_day(&self) -> bool {
        self.transition == StreakTransition::SameDay
    }
}

/// Daily cutoff check, evaluated on the UTC wall clock.
///
/// Known quirk: every valid time of day satisfies this, so the
/// `DeadlinePassed` branch of `update` cannot fire. Kept literal until the
/// intended cutoff is confirmed.
pub fn is_before_deadline(now: DateTime<Utc>) -> bool {
    let (hour, minute) = (now.hour(), now.minute());
    hour < 23 || (hour == 23 && minute <= 59)
}

/// Applies one assessment on `today` to the user's streak.
///
/// - no record, or no previous assessment: starts at 1
/// - same day: unchanged
/// - next day: extends by 1
/// - any larger gap, or a date before the last one: resets to 1
pub fn update(
    record: Option<&StreakRecord>,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<StreakUpdate, StreakError> {
    if !is_before_deadline(now) {
        return Err(StreakError::DeadlinePassed { at: now.time() });
    }

    let (record, last) = match record {
        Some(record) => match record.last_assessment_date {
            Some(last) => (record, last),
            None => return Ok(started(today)),
        },
        None => return Ok(started(today)),
    };

    let diff_days = (today - last).num_days();
    let (current_streak, transition) = match diff_days {
        0 => {
            return Ok(StreakUpdate {
                record: *record,
                transition: StreakTransition::SameDay,
            })
        }
        1 => (record.current_streak + 1, StreakTransition::Extended),
        _ => (1, StreakTransition::Reset),
    };

    Ok(StreakUpdate {
        record: StreakRecord {
            current_streak,
            longest_streak: record.longest_streak.max(current_streak),
            last_assessment_date: Some(today),
        },
        transition,
    })
}

fn started(today: NaiveDate) -> StreakUpdate {
    StreakUpdate {
        record: StreakRecord {
            current_streak: 1,
            longest_streak: 1,
            last_assessment_date: Some(today),
        },
        transition: StreakTransition::Started,
    }
}

/// Daily batch rule: an active streak with no assessment yesterday drops to
/// zero. Longest streak and last date are left as they were.
pub fn reset_if_missed_deadline(record: &StreakRecord, assessed_yesterday: bool) -> StreakRecord {
    if record.current_streak > 0 && !assessed_yesterday {
        StreakRecord {
            current_streak: 0,
            ..*record
        }
    } else {
        *record
    }
}
