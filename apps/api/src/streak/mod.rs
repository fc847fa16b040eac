// Streak tracking: pure transitions in `tracker`, orchestration over the
// store in `service`, HTTP in `handlers`.

pub mod clock;
pub mod handlers;
pub mod service;
pub mod tracker;

use chrono::NaiveTime;
use thiserror::Error;

pub use clock::{Clock, SystemClock};
pub use tracker::{StreakRecord, StreakTransition, StreakUpdate};

#[derive(Debug, Error, PartialEq)]
pub enum StreakError {
    #[error("streak deadline passed at {at}; this assessment does not count toward the streak")]
    DeadlinePassed { at: NaiveTime },
}
