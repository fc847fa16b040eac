// Assessment submission: scoring, crisis diversion, persistence and streak
// credit. All scoring math lives in `crate::scoring`.

pub mod handlers;
pub mod service;
