use axum::{extract::State, Json};
use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::state::AppState;
use crate::streak::service::{reset_missed_streaks, ResetSummary};
use crate::streak::StreakRecord;

/// GET /api/v1/streak
///
/// Read failures propagate as errors; a zeroed record is only returned for
/// users who genuinely have no streak yet.
pub async fn handle_get_streak(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<StreakRecord>, AppError> {
    let record = state.store.get_or_create_streak(user.id).await?;
    Ok(Json(record))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetMissedRequest {
    /// The day to check. Defaults to yesterday (UTC).
    pub date: Option<NaiveDate>,
}

/// POST /api/v1/admin/streaks/reset-missed
///
/// The body is optional so a bare cron `POST` resets for yesterday.
pub async fn handle_reset_missed(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Option<Json<ResetMissedRequest>>,
) -> Result<Json<ResetSummary>, AppError> {
    user.require_admin()?;

    let req = body.map(|Json(req)| req).unwrap_or_default();
    let yesterday = match req.date {
        Some(date) => date,
        None => {
            let today = state.clock.today();
            today
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| anyhow::anyhow!("no calendar day before {today}"))?
        }
    };

    let summary = reset_missed_streaks(state.store.as_ref(), yesterday).await?;
    Ok(Json(summary))
}
