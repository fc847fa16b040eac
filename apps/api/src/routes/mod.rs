pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessments::handlers as assessments;
use crate::state::AppState;
use crate::streak::handlers as streak;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessments
        .route(
            "/api/v1/assessments",
            post(assessments::handle_submit).get(assessments::handle_history),
        )
        .route(
            "/api/v1/assessments/crisis-consent",
            post(assessments::handle_crisis_consent),
        )
        // Streaks
        .route("/api/v1/streak", get(streak::handle_get_streak))
        .route(
            "/api/v1/admin/streaks/reset-missed",
            post(streak::handle_reset_missed),
        )
        .with_state(state)
}
