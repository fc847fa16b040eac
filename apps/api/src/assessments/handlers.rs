//! Axum route handlers for the Assessment API.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessments::service::{
    resolve_crisis, submit_assessment, ConsentDecision, SubmissionOutcome,
};
use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::assessment::AssessmentRow;
use crate::scoring::AssessmentResult;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    /// `<instrument>-q<index>` -> selected option value.
    pub answers: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub struct CrisisConsentRequest {
    pub answers: HashMap<String, i64>,
    pub consent: ConsentDecision,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// History entry. Raw answers stay server side.
#[derive(Debug, Serialize)]
pub struct AssessmentSummary {
    pub id: Uuid,
    pub assessment_date: NaiveDate,
    pub result: AssessmentResult,
    pub crisis_flagged: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AssessmentRow> for AssessmentSummary {
    fn from(row: AssessmentRow) -> Self {
        Self {
            id: row.id,
            assessment_date: row.assessment_date,
            result: row.result(),
            crisis_flagged: row.crisis_flagged,
            created_at: row.created_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
///
/// Returns `outcome: "crisis"` (nothing stored) or `outcome: "results"`.
pub async fn handle_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let outcome = submit_assessment(&state, user.id, &req.answers).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/assessments/crisis-consent
pub async fn handle_crisis_consent(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CrisisConsentRequest>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let receipt = resolve_crisis(&state, user.id, &req.answers, req.consent).await?;
    Ok(Json(SubmissionOutcome::Results(receipt)))
}

/// GET /api/v1/assessments?limit=N
pub async fn handle_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<AssessmentSummary>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let rows = state.store.list_assessments(user.id, limit).await?;
    Ok(Json(rows.into_iter().map(AssessmentSummary::from).collect()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{body_json, test_state};

    fn post(uri: &str, user: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-user-id", user)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_results_with_streak() {
        let store = Arc::new(MemoryStore::default());
        let app = build_router(test_state(store.clone(), "2024-01-02"));

        let response = app
            .oneshot(post(
                "/api/v1/assessments",
                "12",
                json!({ "answers": { "phq9-q0": 3, "phq9-q1": 2, "gad7-q0": 1, "pss-q0": 2 } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "results");
        assert_eq!(body["result"]["phq9"], 5);
        assert_eq!(body["result"]["severity_labels"]["phq9"], "Mild depression");
        assert_eq!(body["risk"]["is_crisis"], false);
        assert_eq!(body["streak"]["status"], "updated");
        assert_eq!(body["streak"]["record"]["current_streak"], 1);
        assert_eq!(body["streak"]["same_day"], false);
        assert!(body.get("consent").is_none());
        assert_eq!(store.assessment_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_crisis_has_no_results() {
        let store = Arc::new(MemoryStore::default());
        let app = build_router(test_state(store.clone(), "2024-01-02"));

        let response = app
            .oneshot(post(
                "/api/v1/assessments",
                "12",
                json!({ "answers": { "phq9-q8": 2 } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "crisis");
        assert_eq!(body["risk"]["suicidal_ideation"], true);
        assert!(body.get("result").is_none());
        assert!(body.get("streak").is_none());
        assert_eq!(store.assessment_count(), 0);
    }

    #[tokio::test]
    async fn test_crisis_consent_records_assessment() {
        let store = Arc::new(MemoryStore::default());
        let app = build_router(test_state(store.clone(), "2024-01-02"));

        let response = app
            .oneshot(post(
                "/api/v1/assessments/crisis-consent",
                "12",
                json!({ "answers": { "phq9-q8": 1 }, "consent": "accepted" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["outcome"], "results");
        assert_eq!(body["consent"], "accepted");
        assert_eq!(body["streak"]["record"]["current_streak"], 1);
        assert_eq!(store.assessment_count(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_answer_is_bad_request() {
        let app = build_router(test_state(Arc::new(MemoryStore::default()), "2024-01-02"));

        let response = app
            .oneshot(post(
                "/api/v1/assessments",
                "12",
                json!({ "answers": { "pss-q3": 5 } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ANSWER");
    }

    #[tokio::test]
    async fn test_non_integer_answer_is_rejected() {
        let app = build_router(test_state(Arc::new(MemoryStore::default()), "2024-01-02"));

        let response = app
            .oneshot(post(
                "/api/v1/assessments",
                "12",
                json!({ "answers": { "phq9-q0": 1.5 } }),
            ))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_history_is_scoped_to_caller() {
        let store = Arc::new(MemoryStore::default());
        let state = test_state(store.clone(), "2024-01-02");

        for user in ["12", "12", "admin"] {
            let response = build_router(state.clone())
                .oneshot(post(
                    "/api/v1/assessments",
                    user,
                    json!({ "answers": { "gad7-q0": 2 } }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/assessments?limit=5")
                    .header("x-user-id", "12")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["result"]["gad7"], 2);
        assert!(entries[0].get("answers").is_none());
    }
}
