//! Assessment submission flow.
//!
//! score -> crisis? -> persist -> streak credit
//!
//! A crisis result is returned before anything is written. The caller then
//! resolves consent and resubmits through `resolve_crisis`, which records the
//! assessment flagged and credits the streak as usual.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::{AssessmentResult, AssessmentSession, RiskAssessment, ScoredSubmission};
use crate::state::AppState;
use crate::store::NewAssessment;
use crate::streak::service::{streak_credit, StreakCredit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentDecision {
    Accepted,
    Declined,
}

/// A persisted assessment and what it earned.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReceipt {
    pub assessment_id: Uuid,
    pub assessment_date: NaiveDate,
    pub result: AssessmentResult,
    pub risk: RiskAssessment,
    pub streak: StreakCredit,
    pub unanswered: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentDecision>,
}

/// Exactly one of: crisis flow, or normal results.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Crisis { risk: RiskAssessment },
    Results(AssessmentReceipt),
}

pub async fn submit_assessment(
    state: &AppState,
    user_id: i64,
    answers: &HashMap<String, i64>,
) -> Result<SubmissionOutcome, AppError> {
    let session = AssessmentSession::from_submission(answers)?;
    let scored = session.score()?;

    if scored.risk.is_crisis {
        warn!("Crisis indicators for user {user_id}; diverting to consent flow");
        return Ok(SubmissionOutcome::Crisis { risk: scored.risk });
    }

    let receipt = record_assessment(state, user_id, &session, scored, None).await?;
    Ok(SubmissionOutcome::Results(receipt))
}

/// Records a crisis-flagged submission once the user has answered the
/// consent prompt. Scores are recomputed from the answers; anything that
/// does not actually trip the crisis rules is rejected.
pub async fn resolve_crisis(
    state: &AppState,
    user_id: i64,
    answers: &HashMap<String, i64>,
    consent: ConsentDecision,
) -> Result<AssessmentReceipt, AppError> {
    let session = AssessmentSession::from_submission(answers)?;
    let scored = session.score()?;

    if !scored.risk.is_crisis {
        return Err(AppError::Validation(
            "these answers do not require crisis consent; submit them as a normal assessment"
                .to_string(),
        ));
    }

    info!("Crisis consent {consent:?} for user {user_id}");
    record_assessment(state, user_id, &session, scored, Some(consent)).await
}

async fn record_assessment(
    state: &AppState,
    user_id: i64,
    session: &AssessmentSession,
    scored: ScoredSubmission,
    consent: Option<ConsentDecision>,
) -> Result<AssessmentReceipt, AppError> {
    let now = state.clock.now();
    let today = now.date_naive();
    let answers = session.sheet().to_keyed_map();
    if !session.is_complete() {
        debug!(
            "User {user_id} left {} questions unanswered; scored as 0",
            session.unanswered().len()
        );
    }

    let recorded = state
        .store
        .record_assessment(
            NewAssessment {
                user_id,
                assessment_date: today,
                result: &scored.result,
                answers: &answers,
                crisis_flagged: scored.risk.is_crisis,
            },
            now,
        )
        .await?;

    info!(
        "Recorded assessment {} for user {user_id} (PHQ-9 {}, GAD-7 {}, PSS-10 {})",
        recorded.row.id, scored.result.phq9, scored.result.gad7, scored.result.pss
    );

    let streak = streak_credit(user_id, recorded.streak);

    Ok(AssessmentReceipt {
        assessment_id: recorded.row.id,
        assessment_date: recorded.row.assessment_date,
        result: scored.result,
        risk: scored.risk,
        streak,
        unanswered: session.unanswered(),
        consent,
    })
}
