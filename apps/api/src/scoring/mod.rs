// Scoring engine for the PHQ-9, GAD-7 and PSS-10 self-report instruments.
// Pure functions only: no I/O, no clock, no persistence.

pub mod crisis;
pub mod instruments;
pub mod session;
pub mod severity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crisis::{detect_crisis, RiskAssessment};
pub use instruments::{compute_instrument_total, Instrument, PHQ9_SELF_HARM_ITEM};
pub use session::{AnswerSheet, AssessmentSession};
pub use severity::classify_severity;

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("answer {value} for '{question}' is outside the valid range [0, {max}]")]
    InvalidAnswerValue {
        question: String,
        value: i64,
        max: i32,
    },

    #[error("{instrument} has {question_count} questions; index {index} is out of range")]
    QuestionOutOfRange {
        instrument: &'static str,
        index: usize,
        question_count: usize,
    },

    #[error("unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("malformed question key '{0}', expected '<instrument>-q<index>'")]
    MalformedQuestionKey(String),

    #[error("question '{0}' answered more than once")]
    DuplicateQuestion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityLabels {
    pub phq9: String,
    pub gad7: String,
    pub pss: String,
}

/// Totals and labels for one submission. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub phq9: i32,
    pub gad7: i32,
    pub pss: i32,
    pub severity_labels: SeverityLabels,
}

/// Everything the engine derives from one answer sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredSubmission {
    pub result: AssessmentResult,
    pub risk: RiskAssessment,
}

/// Scores all three instruments and runs crisis detection.
pub fn score_answers(sheet: &AnswerSheet) -> Result<ScoredSubmission, ScoringError> {
    let phq9 = compute_instrument_total(Instrument::Phq9, sheet.answers_for(Instrument::Phq9))?;
    let gad7 = compute_instrument_total(Instrument::Gad7, sheet.answers_for(Instrument::Gad7))?;
    let pss = compute_instrument_total(Instrument::Pss10, sheet.answers_for(Instrument::Pss10))?;

    let item9 = sheet
        .answers_for(Instrument::Phq9)
        .get(&PHQ9_SELF_HARM_ITEM)
        .copied()
        .unwrap_or(0);

    Ok(ScoredSubmission {
        result: AssessmentResult {
            phq9,
            gad7,
            pss,
            severity_labels: SeverityLabels {
                phq9: classify_severity(Instrument::Phq9, phq9).to_string(),
                gad7: classify_severity(Instrument::Gad7, gad7).to_string(),
                pss: classify_severity(Instrument::Pss10, pss).to_string(),
            },
        },
        risk: detect_crisis(phq9, gad7, pss, item9),
    })
}
