//! Instrument definitions and per-instrument totals.
//!
//! Each instrument is a fixed, ordered list of questions answered on a bounded
//! integer scale. PSS-10 carries four reverse-scored items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::ScoringError;

/// The three self-report instruments scored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Phq9,
    Gad7,
    #[serde(rename = "pss")]
    Pss10,
}

/// Shape of an instrument: how many questions, the top of the answer scale,
/// and which 0-based question indices are reverse-scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub question_count: usize,
    pub max_option_value: i32,
    pub reverse_scored: &'static [usize],
}

impl InstrumentSpec {
    /// Highest total the instrument can produce.
    pub fn max_total(&self) -> i32 {
        self.question_count as i32 * self.max_option_value
    }
}

const PHQ9_SPEC: InstrumentSpec = InstrumentSpec {
    question_count: 9,
    max_option_value: 3,
    reverse_scored: &[],
};

const GAD7_SPEC: InstrumentSpec = InstrumentSpec {
    question_count: 7,
    max_option_value: 3,
    reverse_scored: &[],
};

const PSS10_SPEC: InstrumentSpec = InstrumentSpec {
    question_count: 10,
    max_option_value: 4,
    reverse_scored: &[3, 4, 6, 7],
};

/// PHQ-9 question 9 (0-based index 8): thoughts of self-harm.
pub const PHQ9_SELF_HARM_ITEM: usize = 8;

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Phq9, Instrument::Gad7, Instrument::Pss10];

    /// Stable identifier, also used as the question-key prefix (`phq9-q0`).
    pub fn id(&self) -> &'static str {
        match self {
            Instrument::Phq9 => "phq9",
            Instrument::Gad7 => "gad7",
            Instrument::Pss10 => "pss",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Phq9 => "PHQ-9",
            Instrument::Gad7 => "GAD-7",
            Instrument::Pss10 => "PSS-10",
        }
    }

    pub fn spec(&self) -> InstrumentSpec {
        match self {
            Instrument::Phq9 => PHQ9_SPEC,
            Instrument::Gad7 => GAD7_SPEC,
            Instrument::Pss10 => PSS10_SPEC,
        }
    }

    /// Look up an instrument by its key prefix.
    pub fn from_prefix(prefix: &str) -> Option<Instrument> {
        Instrument::ALL.into_iter().find(|i| i.id() == prefix)
    }

    /// Question key for a 0-based index, e.g. `gad7-q3`.
    pub fn question_key(&self, index: usize) -> String {
        format!("{}-q{}", self.id(), index)
    }
}

/// Sums an instrument's answers.
///
/// Unanswered questions count as 0. Reverse-scored items contribute
/// `max_option_value - v`. Any index past the question count or any value
/// outside `[0, max_option_value]` is rejected.
pub fn compute_instrument_total(
    instrument: Instrument,
    answers: &BTreeMap<usize, i32>,
) -> Result<i32, ScoringError> {
    let spec = instrument.spec();

    if let Some((&index, _)) = answers.range(spec.question_count..).next() {
        return Err(ScoringError::QuestionOutOfRange {
            instrument: instrument.name(),
            index,
            question_count: spec.question_count,
        });
    }

    let mut total = 0;
    for index in 0..spec.question_count {
        let value = answers.get(&index).copied().unwrap_or(0);
        if !(0..=spec.max_option_value).contains(&value) {
            return Err(ScoringError::InvalidAnswerValue {
                question: instrument.question_key(index),
                value: value as i64,
                max: spec.max_option_value,
            });
        }
        total += if spec.reverse_scored.contains(&index) {
            spec.max_option_value - value
        } else {
            value
        };
    }
    debug_assert!((0..=spec.max_total()).contains(&total));
    Ok(total)
}
