//! Answer collection for a single submission.
//!
//! An `AssessmentSession` is owned by exactly one request. Nothing about an
//! in-progress questionnaire lives in shared state.

use std::collections::{BTreeMap, HashMap};

use crate::scoring::{score_answers, Instrument, ScoredSubmission, ScoringError};

/// Validated answers grouped by instrument, keyed by 0-based question index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: BTreeMap<Instrument, BTreeMap<usize, i32>>,
}

impl AnswerSheet {
    /// Parses raw `<instrument>-q<index>` keyed answers.
    pub fn from_raw(raw: &HashMap<String, i64>) -> Result<Self, ScoringError> {
        let mut sheet = AnswerSheet::default();
        for (key, value) in raw {
            sheet.insert(key, *value)?;
        }
        Ok(sheet)
    }

    /// Validates and stores a single answer. Each question may be answered
    /// once per sheet.
    pub fn insert(&mut self, key: &str, value: i64) -> Result<(), ScoringError> {
        let (instrument, index) = parse_question_key(key)?;
        let spec = instrument.spec();

        if index >= spec.question_count {
            return Err(ScoringError::QuestionOutOfRange {
                instrument: instrument.name(),
                index,
                question_count: spec.question_count,
            });
        }
        if value < 0 || value > spec.max_option_value as i64 {
            return Err(ScoringError::InvalidAnswerValue {
                question: key.to_string(),
                value,
                max: spec.max_option_value,
            });
        }

        let answers = self.answers.entry(instrument).or_default();
        if answers.contains_key(&index) {
            return Err(ScoringError::DuplicateQuestion(key.to_string()));
        }
        answers.insert(index, value as i32);
        Ok(())
    }

    pub fn answers_for(&self, instrument: Instrument) -> &BTreeMap<usize, i32> {
        static EMPTY: BTreeMap<usize, i32> = BTreeMap::new();
        self.answers.get(&instrument).unwrap_or(&EMPTY)
    }

    /// Flattens back to `<instrument>-q<index>` keys for storage.
    pub fn to_keyed_map(&self) -> BTreeMap<String, i32> {
        self.answers
            .iter()
            .flat_map(|(instrument, answers)| {
                answers
                    .iter()
                    .map(move |(index, value)| (instrument.question_key(*index), *value))
            })
            .collect()
    }
}

/// Only the canonical spelling is accepted: `phq9-q8`, never `phq9-q08` or
/// `phq9-q+8`, so every question has exactly one key.
fn parse_question_key(key: &str) -> Result<(Instrument, usize), ScoringError> {
    let malformed = || ScoringError::MalformedQuestionKey(key.to_string());

    let (prefix, digits) = key.split_once("-q").ok_or_else(malformed)?;
    let instrument =
        Instrument::from_prefix(prefix).ok_or_else(|| ScoringError::UnknownQuestion(key.to_string()))?;

    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if !canonical {
        return Err(malformed());
    }
    let index = digits.parse::<usize>().map_err(|_| malformed())?;
    Ok((instrument, index))
}

/// One user's questionnaire, from raw submission to scored result.
#[derive(Debug, Clone, Default)]
pub struct AssessmentSession {
    sheet: AnswerSheet,
}

impl AssessmentSession {
    pub fn from_submission(raw: &HashMap<String, i64>) -> Result<Self, ScoringError> {
        Ok(Self {
            sheet: AnswerSheet::from_raw(raw)?,
        })
    }

    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    /// Question keys with no answer. They are scored as 0.
    pub fn unanswered(&self) -> Vec<String> {
        Instrument::ALL
            .into_iter()
            .flat_map(|instrument| {
                let answered = self.sheet.answers_for(instrument);
                (0..instrument.spec().question_count)
                    .filter(|i| !answered.contains_key(i))
                    .map(move |i| instrument.question_key(i))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.unanswered().is_empty()
    }

    pub fn score(&self) -> Result<ScoredSubmission, ScoringError> {
        score_answers(&self.sheet)
    }
}
