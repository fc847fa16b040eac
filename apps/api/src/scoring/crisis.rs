use serde::{Deserialize, Serialize};

pub const HIGH_RISK_PHQ9: i32 = 20;
pub const HIGH_RISK_GAD7: i32 = 15;
pub const HIGH_RISK_PSS: i32 = 27;

/// Rule-based risk flags derived from one submission. Not persisted as its
/// own entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub suicidal_ideation: bool,
    pub high_risk_depression: bool,
    pub high_risk_anxiety: bool,
    pub high_risk_stress: bool,
    pub is_crisis: bool,
}

/// Evaluates the crisis rules. Any single rule firing marks the submission
/// as a crisis:
/// 1. any non-zero answer to the PHQ-9 self-harm item
/// 2. PHQ-9 total ≥ 20
/// 3. PHQ-9 total ≥ 20 together with GAD-7 total ≥ 15
/// 4. PHQ-9 total ≥ 20 together with PSS-10 total ≥ 27
///
/// Must run before anything is persisted.
pub fn detect_crisis(
    phq9_total: i32,
    gad7_total: i32,
    pss_total: i32,
    phq9_item9_value: i32,
) -> RiskAssessment {
    let suicidal_ideation = phq9_item9_value >= 1;
    let high_risk_depression = phq9_total >= HIGH_RISK_PHQ9;
    let high_risk_anxiety = high_risk_depression && gad7_total >= HIGH_RISK_GAD7;
    let high_risk_stress = high_risk_depression && pss_total >= HIGH_RISK_PSS;

    RiskAssessment {
        suicidal_ideation,
        high_risk_depression,
        high_risk_anxiety,
        high_risk_stress,
        is_crisis: suicidal_ideation
            || high_risk_depression
            || high_risk_anxiety
            || high_risk_stress,
    }
}
