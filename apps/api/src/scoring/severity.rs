use crate::scoring::Instrument;

/// Inclusive upper bound -> label, checked in ascending order. The final
/// label applies to anything above the last bound.
struct Ladder {
    steps: &'static [(i32, &'static str)],
    top: &'static str,
}

const PHQ9_LADDER: Ladder = Ladder {
    steps: &[
        (4, "Minimal depression"),
        (9, "Mild depression"),
        (14, "Moderate depression"),
        (19, "Moderately severe depression"),
    ],
    top: "Severe depression",
};

const GAD7_LADDER: Ladder = Ladder {
    steps: &[
        (4, "Minimal anxiety"),
        (9, "Mild anxiety"),
        (14, "Moderate anxiety"),
    ],
    top: "Severe anxiety",
};

const PSS10_LADDER: Ladder = Ladder {
    steps: &[(13, "Low perceived stress"), (26, "Moderate perceived stress")],
    top: "High perceived stress",
};

/// Clinical severity label for an instrument total. First match wins.
pub fn classify_severity(instrument: Instrument, total: i32) -> &'static str {
    let ladder = match instrument {
        Instrument::Phq9 => &PHQ9_LADDER,
        Instrument::Gad7 => &GAD7_LADDER,
        Instrument::Pss10 => &PSS10_LADDER,
    };
    ladder
        .steps
        .iter()
        .find(|(bound, _)| total <= *bound)
        .map(|(_, label)| *label)
        .unwrap_or(ladder.top)
}
