//! Deal stage vocabulary. Stages stay free text; these are the ones the
//! dashboard and keyword search know how to order and recognize.

pub const PROSPECT: &str = "prospect";
pub const QUALIFIED: &str = "qualified";
pub const NEGOTIATION: &str = "negotiation";
pub const AT_RISK: &str = "at risk";
pub const CLOSED_WON: &str = "closed won";
pub const CLOSED_LOST: &str = "closed lost";

/// Pipeline order used for dashboard breakdowns.
pub const PIPELINE_ORDER: [&str; 6] = [
    PROSPECT,
    QUALIFIED,
    NEGOTIATION,
    AT_RISK,
    CLOSED_WON,
    CLOSED_LOST,
];

/// A deal with no stage, or any stage other than closed, is open.
pub fn is_open(stage_lower: Option<&str>) -> bool {
    !matches!(stage_lower, Some(CLOSED_WON) | Some(CLOSED_LOST))
}

/// Position in the pipeline, `None` for stages outside the known vocabulary.
pub fn pipeline_position(stage_lower: &str) -> Option<usize> {
    PIPELINE_ORDER.iter().position(|s| *s == stage_lower)
}

/// "closed won" -> "Closed Won".
pub fn display_name(stage: &str) -> String {
    stage
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
