use serde::{Deserialize, Serialize};

/// Label used for effectiveness when no trade has been evaluated yet.
pub const NOT_APPLICABLE: &str = "N/A";

/// Aggregate performance over a set of analysis records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    /// Records marked as won
    pub won: usize,

    /// Records marked as lost
    pub lost: usize,

    /// Open trades: pending records whose prediction is not Wait
    pub pending: usize,

    /// won + lost
    pub evaluated: usize,

    /// Win rate as a percentage with one decimal (e.g. "66.7%"), or "N/A"
    pub effectiveness: String,

    /// Win rate in percent, `None` when nothing has been evaluated
    pub win_rate: Option<f64>,
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self {
            won: 0,
            lost: 0,
            pending: 0,
            evaluated: 0,
            effectiveness: NOT_APPLICABLE.to_string(),
            win_rate: None,
        }
    }
}
