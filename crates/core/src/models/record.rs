use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prediction::{PredictionKind, PredictionOutcome, Signal, TradeLevels};
use crate::errors::CoreError;

/// User-declared outcome of a signal. Any state may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Won,
    Lost,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(f, "Pending"),
            AnalysisStatus::Won => write!(f, "Won"),
            AnalysisStatus::Lost => write!(f, "Lost"),
        }
    }
}

/// One completed prediction request plus its tracked real-world outcome.
///
/// Everything except `status` is fixed at creation. The journal only hands
/// out shared references, so status changes go through `JournalService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// `<ISO-8601 instant>-<disambiguator>`; the date precedes the first `T`.
    pub id: String,

    /// Creation instant, the same one embedded in `id`.
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub signal: Signal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    pub justification: String,

    #[serde(default)]
    pub status: AnalysisStatus,
}

impl AnalysisRecord {
    /// Validate an outcome and build a `Pending` record stamped with `now`.
    pub fn from_outcome(outcome: &PredictionOutcome, now: DateTime<Utc>) -> Result<Self, CoreError> {
        let signal = outcome.to_signal()?;
        Ok(Self {
            id: Self::make_id(now),
            created_at: now,
            signal,
            asset_name: outcome.asset_name.clone(),
            justification: outcome.justification.clone(),
            status: AnalysisStatus::Pending,
        })
    }

    /// e.g. `2024-05-01T10:00:00.000Z-9f1c0e7a2b3d4c5e8f9a0b1c2d3e4f50`
    pub fn make_id(now: DateTime<Utc>) -> String {
        format!(
            "{}-{}",
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
            Uuid::new_v4().simple()
        )
    }

    /// Calendar-date portion of the id (everything before the first `T`).
    #[must_use]
    pub fn id_date(&self) -> &str {
        self.id.split('T').next().unwrap_or(&self.id)
    }

    #[must_use]
    pub fn prediction(&self) -> PredictionKind {
        self.signal.kind()
    }

    #[must_use]
    pub fn levels(&self) -> Option<&TradeLevels> {
        self.signal.levels()
    }

    #[must_use]
    pub fn entry_point(&self) -> Option<&str> {
        self.levels().and_then(|l| l.entry_point.as_deref())
    }

    #[must_use]
    pub fn take_profit(&self) -> Option<&str> {
        self.levels().and_then(|l| l.take_profit.as_deref())
    }

    #[must_use]
    pub fn stop_loss(&self) -> Option<&str> {
        self.levels().and_then(|l| l.stop_loss.as_deref())
    }

    /// Buy/Sell records are trades that can be marked won or lost; Wait is not.
    #[must_use]
    pub fn is_trade(&self) -> bool {
        self.prediction() != PredictionKind::Wait
    }

    /// True for a trade carrying at least one non-blank price level.
    #[must_use]
    pub fn has_trade_levels(&self) -> bool {
        self.levels().is_some_and(TradeLevels::has_any)
    }
}
