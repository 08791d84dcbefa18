use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// The closed set of trading signals a provider may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PredictionKind {
    Buy,
    Sell,
    Wait,
}

impl std::fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionKind::Buy => write!(f, "BUY"),
            PredictionKind::Sell => write!(f, "SELL"),
            PredictionKind::Wait => write!(f, "WAIT"),
        }
    }
}

impl FromStr for PredictionKind {
    type Err = CoreError;

    /// Exact match on the provider's wire values; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(PredictionKind::Buy),
            "SELL" => Ok(PredictionKind::Sell),
            "WAIT" => Ok(PredictionKind::Wait),
            other => Err(CoreError::InvalidPredictionKind(other.to_string())),
        }
    }
}

/// Price levels attached to an actionable (Buy/Sell) signal.
/// Values are kept as the provider's free text, e.g. "1.0850".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLevels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<String>,
}

impl TradeLevels {
    /// True when at least one level carries non-blank text.
    #[must_use]
    pub fn has_any(&self) -> bool {
        [&self.entry_point, &self.take_profit, &self.stop_loss]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// A validated trading signal. Only actionable signals carry trade levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "prediction", rename_all = "UPPERCASE")]
pub enum Signal {
    Buy(TradeLevels),
    Sell(TradeLevels),
    Wait,
}

impl Signal {
    #[must_use]
    pub fn kind(&self) -> PredictionKind {
        match self {
            Signal::Buy(_) => PredictionKind::Buy,
            Signal::Sell(_) => PredictionKind::Sell,
            Signal::Wait => PredictionKind::Wait,
        }
    }

    /// Trade levels for Buy/Sell; `None` for Wait.
    #[must_use]
    pub fn levels(&self) -> Option<&TradeLevels> {
        match self {
            Signal::Buy(levels) | Signal::Sell(levels) => Some(levels),
            Signal::Wait => None,
        }
    }
}

/// Raw result of a prediction request, exactly as the provider returned it.
///
/// `prediction` stays a string here: it is validated when the outcome is turned
/// into a record, so an out-of-range value can be rejected without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub prediction: String,

    #[serde(default)]
    pub asset_name: Option<String>,

    pub justification: String,

    #[serde(default)]
    pub entry_point: Option<String>,

    #[serde(default)]
    pub take_profit: Option<String>,

    #[serde(default)]
    pub stop_loss: Option<String>,
}

impl PredictionOutcome {
    /// Build an outcome for a known prediction kind (no levels attached).
    pub fn new(kind: PredictionKind, justification: impl Into<String>) -> Self {
        Self {
            prediction: kind.to_string(),
            asset_name: None,
            justification: justification.into(),
            entry_point: None,
            take_profit: None,
            stop_loss: None,
        }
    }

    pub fn with_asset(mut self, asset_name: impl Into<String>) -> Self {
        self.asset_name = Some(asset_name.into());
        self
    }

    pub fn with_levels(
        mut self,
        entry_point: impl Into<String>,
        take_profit: impl Into<String>,
        stop_loss: impl Into<String>,
    ) -> Self {
        self.entry_point = Some(entry_point.into());
        self.take_profit = Some(take_profit.into());
        self.stop_loss = Some(stop_loss.into());
        self
    }

    /// Parse the prediction value against the closed set.
    pub fn kind(&self) -> Result<PredictionKind, CoreError> {
        self.prediction.parse()
    }

    /// Validate the outcome into a typed signal. Levels are dropped for Wait.
    pub fn to_signal(&self) -> Result<Signal, CoreError> {
        let levels = || TradeLevels {
            entry_point: self.entry_point.clone(),
            take_profit: self.take_profit.clone(),
            stop_loss: self.stop_loss.clone(),
        };
        Ok(match self.kind()? {
            PredictionKind::Buy => Signal::Buy(levels()),
            PredictionKind::Sell => Signal::Sell(levels()),
            PredictionKind::Wait => Signal::Wait,
        })
    }
}
