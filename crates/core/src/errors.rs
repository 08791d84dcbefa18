use thiserror::Error;

/// Unified error type for the entire chart-signal-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Prediction Provider ─────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response from prediction provider")]
    EmptyResponse,

    #[error("Invalid prediction value received: {0}")]
    InvalidPredictionKind(String),

    #[error("No prediction provider configured")]
    NoProvider,

    // ── Image Input ─────────────────────────────────────────────────
    #[error("Not an image: {0}")]
    InvalidImage(String),

    #[error("Both higher and lower timeframe images are required")]
    MissingImages,

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Whether this error came from the prediction call (network, malformed
    /// response or an out-of-range prediction value).
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Api { .. }
                | CoreError::Network(_)
                | CoreError::EmptyResponse
                | CoreError::InvalidPredictionKind(_)
                | CoreError::NoProvider
                | CoreError::Deserialization(_)
        )
    }

    /// Single human-readable message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Deserialization(_) => {
                "Could not get a valid JSON response from the AI. Please try again.".to_string()
            }
            CoreError::EmptyResponse => {
                "The AI response was empty; the chart images may not be clear enough.".to_string()
            }
            CoreError::Api { .. }
            | CoreError::Network(_)
            | CoreError::InvalidPredictionKind(_) => {
                "Failed to analyze the images. The AI service may be experiencing problems."
                    .to_string()
            }
            CoreError::MissingImages => {
                "Please upload images for both timeframes.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<base64::DecodeError> for CoreError {
    fn from(e: base64::DecodeError) -> Self {
        CoreError::InvalidImage(format!("payload is not valid base64: {e}"))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors can carry the full request URL; keep secrets in the
        // query string out of logs and user-facing messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
