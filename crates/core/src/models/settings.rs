use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider name under which the Gemini API key is stored.
pub const GEMINI_KEY: &str = "gemini";

/// User-configurable settings for the prediction provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Model identifier passed to the provider (e.g., "gemini-2.5-flash").
    pub model: String,

    /// Sampling temperature for the analysis request.
    pub temperature: f32,

    /// Per-request timeout for the provider call, in seconds.
    pub request_timeout_secs: u64,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "gemini").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            request_timeout_secs: 60,
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with environment variables:
    /// `GEMINI_API_KEY`, `CHART_SIGNAL_MODEL`, `CHART_SIGNAL_TEMPERATURE`,
    /// `CHART_SIGNAL_TIMEOUT_SECS`. Unparseable numbers keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            settings.api_keys.insert(GEMINI_KEY.to_string(), key.trim().to_string());
        }
        if let Some(model) = lookup("CHART_SIGNAL_MODEL").filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        match lookup("CHART_SIGNAL_TEMPERATURE").map(|t| t.trim().parse::<f32>()) {
            Some(Ok(t)) if (0.0..=2.0).contains(&t) => settings.temperature = t,
            Some(_) => tracing::warn!("Ignoring invalid CHART_SIGNAL_TEMPERATURE"),
            None => {}
        }
        match lookup("CHART_SIGNAL_TIMEOUT_SECS").map(|t| t.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => settings.request_timeout_secs = secs,
            Some(_) => tracing::warn!("Ignoring invalid CHART_SIGNAL_TIMEOUT_SECS"),
            None => {}
        }

        settings
    }

    #[must_use]
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.api_keys.get(GEMINI_KEY).map(String::as_str)
    }
}
