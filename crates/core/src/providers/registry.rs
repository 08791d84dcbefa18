use crate::models::settings::Settings;

use super::gemini::GeminiProvider;
use super::traits::PredictionProvider;

/// Registry of the configured prediction providers.
///
/// The first registered provider is the one used for analysis. A provider
/// that needs an API key is only registered when the key is present.
pub struct PredictionProviderRegistry {
    providers: Vec<Box<dyn PredictionProvider>>,
}

impl PredictionProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with every provider the settings can configure.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // Gemini: requires API key
        if let Some(key) = settings.gemini_api_key() {
            registry.register(Box::new(GeminiProvider::new(key.to_string(), settings)));
        } else {
            tracing::info!("No Gemini API key configured; analysis is unavailable");
        }

        registry
    }

    /// Register a new prediction provider.
    pub fn register(&mut self, provider: Box<dyn PredictionProvider>) {
        self.providers.push(provider);
    }

    /// The provider used for analysis, if any is configured.
    pub fn primary(&self) -> Option<&dyn PredictionProvider> {
        self.providers.first().map(|p| p.as_ref())
    }

    /// Look up a provider by its display name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&dyn PredictionProvider> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(|p| p.as_ref())
    }

    /// Names of all registered providers, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for PredictionProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
