use crate::errors::CoreError;
use crate::models::image::EncodedImage;
use crate::models::prediction::PredictionOutcome;
use crate::providers::registry::PredictionProviderRegistry;

/// Runs a single prediction request against the primary provider.
///
/// Failures are logged here and returned unchanged; the caller decides how
/// to surface them. There is exactly one attempt per request.
pub struct AnalysisService {
    registry: PredictionProviderRegistry,
}

impl AnalysisService {
    pub fn new(registry: PredictionProviderRegistry) -> Self {
        Self { registry }
    }

    pub async fn request_outcome(
        &self,
        higher: &EncodedImage,
        lower: &EncodedImage,
    ) -> Result<PredictionOutcome, CoreError> {
        let provider = self.registry.primary().ok_or(CoreError::NoProvider)?;

        let result = provider.analyze(higher, lower).await.and_then(|outcome| {
            // An out-of-range prediction is a provider failure too.
            outcome.kind()?;
            Ok(outcome)
        });

        match &result {
            Ok(outcome) => tracing::info!(
                provider = provider.name(),
                prediction = %outcome.prediction,
                "Chart analysis completed"
            ),
            Err(e) => tracing::error!(provider = provider.name(), error = %e, "Chart analysis failed"),
        }
        result
    }

    #[must_use]
    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }
}
