use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::image::EncodedImage;
use crate::models::prediction::PredictionOutcome;

/// Trait abstraction for the external chart-analysis service.
///
/// The core only cares whether the call succeeded and, if so, what outcome
/// came back. Vendor, model and prompt stay inside the implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PredictionProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Analyze a higher-timeframe and a lower-timeframe chart image.
    /// A single attempt; no retries.
    async fn analyze(
        &self,
        higher: &EncodedImage,
        lower: &EncodedImage,
    ) -> Result<PredictionOutcome, CoreError>;
}
