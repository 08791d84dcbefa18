use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::PredictionProvider;
use crate::errors::CoreError;
use crate::models::image::EncodedImage;
use crate::models::prediction::PredictionOutcome;
use crate::models::settings::Settings;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";

const ANALYSIS_PROMPT: &str = "You are an expert trading analyst. Your analysis is based on \
identifying fractal patterns and repetitive price movements across two different timeframes. \
Your goal is to give a clear trading signal (BUY, SELL or WAIT) with a concise justification. \
Also identify the name of the financial instrument (e.g. 'EUR/USD', 'BTC/USDT'), usually shown \
in the top-left corner of the images, and return it. For BUY or SELL signals you must give \
Entry Point, Take Profit and Stop Loss levels with a strict reward/risk ratio between 1:2 and \
1:3: the distance from entry to take profit must be 2 to 3 times the distance from entry to \
stop loss. Base your analysis ONLY on the visual information in the images.\n\n\
Analyze the attached market charts. The first image is the higher timeframe and the second is \
the lower timeframe. Respond in JSON matching the provided schema. Only predict WAIT when no \
clear high-probability pattern is visible.";

/// Google Gemini `generateContent` provider.
///
/// - **Auth**: API key sent in the `x-goog-api-key` header.
/// - **Output**: JSON constrained by a response schema with an enum on `prediction`.
/// - **Failure model**: one request, no retries. Any failure surfaces as a `CoreError`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, settings: &Settings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (proxies, local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Schema the model's JSON answer must follow.
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "prediction": {
                    "type": "STRING",
                    "description": "The trading signal: one of BUY, SELL or WAIT.",
                    "enum": ["BUY", "SELL", "WAIT"]
                },
                "assetName": {
                    "type": "STRING",
                    "description": "Instrument analyzed, read from the top-left corner of the images (e.g. 'EUR/USD'). Omit if not visible."
                },
                "justification": {
                    "type": "STRING",
                    "description": "Concise explanation of the prediction based on fractal analysis of the charts."
                },
                "entryPoint": {
                    "type": "STRING",
                    "description": "Suggested entry price. Omit when the prediction is WAIT."
                },
                "takeProfit": {
                    "type": "STRING",
                    "description": "Take-profit price. Omit when the prediction is WAIT."
                },
                "stopLoss": {
                    "type": "STRING",
                    "description": "Stop-loss price. Omit when the prediction is WAIT."
                }
            },
            "required": ["prediction", "justification"]
        })
    }

    /// Full `generateContent` request body: prompt, then higher and lower timeframe images.
    pub fn build_request_body(&self, higher: &EncodedImage, lower: &EncodedImage) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": ANALYSIS_PROMPT },
                    { "inlineData": { "mimeType": higher.mime_type, "data": higher.data } },
                    { "inlineData": { "mimeType": lower.mime_type, "data": lower.data } }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
                "temperature": self.temperature
            }
        })
    }

    /// Parse the model's JSON text into an outcome, validating the prediction value.
    pub fn parse_outcome(text: &str) -> Result<PredictionOutcome, CoreError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyResponse);
        }
        let outcome: PredictionOutcome = serde_json::from_str(trimmed)?;
        outcome.kind()?;
        Ok(outcome)
    }

    /// Concatenate the text parts of the first candidate.
    pub fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let candidate = response.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

// ── Gemini API response types ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PredictionProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn analyze(
        &self,
        higher: &EncodedImage,
        lower: &EncodedImage,
    ) -> Result<PredictionOutcome, CoreError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        tracing::debug!(
            model = %self.model,
            higher = %higher.name,
            lower = %lower.name,
            "Sending chart analysis request"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(higher, lower))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {status}: {}", body.trim()),
            });
        }

        let parsed: GenerateContentResponse = resp.json().await.map_err(|e| {
            CoreError::Deserialization(format!("Failed to parse {PROVIDER} response: {e}"))
        })?;

        let text = Self::extract_text(&parsed).ok_or(CoreError::EmptyResponse)?;
        let outcome = Self::parse_outcome(&text)?;
        tracing::debug!(prediction = %outcome.prediction, "Received chart analysis");
        Ok(outcome)
    }
}
