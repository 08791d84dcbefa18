pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{NaiveDate, Utc};
use models::{
    image::{ChartPair, EncodedImage},
    journal::Journal,
    prediction::PredictionOutcome,
    record::{AnalysisRecord, AnalysisStatus},
    settings::Settings,
    stats::PerformanceStats,
};
use providers::{registry::PredictionProviderRegistry, traits::PredictionProvider};
use services::{
    analysis_service::AnalysisService, history_service::HistoryService,
    journal_service::JournalService, metrics_service::MetricsService,
};
use std::collections::BTreeSet;

use errors::CoreError;

/// Main entry point for the Chart Signal core library.
/// Owns the session's record journal and all services that operate on it.
#[must_use]
pub struct SignalJournal {
    journal: Journal,
    settings: Settings,
    journal_service: JournalService,
    history_service: HistoryService,
    metrics_service: MetricsService,
    analysis_service: AnalysisService,
    /// Images uploaded so far for the next analysis.
    staged: ChartPair,
    /// Id of the record produced by the most recent successful analysis.
    latest_id: Option<String>,
    /// User-facing message of the most recent failure.
    last_error: Option<String>,
    /// Provider set through `with_provider`; settings changes leave it in place.
    custom_provider: bool,
}

impl std::fmt::Debug for SignalJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalJournal")
            .field("records", &self.journal.len())
            .field("model", &self.settings.model)
            .field("providers", &self.analysis_service.provider_names())
            .field("staged_complete", &self.staged.is_complete())
            .field("latest_id", &self.latest_id)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl SignalJournal {
    /// Create an empty journal with default settings (no provider configured).
    pub fn create_new() -> Self {
        Self::build(Settings::default())
    }

    /// Create an empty journal with providers configured from `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        Self::build(settings)
    }

    /// Create an empty journal configured from the process environment.
    pub fn from_env() -> Self {
        Self::build(Settings::from_env())
    }

    /// Use `provider` for analysis instead of the ones built from settings.
    ///
    /// The provider stays in use after `set_api_key`/`remove_api_key`; those
    /// only update the stored settings.
    pub fn with_provider(mut self, provider: Box<dyn PredictionProvider>) -> Self {
        let mut registry = PredictionProviderRegistry::new();
        registry.register(provider);
        self.analysis_service = AnalysisService::new(registry);
        self.custom_provider = true;
        self
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Send both chart images to the prediction provider and record the result.
    ///
    /// On failure no record is created, the journal is unchanged and the
    /// user-facing message is kept in `last_error()`.
    pub async fn analyze(
        &mut self,
        higher: &EncodedImage,
        lower: &EncodedImage,
    ) -> Result<AnalysisRecord, CoreError> {
        self.latest_id = None;
        self.last_error = None;

        let result = self.analysis_service.request_outcome(higher, lower).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(e)),
        };

        let record = self.record_outcome(&outcome)?;
        self.latest_id = Some(record.id.clone());
        Ok(record)
    }

    /// Analyze the staged image pair. Clears the staged images on success.
    pub async fn analyze_staged(&mut self) -> Result<AnalysisRecord, CoreError> {
        let pair = self.staged.both().map(|(h, l)| (h.clone(), l.clone()));
        let (higher, lower) = match pair {
            Ok(pair) => pair,
            Err(e) => return Err(self.fail(e)),
        };

        let record = self.analyze(&higher, &lower).await?;
        self.staged.clear();
        Ok(record)
    }

    /// Record an outcome obtained elsewhere (e.g. a provider call made by the caller).
    pub fn record_outcome(&mut self, outcome: &PredictionOutcome) -> Result<AnalysisRecord, CoreError> {
        match self.journal_service.create(&mut self.journal, outcome, Utc::now()) {
            Ok(record) => Ok(record),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Record produced by the most recent successful analysis, if it still exists.
    #[must_use]
    pub fn latest_result(&self) -> Option<&AnalysisRecord> {
        self.latest_id.as_deref().and_then(|id| self.journal.get(id))
    }

    /// Message describing the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Staged Images ───────────────────────────────────────────────

    /// Set or clear the higher-timeframe image.
    pub fn stage_higher_timeframe(&mut self, image: Option<EncodedImage>) {
        self.staged.higher = image;
    }

    /// Set or clear the lower-timeframe image.
    pub fn stage_lower_timeframe(&mut self, image: Option<EncodedImage>) {
        self.staged.lower = image;
    }

    #[must_use]
    pub fn staged(&self) -> &ChartPair {
        &self.staged
    }

    /// Both timeframe images are present and a provider is configured.
    #[must_use]
    pub fn can_analyze(&self) -> bool {
        self.staged.is_complete() && self.analysis_service.has_provider()
    }

    /// At least one image is staged.
    #[must_use]
    pub fn can_clear(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Drop staged images, the latest result and the last error.
    /// Recorded history is kept.
    pub fn clear(&mut self) {
        self.staged.clear();
        self.latest_id = None;
        self.last_error = None;
    }

    // ── Record Management ───────────────────────────────────────────

    /// Delete a record. Unknown ids are a no-op; returns whether one was removed.
    pub fn delete_record(&mut self, id: &str) -> bool {
        self.journal_service.delete(&mut self.journal, id)
    }

    /// Mark a record as won, lost or pending. Unknown ids are a no-op.
    pub fn set_status(&mut self, id: &str, status: AnalysisStatus) -> bool {
        self.journal_service.set_status(&mut self.journal, id, status)
    }

    /// All records, newest first.
    #[must_use]
    pub fn records(&self) -> &[AnalysisRecord] {
        self.journal_service.list(&self.journal)
    }

    #[must_use]
    pub fn get_record(&self, id: &str) -> Option<&AnalysisRecord> {
        self.journal.get(id)
    }

    /// Records with a given status, newest first.
    #[must_use]
    pub fn records_by_status(&self, status: AnalysisStatus) -> Vec<&AnalysisRecord> {
        self.journal_service.by_status(&self.journal, status)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.journal.len()
    }

    // ── Metrics & History ───────────────────────────────────────────

    /// Win/loss counts and effectiveness over the whole history.
    #[must_use]
    pub fn stats(&self) -> PerformanceStats {
        self.metrics_service.compute_stats(self.journal.records.iter())
    }

    /// Distinct `YYYY-MM-DD` dates that have at least one record.
    #[must_use]
    pub fn available_dates(&self) -> BTreeSet<String> {
        self.history_service.available_dates(&self.journal.records)
    }

    /// Records whose id starts with `date`; an empty string returns everything.
    #[must_use]
    pub fn filter_by_date(&self, date: &str) -> Vec<&AnalysisRecord> {
        self.history_service.filter_by_date(&self.journal.records, date)
    }

    /// Records created on the given UTC day.
    #[must_use]
    pub fn filter_by_day(&self, day: NaiveDate) -> Vec<&AnalysisRecord> {
        self.history_service.filter_by_day(&self.journal.records, day)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Set an API key for a provider (e.g., "gemini").
    /// Rebuilds the provider registry so the new key takes effect immediately,
    /// unless a provider was injected with `with_provider`.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);
        self.rebuild_providers();
    }

    /// Remove an API key for a provider.
    /// Rebuilds the provider registry so the removal takes effect immediately.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.rebuild_providers();
        }
        removed
    }

    /// Whether a prediction provider is configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.analysis_service.has_provider()
    }

    /// Names of configured providers, primary first.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.analysis_service.provider_names()
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export all records as a JSON array (newest first).
    pub fn export_records_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.journal.records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records to JSON: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn fail(&mut self, e: CoreError) -> CoreError {
        self.last_error = Some(e.user_message());
        e
    }

    fn rebuild_providers(&mut self) {
        if self.custom_provider {
            tracing::debug!("Custom prediction provider in use; settings-based providers not rebuilt");
            return;
        }
        let registry = PredictionProviderRegistry::new_with_defaults(&self.settings);
        self.analysis_service = AnalysisService::new(registry);
    }

    fn build(settings: Settings) -> Self {
        let registry = PredictionProviderRegistry::new_with_defaults(&settings);

        Self {
            journal: Journal::new(),
            settings,
            journal_service: JournalService::new(),
            history_service: HistoryService::new(),
            metrics_service: MetricsService::new(),
            analysis_service: AnalysisService::new(registry),
            staged: ChartPair::default(),
            latest_id: None,
            last_error: None,
            custom_provider: false,
        }
    }
}
