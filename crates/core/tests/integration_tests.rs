use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use chart_signal_core::errors::CoreError;
use chart_signal_core::models::image::EncodedImage;
use chart_signal_core::models::prediction::{PredictionKind, PredictionOutcome};
use chart_signal_core::models::record::AnalysisStatus;
use chart_signal_core::models::settings::{Settings, GEMINI_KEY};
use chart_signal_core::providers::traits::PredictionProvider;
use chart_signal_core::SignalJournal;

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

// ═══════════════════════════════════════════════════════════════════
// Scripted Provider (for testing without real API calls)
// ═══════════════════════════════════════════════════════════════════

/// Returns queued results in order and remembers which images it saw.
#[derive(Clone, Default)]
struct ScriptedProvider {
    queue: Arc<Mutex<Vec<Result<PredictionOutcome, CoreError>>>>,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedProvider {
    fn push(&self, result: Result<PredictionOutcome, CoreError>) {
        self.queue.lock().unwrap().insert(0, result);
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn analyze(
        &self,
        higher: &EncodedImage,
        lower: &EncodedImage,
    ) -> Result<PredictionOutcome, CoreError> {
        self.seen
            .lock()
            .unwrap()
            .push((higher.name.clone(), lower.name.clone()));
        self.queue
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(CoreError::EmptyResponse))
    }
}

fn image(name: &str) -> EncodedImage {
    EncodedImage::from_bytes(name, PNG_BYTES).unwrap()
}

fn buy() -> PredictionOutcome {
    PredictionOutcome::new(PredictionKind::Buy, "Bullish flag")
        .with_asset("EUR/USD")
        .with_levels("1.0850", "1.0950", "1.0800")
}

fn sell() -> PredictionOutcome {
    PredictionOutcome::new(PredictionKind::Sell, "Double top")
        .with_asset("GBP/USD")
        .with_levels("1.2700", "1.2550", "1.2760")
}

/// Route library logs to the test harness; set RUST_LOG to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn journal_with(provider: &ScriptedProvider) -> SignalJournal {
    init_tracing();
    SignalJournal::create_new().with_provider(Box::new(provider.clone()))
}

// ═══════════════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_update_delete_and_measure() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    provider.push(Ok(sell()));
    let mut journal = journal_with(&provider);

    let a = journal.analyze(&image("h4.png"), &image("m15.png")).await.unwrap();
    let b = journal.analyze(&image("h4.png"), &image("m15.png")).await.unwrap();

    let ids: Vec<&str> = journal.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);

    assert!(journal.set_status(&a.id, AnalysisStatus::Won));
    assert!(journal.delete_record(&b.id));

    assert_eq!(journal.record_count(), 1);
    let only = &journal.records()[0];
    assert_eq!(only.id, a.id);
    assert_eq!(only.status, AnalysisStatus::Won);

    let stats = journal.stats();
    assert_eq!(stats.won, 1);
    assert_eq!(stats.lost, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.evaluated, 1);
    assert_eq!(stats.effectiveness, "100.0%");
}

#[tokio::test]
async fn analysis_sends_higher_then_lower() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    let mut journal = journal_with(&provider);

    journal.analyze(&image("daily.png"), &image("hourly.png")).await.unwrap();
    assert_eq!(
        provider.calls(),
        vec![("daily.png".to_string(), "hourly.png".to_string())]
    );
}

#[tokio::test]
async fn successful_analysis_becomes_latest_result() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    let mut journal = journal_with(&provider);

    let record = journal.analyze(&image("a.png"), &image("b.png")).await.unwrap();
    assert_eq!(journal.latest_result().map(|r| r.id.as_str()), Some(record.id.as_str()));
    assert!(journal.last_error().is_none());

    journal.delete_record(&record.id);
    assert!(journal.latest_result().is_none());
}

#[tokio::test]
async fn provider_failure_creates_nothing() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    provider.push(Err(CoreError::Network("connection reset".into())));
    let mut journal = journal_with(&provider);

    journal.analyze(&image("a.png"), &image("b.png")).await.unwrap();
    let before = journal.records().to_vec();

    let err = journal.analyze(&image("a.png"), &image("b.png")).await.unwrap_err();
    assert!(err.is_provider_failure());
    assert_eq!(journal.records(), before.as_slice());
    assert!(journal.latest_result().is_none());
    assert!(journal
        .last_error()
        .unwrap()
        .starts_with("Failed to analyze the images"));
}

#[tokio::test]
async fn invalid_prediction_from_provider_creates_nothing() {
    let provider = ScriptedProvider::default();
    let mut bad = buy();
    bad.prediction = "STRONG BUY".into();
    provider.push(Ok(bad));
    let mut journal = journal_with(&provider);

    let err = journal.analyze(&image("a.png"), &image("b.png")).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidPredictionKind(_)));
    assert_eq!(journal.record_count(), 0);
    let message = journal.last_error().unwrap();
    assert!(message.starts_with("Failed to analyze the images"));
    assert!(!message.contains("STRONG BUY"));
}

#[tokio::test]
async fn analyze_without_provider() {
    let mut journal = SignalJournal::create_new();
    assert!(!journal.has_provider());
    let err = journal.analyze(&image("a.png"), &image("b.png")).await.unwrap_err();
    assert!(matches!(err, CoreError::NoProvider));
    assert_eq!(journal.record_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════
// Staged images
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn staged_analysis_requires_both_images() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    let mut journal = journal_with(&provider);

    assert!(!journal.can_analyze());
    assert!(!journal.can_clear());

    journal.stage_higher_timeframe(Some(image("h4.png")));
    assert!(!journal.can_analyze());
    assert!(journal.can_clear());

    let err = journal.analyze_staged().await.unwrap_err();
    assert!(matches!(err, CoreError::MissingImages));
    assert_eq!(journal.last_error(), Some("Please upload images for both timeframes."));
    assert!(provider.calls().is_empty());

    journal.stage_lower_timeframe(Some(image("m15.png")));
    assert!(journal.can_analyze());

    let record = journal.analyze_staged().await.unwrap();
    assert_eq!(record.prediction(), PredictionKind::Buy);
    assert!(journal.staged().is_empty());
    assert!(journal.last_error().is_none());
}

#[tokio::test]
async fn failed_staged_analysis_keeps_images() {
    let provider = ScriptedProvider::default();
    provider.push(Err(CoreError::EmptyResponse));
    let mut journal = journal_with(&provider);

    journal.stage_higher_timeframe(Some(image("h4.png")));
    journal.stage_lower_timeframe(Some(image("m15.png")));
    assert!(journal.analyze_staged().await.is_err());
    assert!(journal.staged().is_complete());
}

#[tokio::test]
async fn clear_resets_session_state_but_keeps_history() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    let mut journal = journal_with(&provider);

    journal.analyze(&image("a.png"), &image("b.png")).await.unwrap();
    journal.stage_higher_timeframe(Some(image("c.png")));
    journal.clear();

    assert!(journal.staged().is_empty());
    assert!(journal.latest_result().is_none());
    assert!(journal.last_error().is_none());
    assert_eq!(journal.record_count(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Records, history and metrics through the facade
// ═══════════════════════════════════════════════════════════════════

#[test]
fn record_outcome_and_filter_by_today() {
    let mut journal = SignalJournal::create_new();
    let r = journal.record_outcome(&buy()).unwrap();
    journal
        .record_outcome(&PredictionOutcome::new(PredictionKind::Wait, "Choppy"))
        .unwrap();

    let today = r.id_date().to_string();
    assert_eq!(journal.available_dates().into_iter().collect::<Vec<_>>(), vec![today.clone()]);
    assert_eq!(journal.filter_by_date(&today).len(), 2);
    assert_eq!(journal.filter_by_date("").len(), 2);
    assert!(journal.filter_by_date("1999-01-01").is_empty());
    assert_eq!(journal.filter_by_day(r.created_at.date_naive()).len(), 2);
}

#[test]
fn record_outcome_rejects_invalid_kind() {
    let mut journal = SignalJournal::create_new();
    let mut bad = sell();
    bad.prediction = "sell".into();
    assert!(journal.record_outcome(&bad).is_err());
    assert_eq!(journal.record_count(), 0);
    assert!(journal.last_error().is_some());
}

#[test]
fn status_commands_on_unknown_ids_are_noops() {
    let mut journal = SignalJournal::create_new();
    journal.record_outcome(&buy()).unwrap();
    let before = journal.records().to_vec();

    assert!(!journal.set_status("ghost", AnalysisStatus::Won));
    assert!(!journal.delete_record("ghost"));
    assert_eq!(journal.records(), before.as_slice());
}

#[test]
fn stats_count_open_trades_only() {
    let mut journal = SignalJournal::create_new();
    let a = journal.record_outcome(&buy()).unwrap();
    journal.record_outcome(&sell()).unwrap();
    journal
        .record_outcome(&PredictionOutcome::new(PredictionKind::Wait, "Flat"))
        .unwrap();
    journal.set_status(&a.id, AnalysisStatus::Lost);

    let stats = journal.stats();
    assert_eq!(stats.lost, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.effectiveness, "0.0%");
    assert_eq!(journal.records_by_status(AnalysisStatus::Pending).len(), 2);
}

#[test]
fn export_records_to_json() {
    let mut journal = SignalJournal::create_new();
    journal.record_outcome(&buy()).unwrap();
    let json = journal.export_records_to_json().unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v[0]["prediction"], "BUY");
    assert_eq!(v[0]["status"], "pending");
    assert_eq!(v[0]["takeProfit"], "1.0950");
}

// ═══════════════════════════════════════════════════════════════════
// Settings & provider configuration
// ═══════════════════════════════════════════════════════════════════

#[test]
fn api_key_changes_rebuild_providers() {
    let mut journal = SignalJournal::create_new();
    assert!(!journal.has_provider());

    journal.set_api_key(GEMINI_KEY.into(), "key".into());
    assert_eq!(journal.provider_names(), vec!["Gemini".to_string()]);
    assert_eq!(journal.get_settings().gemini_api_key(), Some("key"));

    assert!(journal.remove_api_key(GEMINI_KEY));
    assert!(!journal.has_provider());
    assert!(!journal.remove_api_key(GEMINI_KEY));
}

#[tokio::test]
async fn injected_provider_survives_api_key_changes() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(buy()));
    let mut journal = journal_with(&provider);

    journal.set_api_key(GEMINI_KEY.into(), "key".into());
    assert_eq!(journal.provider_names(), vec!["Scripted".to_string()]);
    assert_eq!(journal.get_settings().gemini_api_key(), Some("key"));

    assert!(journal.remove_api_key(GEMINI_KEY));
    assert!(journal.has_provider());

    journal.analyze(&image("a.png"), &image("b.png")).await.unwrap();
    assert_eq!(provider.calls().len(), 1);
}

#[test]
fn from_settings_with_key_has_provider() {
    let mut settings = Settings::default();
    settings.api_keys.insert(GEMINI_KEY.into(), "key".into());
    let journal = SignalJournal::from_settings(settings);
    assert!(journal.has_provider());
    assert!(format!("{journal:?}").contains("Gemini"));
}
