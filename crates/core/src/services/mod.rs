pub mod analysis_service;
pub mod history_service;
pub mod journal_service;
pub mod metrics_service;
