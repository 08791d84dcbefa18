use crate::models::prediction::PredictionKind;
use crate::models::record::{AnalysisRecord, AnalysisStatus};
use crate::models::stats::{PerformanceStats, NOT_APPLICABLE};

/// Derives win/loss statistics from a snapshot of records.
///
/// Counting ignores order. Wait signals never count as open trades, but a
/// Wait record explicitly marked won or lost is still counted as such.
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    pub fn compute_stats<'a, I>(&self, records: I) -> PerformanceStats
    where
        I: IntoIterator<Item = &'a AnalysisRecord>,
    {
        let mut won = 0;
        let mut lost = 0;
        let mut pending = 0;

        for record in records {
            match record.status {
                AnalysisStatus::Won => won += 1,
                AnalysisStatus::Lost => lost += 1,
                AnalysisStatus::Pending if record.prediction() != PredictionKind::Wait => {
                    pending += 1
                }
                AnalysisStatus::Pending => {}
            }
        }

        let evaluated = won + lost;
        let win_rate = (evaluated > 0).then(|| won as f64 / evaluated as f64 * 100.0);
        let effectiveness = match win_rate {
            // Ties round away from zero: 6.25 shows as "6.3%".
            Some(rate) => format!("{:.1}%", (rate * 10.0).round() / 10.0),
            None => NOT_APPLICABLE.to_string(),
        };

        PerformanceStats {
            won,
            lost,
            pending,
            evaluated,
            effectiveness,
            win_rate,
        }
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}
