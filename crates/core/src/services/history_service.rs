use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::record::AnalysisRecord;

/// Date-scoped views over the record history. Read-only.
pub struct HistoryService;

impl HistoryService {
    pub fn new() -> Self {
        Self
    }

    /// Distinct calendar dates (`YYYY-MM-DD`) taken from record ids.
    pub fn available_dates(&self, records: &[AnalysisRecord]) -> BTreeSet<String> {
        records.iter().map(|r| r.id_date().to_string()).collect()
    }

    /// Records whose id starts with `date`, in their original order.
    /// An empty `date` means no filter.
    ///
    /// This is a literal prefix test on the id, not a date comparison.
    pub fn filter_by_date<'a>(
        &self,
        records: &'a [AnalysisRecord],
        date: &str,
    ) -> Vec<&'a AnalysisRecord> {
        if date.is_empty() {
            return records.iter().collect();
        }
        records.iter().filter(|r| r.id.starts_with(date)).collect()
    }

    /// Records created on `day` (UTC), using the typed creation timestamp.
    pub fn filter_by_day<'a>(
        &self,
        records: &'a [AnalysisRecord],
        day: NaiveDate,
    ) -> Vec<&'a AnalysisRecord> {
        records
            .iter()
            .filter(|r| r.created_at.date_naive() == day)
            .collect()
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}
