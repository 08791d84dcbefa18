use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::journal::Journal;
use crate::models::prediction::PredictionOutcome;
use crate::models::record::{AnalysisRecord, AnalysisStatus};

/// Owns the record lifecycle: creation, status changes and deletion.
///
/// Pure business logic, no I/O. Easy to test.
pub struct JournalService;

impl JournalService {
    pub fn new() -> Self {
        Self
    }

    /// Turn a provider outcome into a `Pending` record and prepend it.
    ///
    /// Validation happens before anything is touched: an unknown prediction
    /// value returns `InvalidPredictionKind` and leaves the journal as it was.
    pub fn create(
        &self,
        journal: &mut Journal,
        outcome: &PredictionOutcome,
        now: DateTime<Utc>,
    ) -> Result<AnalysisRecord, CoreError> {
        let mut record = AnalysisRecord::from_outcome(outcome, now)?;
        // Ids must stay unique for the whole session.
        while journal.get(&record.id).is_some() {
            record.id = AnalysisRecord::make_id(now);
        }
        tracing::info!(
            id = %record.id,
            prediction = %record.prediction(),
            asset = record.asset_name.as_deref().unwrap_or("unknown"),
            "Analysis record created"
        );
        journal.records.insert(0, record.clone());
        Ok(record)
    }

    /// Remove a record by id. Unknown ids are ignored.
    /// Returns `true` if a record was removed.
    pub fn delete(&self, journal: &mut Journal, id: &str) -> bool {
        let before = journal.records.len();
        journal.records.retain(|r| r.id != id);
        let removed = journal.records.len() != before;
        if removed {
            tracing::info!(%id, "Analysis record deleted");
        } else {
            tracing::debug!(%id, "Delete ignored: no such record");
        }
        removed
    }

    /// Set a record's status in place. Unknown ids are ignored.
    /// Returns `true` if a record was found.
    pub fn set_status(&self, journal: &mut Journal, id: &str, status: AnalysisStatus) -> bool {
        match journal.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                tracing::info!(%id, from = %record.status, to = %status, "Record status changed");
                record.status = status;
                true
            }
            None => {
                tracing::debug!(%id, "Status change ignored: no such record");
                false
            }
        }
    }

    /// All records, newest first.
    pub fn list<'a>(&self, journal: &'a Journal) -> &'a [AnalysisRecord] {
        &journal.records
    }

    /// Records with the given status, newest first.
    pub fn by_status<'a>(
        &self,
        journal: &'a Journal,
        status: AnalysisStatus,
    ) -> Vec<&'a AnalysisRecord> {
        journal.records.iter().filter(|r| r.status == status).collect()
    }
}

impl Default for JournalService {
    fn default() -> Self {
        Self::new()
    }
}
