use serde::{Deserialize, Serialize};

use super::record::AnalysisRecord;

/// The session's collection of analysis records, newest first.
///
/// Lives only in memory; nothing here is written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    pub records: Vec<AnalysisRecord>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
