//! Bulk processing statistics

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics accumulated over a bulk processing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Documents discovered with a supported extension
    pub total_documents: usize,
    /// Documents that survived filtering and produced an extraction result
    pub processed_documents: usize,
    pub extracted_theorems: usize,
    pub processing_errors: usize,
    pub success_rate: f64,
    pub processing_time_seconds: f64,
    pub jurisdictions_processed: BTreeSet<String>,
    pub legal_domains_processed: BTreeSet<String>,
    /// Earliest and latest document dates seen
    pub temporal_range: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    /// Whether the embedding provider degraded during the run
    pub embedding_degraded: bool,
}

impl ProcessingStats {
    /// Fold one document date into the temporal range
    pub fn observe_date(&mut self, date: DateTime<Utc>) {
        self.temporal_range.0 = Some(match self.temporal_range.0 {
            Some(earliest) if earliest <= date => earliest,
            _ => date,
        });
        self.temporal_range.1 = Some(match self.temporal_range.1 {
            Some(latest) if latest >= date => latest,
            _ => date,
        });
    }

    /// Finalize derived fields at the end of a run
    pub fn finalize(&mut self, elapsed_seconds: f64) {
        self.processing_time_seconds = elapsed_seconds;
        self.success_rate = if self.total_documents == 0 {
            0.0
        } else {
            self.processed_documents as f64 / self.total_documents as f64
        };
    }
}
