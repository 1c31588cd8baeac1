//! Bulk processing configuration

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Configuration for bulk caselaw processing
#[derive(Debug, Clone)]
pub struct BulkProcessingConfig {
    // Input configuration
    pub caselaw_directories: Vec<PathBuf>,
    /// Extension whitelist applied during discovery
    pub supported_extensions: Vec<String>,

    // Processing configuration
    /// Worker pool size for the extraction phase
    pub max_concurrent_documents: usize,
    /// Bound of the document queue; discovery stalls when it is full
    pub chunk_size: usize,
    pub timeout_per_document: Duration,

    // Filtering configuration
    pub min_document_length: usize,
    pub min_precedent_strength: f64,
    pub date_range: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    pub jurisdictions_filter: Option<Vec<String>>,
    pub legal_domains_filter: Option<Vec<String>>,

    // Quality control
    pub enable_duplicate_detection: bool,
    pub enable_validation: bool,
    /// Documents re-checked during the validation phase
    pub validation_sample: usize,
    /// Extracted formulas below this confidence are dropped
    pub min_formula_confidence: f64,

    // Output configuration
    /// Export directory; `None` skips the export phase
    pub output_directory: Option<PathBuf>,
}

impl Default for BulkProcessingConfig {
    fn default() -> Self {
        Self {
            caselaw_directories: Vec::new(),
            supported_extensions: vec![
                "txt".to_string(),
                "json".to_string(),
                "xml".to_string(),
                "pdf".to_string(),
            ],
            max_concurrent_documents: 5,
            chunk_size: 100,
            timeout_per_document: Duration::from_secs(300),
            min_document_length: 100,
            min_precedent_strength: 0.5,
            date_range: (None, None),
            jurisdictions_filter: None,
            legal_domains_filter: None,
            enable_duplicate_detection: true,
            enable_validation: true,
            validation_sample: 100,
            min_formula_confidence: 0.7,
            output_directory: Some(PathBuf::from("unified_deontic_logic_system")),
        }
    }
}

impl BulkProcessingConfig {
    pub fn for_directories(directories: Vec<PathBuf>) -> Self {
        Self {
            caselaw_directories: directories,
            ..Self::default()
        }
    }

    /// Effective worker count: configured limit, capped by available cores
    pub fn worker_count(&self) -> usize {
        self.max_concurrent_documents
            .min(num_cpus::get().saturating_mul(2))
            .max(1)
    }
}
