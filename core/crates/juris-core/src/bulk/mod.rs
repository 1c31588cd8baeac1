//! Bulk caselaw processor
//!
//! Turns directories of caselaw documents into a populated RAG store in
//! six deterministic phases: discovery, filtering, preprocessing,
//! extraction, unification, and optional validation, followed by export.
//! Extraction fans out over a bounded worker pool; theorem insertion runs
//! on the caller's thread through the store's single write path.

pub mod config;
pub mod discovery;
pub mod document;
pub mod export;
pub mod pipeline;
pub mod stats;

pub use config::BulkProcessingConfig;
pub use document::CaselawDocument;
pub use export::ValidationReport;
pub use stats::ProcessingStats;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use log::{error, info};

use crate::checker::DocumentConsistencyChecker;
use crate::deontic::formula::short_hash;
use crate::error::JurisResult;
use crate::providers::{DocumentParser, LlmAnalyzer, PlainTextParser};
use crate::store::TemporalDeonticRagStore;
use crate::temporal::TemporalScope;

/// Progress callback: (documents completed, documents queued)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Bulk processor for building a unified theorem corpus from caselaw
pub struct CaselawBulkProcessor {
    config: BulkProcessingConfig,
    store: Arc<RwLock<TemporalDeonticRagStore>>,
    analyzer: Option<Arc<dyn LlmAnalyzer>>,
    parser: Arc<dyn DocumentParser>,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressCallback>,
}

impl CaselawBulkProcessor {
    pub fn new(config: BulkProcessingConfig) -> Self {
        Self::with_store(config, Arc::new(RwLock::new(TemporalDeonticRagStore::new())))
    }

    /// Build a processor over an existing store
    pub fn with_store(
        config: BulkProcessingConfig,
        store: Arc<RwLock<TemporalDeonticRagStore>>,
    ) -> Self {
        Self {
            config,
            store,
            analyzer: None,
            parser: Arc::new(PlainTextParser),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn LlmAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Shared handle to the store being populated
    pub fn store(&self) -> Arc<RwLock<TemporalDeonticRagStore>> {
        Arc::clone(&self.store)
    }

    /// Signal handle for cooperative cancellation
    ///
    /// Setting it lets workers finish their current document and stop;
    /// theorems already inserted remain in the store.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the full pipeline and return run statistics
    pub fn process(&mut self) -> JurisResult<ProcessingStats> {
        let started = Instant::now();
        let mut stats = ProcessingStats::default();

        info!("phase 1: discovering caselaw documents");
        let discovery = discovery::discover(&self.config, self.parser.as_ref());
        stats.total_documents = discovery.total_discovered;
        stats.processing_errors += discovery.load_errors;

        info!("phase 2: filtering {} documents", discovery.documents.len());
        let mut documents: Vec<CaselawDocument> = discovery
            .documents
            .into_iter()
            .filter(|doc| discovery::passes_filters(doc, &self.config))
            .collect();

        info!("phase 3: preprocessing");
        documents.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        if self.config.enable_duplicate_detection {
            let before = documents.len();
            let mut seen = BTreeSet::new();
            documents.retain(|doc| seen.insert(short_hash(&doc.text, 32)));
            let removed = before - documents.len();
            if removed > 0 {
                info!("removed {removed} duplicate documents");
            }
        }
        info!("queued {} documents for extraction", documents.len());

        info!(
            "phase 4: extracting theorems with {} workers",
            self.config.worker_count()
        );
        let queued = documents.clone();
        self.run_extraction_phase(documents, &mut stats);

        info!("phase 5: validating unified system");
        let validation = if self.config.enable_validation {
            Some(self.validate_sample(&queued))
        } else {
            None
        };

        {
            let store = self.read_store();
            stats.embedding_degraded = store.embedding_degraded();
        }
        stats.finalize(started.elapsed().as_secs_f64());

        info!("phase 6: exporting unified system");
        if let Some(output_directory) = self.config.output_directory.clone() {
            let store = self.read_store();
            export::export_all(&output_directory, &stats, &store, validation.as_ref())?;
        }

        info!(
            "bulk processing completed: {} theorems from {} documents",
            stats.extracted_theorems, stats.processed_documents
        );
        Ok(stats)
    }

    /// Extraction and unification: workers extract, this thread inserts
    fn run_extraction_phase(&mut self, documents: Vec<CaselawDocument>, stats: &mut ProcessingStats) {
        let total_queued = documents.len();
        let min_confidence = self.config.min_formula_confidence;
        let store = Arc::clone(&self.store);
        let progress = self.progress.as_deref();
        let mut completed = 0usize;

        pipeline::run_extraction(
            documents,
            self.config.worker_count(),
            self.config.chunk_size,
            self.config.timeout_per_document,
            self.analyzer.clone(),
            Arc::clone(&self.cancel),
            |outcome| {
                completed += 1;
                if let Some(report_progress) = progress {
                    report_progress(completed, total_queued);
                }

                let document = outcome.document;
                match outcome.result {
                    Ok(formulas) => {
                        stats.processed_documents += 1;
                        stats.jurisdictions_processed.insert(document.jurisdiction.clone());
                        stats
                            .legal_domains_processed
                            .extend(document.legal_domains.iter().cloned());
                        stats.observe_date(document.date);

                        let mut guard = match store.write() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        let before = guard.len();
                        for formula in formulas {
                            if formula.confidence < min_confidence {
                                continue;
                            }
                            let scope = TemporalScope::open(document.date);
                            if let Err(err) = guard.add_theorem(
                                formula,
                                scope,
                                &document.jurisdiction,
                                document.primary_domain(),
                                &document.source_case_label(),
                                document.precedent_strength,
                            ) {
                                error!(
                                    "failed to insert theorem from {}: {err}",
                                    document.document_id
                                );
                                stats.processing_errors += 1;
                            }
                        }
                        stats.extracted_theorems += guard.len() - before;
                    }
                    Err(err) => {
                        let path = document
                            .file_path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| document.document_id.clone());
                        error!("document {path} failed: {err}");
                        stats.processing_errors += 1;
                    }
                }
            },
        );
    }

    /// Re-check a sample of ingested documents against the unified corpus
    fn validate_sample(&self, documents: &[CaselawDocument]) -> ValidationReport {
        let sample_size = documents.len().min(self.config.validation_sample);
        let mut checker = DocumentConsistencyChecker::new(Arc::clone(&self.store));
        if let Some(analyzer) = &self.analyzer {
            checker = checker.with_analyzer(Arc::clone(analyzer));
        }

        let mut conflicts: Vec<String> = Vec::new();
        for document in documents.iter().take(sample_size) {
            let excerpt: String = document.text.chars().take(5000).collect();
            let analysis = checker.check_document(
                &excerpt,
                &document.document_id,
                document.date,
                &document.jurisdiction,
                document.primary_domain(),
            );
            if !analysis.consistency_result.is_consistent {
                conflicts.extend(
                    analysis
                        .consistency_result
                        .conflicts
                        .iter()
                        .map(|c| c.description.clone()),
                );
                conflicts.extend(
                    analysis
                        .consistency_result
                        .temporal_conflicts
                        .iter()
                        .map(|c| c.description.clone()),
                );
            }
        }

        info!(
            "validation completed: {} conflicts found in a sample of {sample_size}",
            conflicts.len()
        );
        ValidationReport {
            total_conflicts: conflicts.len(),
            sample_size,
            conflicts: conflicts.into_iter().take(10).collect(),
            validation_date: Utc::now(),
        }
    }

    fn read_store(&self) -> std::sync::RwLockReadGuard<'_, TemporalDeonticRagStore> {
        match self.store.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
