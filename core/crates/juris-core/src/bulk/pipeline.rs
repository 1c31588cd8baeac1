//! Extraction worker pool
//!
//! Bounded producer/consumer pipeline: a producer feeds documents into a
//! sync channel sized by `chunk_size` (a full queue stalls discovery), a
//! pool of workers runs formula extraction without touching the store,
//! and outcomes flow back to the caller's thread, which owns the single
//! write path into the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::checker::PatternExtractor;
use crate::deontic::DeonticFormula;
use crate::error::{JurisError, JurisResult};
use crate::providers::{with_timeout, LlmAnalyzer};

use super::document::CaselawDocument;

/// Result of extracting one document
pub struct ExtractionOutcome {
    pub document: CaselawDocument,
    pub result: JurisResult<Vec<DeonticFormula>>,
    pub elapsed: Duration,
}

/// Run the extraction phase over a document list
///
/// `on_outcome` runs on the calling thread for every document, in worker
/// completion order. Setting `cancel` lets each worker finish its current
/// document and stop; queued documents are dropped.
pub fn run_extraction<F>(
    documents: Vec<CaselawDocument>,
    worker_count: usize,
    queue_capacity: usize,
    timeout_per_document: Duration,
    analyzer: Option<Arc<dyn LlmAnalyzer>>,
    cancel: Arc<AtomicBool>,
    mut on_outcome: F,
) where
    F: FnMut(ExtractionOutcome),
{
    let worker_count = worker_count.max(1);
    let (doc_tx, doc_rx) = mpsc::sync_channel::<CaselawDocument>(queue_capacity.max(1));
    let doc_rx = Arc::new(Mutex::new(doc_rx));
    let (outcome_tx, outcome_rx) = mpsc::channel::<ExtractionOutcome>();

    let producer_cancel = Arc::clone(&cancel);
    let producer = thread::spawn(move || {
        for document in documents {
            if producer_cancel.load(Ordering::Relaxed) {
                debug!("cancellation observed; discovery feed stopping");
                break;
            }
            // Blocks while the queue is full; errors out once all workers
            // have exited.
            if doc_tx.send(document).is_err() {
                break;
            }
        }
    });

    let mut workers = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let doc_rx = Arc::clone(&doc_rx);
        let outcome_tx = outcome_tx.clone();
        let analyzer = analyzer.clone();
        let cancel = Arc::clone(&cancel);
        workers.push(thread::spawn(move || {
            let extractor = PatternExtractor::new();
            loop {
                if cancel.load(Ordering::Relaxed) {
                    debug!("worker {worker_id} stopping on cancellation");
                    break;
                }
                let next = {
                    let guard = match doc_rx.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    guard.recv()
                };
                let Ok(document) = next else {
                    break;
                };

                let started = Instant::now();
                let result = extract_document(
                    &document,
                    analyzer.as_ref(),
                    &extractor,
                    timeout_per_document,
                );
                let elapsed = started.elapsed();
                let result = if elapsed > timeout_per_document {
                    warn!(
                        "document {} exceeded the {}s budget",
                        document.document_id,
                        timeout_per_document.as_secs()
                    );
                    Err(JurisError::Timeout {
                        seconds: timeout_per_document.as_secs(),
                    })
                } else {
                    result
                };

                if outcome_tx
                    .send(ExtractionOutcome {
                        document,
                        result,
                        elapsed,
                    })
                    .is_err()
                {
                    break;
                }
            }
        }));
    }
    // The caller's receive loop must end once the workers do.
    drop(outcome_tx);
    drop(doc_rx);

    for outcome in outcome_rx {
        on_outcome(outcome);
    }

    if producer.join().is_err() {
        warn!("discovery feed thread panicked");
    }
    for worker in workers {
        if worker.join().is_err() {
            warn!("extraction worker panicked");
        }
    }
}

/// Extract formulas from one document
///
/// Uses the analyzer when configured, bounded by the per-document timeout;
/// analyzer failure falls back to the deterministic pattern extractor.
fn extract_document(
    document: &CaselawDocument,
    analyzer: Option<&Arc<dyn LlmAnalyzer>>,
    extractor: &PatternExtractor,
    timeout: Duration,
) -> JurisResult<Vec<DeonticFormula>> {
    if let Some(analyzer) = analyzer {
        let analyzer = Arc::clone(analyzer);
        let text = document.text.clone();
        match with_timeout(timeout, move || analyzer.extract_formulas(&text)) {
            Ok(formulas) => return Ok(formulas),
            Err(err) => {
                warn!(
                    "analyzer failed on {} ({err}); using pattern extraction",
                    document.document_id
                );
            }
        }
    }
    Ok(extractor.extract(&document.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn document(id: &str, text: &str) -> CaselawDocument {
        CaselawDocument {
            document_id: id.to_string(),
            title: format!("{id}.txt"),
            text: text.to_string(),
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            jurisdiction: "Federal".to_string(),
            court: "Unknown Court".to_string(),
            citation: String::new(),
            legal_domains: vec!["general".to_string()],
            precedent_strength: 1.0,
            file_path: None,
        }
    }

    #[test]
    fn test_all_documents_processed() {
        let documents: Vec<CaselawDocument> = (0..20)
            .map(|i| {
                document(
                    &format!("doc_{i}"),
                    "The contractor must provide written notice before termination.",
                )
            })
            .collect();

        let mut outcomes = 0usize;
        let mut formulas = 0usize;
        run_extraction(
            documents,
            4,
            5,
            Duration::from_secs(30),
            None,
            Arc::new(AtomicBool::new(false)),
            |outcome| {
                outcomes += 1;
                formulas += outcome.result.map(|f| f.len()).unwrap_or(0);
            },
        );
        assert_eq!(outcomes, 20);
        assert_eq!(formulas, 20);
    }

    #[test]
    fn test_queue_smaller_than_input_still_drains() {
        let documents: Vec<CaselawDocument> = (0..50)
            .map(|i| document(&format!("doc_{i}"), "The employee may inspect the records."))
            .collect();

        let mut outcomes = 0usize;
        run_extraction(
            documents,
            2,
            3,
            Duration::from_secs(30),
            None,
            Arc::new(AtomicBool::new(false)),
            |_| outcomes += 1,
        );
        assert_eq!(outcomes, 50);
    }

    #[test]
    fn test_cancellation_stops_cleanly() {
        let documents: Vec<CaselawDocument> = (0..1000)
            .map(|i| {
                document(
                    &format!("doc_{i}"),
                    "The contractor must provide written notice before termination.",
                )
            })
            .collect();

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_after = Arc::clone(&cancel);
        let mut outcomes = 0usize;
        run_extraction(
            documents,
            2,
            4,
            Duration::from_secs(30),
            None,
            cancel,
            |_| {
                outcomes += 1;
                if outcomes == 5 {
                    cancel_after.store(true, Ordering::Relaxed);
                }
            },
        );
        // Workers finish in-flight documents and stop; the rest of the
        // queue is abandoned.
        assert!(outcomes >= 5);
        assert!(outcomes < 1000);
    }
}
