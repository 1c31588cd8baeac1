//! Pluggable external collaborators
//!
//! The engine consumes embeddings, LLM analysis, proof execution, and
//! binary-format parsing through capability traits rather than runtime
//! feature probing. Every implementation is optional: each trait has a
//! deterministic fallback path in the core, and every call site goes
//! through an explicit timeout so external slowness can never deadlock
//! the engine.

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::deontic::DeonticFormula;
use crate::error::{JurisError, JurisResult};

/// Maps text to dense vectors of a fixed dimension
///
/// Implementations may fail; failure is recoverable and degrades the
/// store to lexical scoring for the affected texts.
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Embed a batch of texts; all returned vectors share `dimension()`
    fn embed(&self, texts: &[String]) -> JurisResult<Vec<Vec<f32>>>;
}

/// Summary produced by a document analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerReport {
    pub formulas: Vec<DeonticFormula>,
    pub summary: String,
    pub confidence: f64,
}

/// Optional deeper component extraction backed by a language model
///
/// When absent or failing, the deterministic pattern extractor is used
/// instead. When both run, the analyzer's classification wins.
pub trait LlmAnalyzer: Send + Sync {
    fn analyze_document(&self, text: &str) -> JurisResult<AnalyzerReport>;

    fn extract_formulas(&self, text: &str) -> JurisResult<Vec<DeonticFormula>> {
        Ok(self.analyze_document(text)?.formulas)
    }
}

/// Outcome status of a proof execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofStatus {
    Success,
    Failure,
    Timeout,
    Error,
    Unsupported,
}

/// Result of handing a formula to an external prover
#[derive(Debug, Clone)]
pub struct ProofOutcome {
    pub status: ProofStatus,
    pub output: String,
    pub execution_time: Duration,
    pub errors: Vec<String>,
}

impl ProofOutcome {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            status: ProofStatus::Unsupported,
            output: reason.into(),
            execution_time: Duration::ZERO,
            errors: Vec::new(),
        }
    }
}

/// Stateless bridge to an external prover; capped by the given timeout
pub trait ProofExecutor: Send + Sync {
    fn prove(&self, formula: &DeonticFormula, timeout: Duration) -> ProofOutcome;
}

/// Extracts a text body from a file the core cannot read directly
pub trait DocumentParser: Send + Sync {
    fn extract_text(&self, path: &Path) -> JurisResult<String>;
}

/// Default parser: reads txt/json/xml as UTF-8 text, rejects binary formats
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn extract_text(&self, path: &Path) -> JurisResult<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extension == "pdf" {
            return Err(JurisError::extraction_error(format!(
                "no parser configured for pdf: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Deterministic token-hashing embedder
///
/// Buckets token hashes into a fixed-dimension vector and L2-normalizes.
/// Not a neural model, but a real embedding provider: deterministic,
/// dimension-stable, and good enough for cosine ranking over a bounded
/// corpus when no external model is configured.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> JurisResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let mut vector = vec![0.0f32; self.dimension];
            for token in text
                .to_lowercase()
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|t| t.len() >= 2)
            {
                let digest = Sha256::digest(token.as_bytes());
                let bucket = u64::from_be_bytes(digest[..8].try_into().expect("8 bytes"))
                    as usize
                    % self.dimension;
                vector[bucket] += 1.0;
            }
            let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut vector {
                    *v /= norm;
                }
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

/// Run a fallible external call under an explicit deadline
///
/// On timeout the call fails locally with [`JurisError::Timeout`]; the
/// worker thread is left to finish in the background since the result
/// channel is already closed.
pub fn with_timeout<T, F>(timeout: Duration, call: F) -> JurisResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> JurisResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(call());
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(JurisError::Timeout {
            seconds: timeout.as_secs(),
        }),
    }
}
