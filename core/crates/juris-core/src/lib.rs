//! Juris Core - Temporal deontic logic engine for legal documents
//!
//! This crate treats legal documents as source code and legal precedents
//! as a rule base: it extracts deontic formulas (obligations, permissions,
//! prohibitions) with temporal and jurisdictional scope, indexes them in a
//! hybrid lexical/vector store, retrieves relevant theorems for new
//! documents, and reports logical and temporal conflicts the way a
//! compiler reports type errors.

pub mod deontic;
pub mod error;
pub mod providers;
pub mod temporal;

// Retrieval and conflict detection
pub mod store;

// The legal debugger
pub mod checker;

// Concurrent ingestion pipeline
pub mod bulk;

pub use bulk::{BulkProcessingConfig, CaselawBulkProcessor, ProcessingStats};
pub use checker::{DebugReport, DocumentAnalysis, DocumentConsistencyChecker, PatternExtractor};
pub use deontic::{
    AgentKind, DeonticFormula, DeonticOperator, DeonticRuleSet, LegalAgent, LegalContext,
    TemporalCondition, TemporalOperator,
};
pub use error::{JurisError, JurisResult};
pub use providers::{EmbeddingProvider, LlmAnalyzer, ProofExecutor};
pub use store::{ConsistencyResult, StoreConfig, TemporalDeonticRagStore, TheoremRecord};
pub use temporal::TemporalScope;

/// Engine version reported in exports and the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum supported document size (1MB)
pub const MAX_DOCUMENT_SIZE: usize = 1024 * 1024;
