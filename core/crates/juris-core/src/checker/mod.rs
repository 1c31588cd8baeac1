//! Document consistency checker: the legal debugger
//!
//! Takes a document's full text plus a temporal context, extracts deontic
//! formulas, checks them against the theorem corpus, and produces a
//! compiler-style debug report. A document is never aborted for one bad
//! sentence; external analyzer failures fall back to the deterministic
//! pattern extractor.

pub mod extractor;
pub mod report;

pub use extractor::PatternExtractor;
pub use report::{DebugReport, Issue, IssueCategory};

use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::warn;

use crate::deontic::DeonticFormula;
use crate::providers::{with_timeout, LlmAnalyzer};
use crate::store::{ConflictSeverity, ConsistencyResult, TemporalDeonticRagStore};

/// Configuration for the consistency checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Deadline for each LLM analyzer call
    pub analyzer_timeout: Duration,
    /// Extractions below this confidence are flagged for review
    pub low_confidence_threshold: f64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            analyzer_timeout: Duration::from_secs(60),
            low_confidence_threshold: 0.6,
        }
    }
}

/// Full analysis of one document
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    pub document_id: String,
    pub extracted_formulas: Vec<DeonticFormula>,
    pub consistency_result: ConsistencyResult,
    pub issues_found: Vec<Issue>,
    /// Aggregate confidence in the analysis, in [0, 1]
    pub confidence_score: f64,
    pub processing_time: Duration,
}

/// The document consistency checker
///
/// Holds a shared read handle on the RAG store; extraction never holds the
/// store lock, and each document produces a single deterministic analysis.
pub struct DocumentConsistencyChecker {
    store: Arc<RwLock<TemporalDeonticRagStore>>,
    analyzer: Option<Arc<dyn LlmAnalyzer>>,
    extractor: PatternExtractor,
    config: CheckerConfig,
}

impl DocumentConsistencyChecker {
    pub fn new(store: Arc<RwLock<TemporalDeonticRagStore>>) -> Self {
        Self {
            store,
            analyzer: None,
            extractor: PatternExtractor::new(),
            config: CheckerConfig::default(),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn LlmAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze a document against the theorem corpus
    pub fn check_document(
        &self,
        document_text: &str,
        document_id: &str,
        temporal_context: DateTime<Utc>,
        jurisdiction: &str,
        legal_domain: &str,
    ) -> DocumentAnalysis {
        let started = Instant::now();

        let extracted_formulas = self.extract_formulas(document_text);

        let consistency_result = self.read_store().check_document_consistency(
            &extracted_formulas,
            temporal_context,
            Some(jurisdiction),
            Some(legal_domain),
        );

        let issues_found = self.collect_issues(&extracted_formulas, &consistency_result);
        let confidence_score = confidence_score(&extracted_formulas, &consistency_result);

        DocumentAnalysis {
            document_id: document_id.to_string(),
            extracted_formulas,
            consistency_result,
            issues_found,
            confidence_score,
            processing_time: started.elapsed(),
        }
    }

    /// Check several documents sequentially; each gets its own analysis
    pub fn batch_check_documents(
        &self,
        documents: &[(String, String)],
        temporal_context: DateTime<Utc>,
        jurisdiction: &str,
        legal_domain: &str,
    ) -> Vec<DocumentAnalysis> {
        documents
            .iter()
            .map(|(text, document_id)| {
                self.check_document(text, document_id, temporal_context, jurisdiction, legal_domain)
            })
            .collect()
    }

    /// Produce the debugger-style report for an analysis
    pub fn generate_debug_report(&self, analysis: &DocumentAnalysis) -> DebugReport {
        DebugReport::build(
            &analysis.document_id,
            analysis.issues_found.clone(),
            analysis.consistency_result.is_consistent,
        )
    }

    /// Extraction: LLM analyzer when configured, falling back to the
    /// deterministic pattern extractor on absence or failure. When the
    /// analyzer succeeds, its classification wins outright.
    fn extract_formulas(&self, document_text: &str) -> Vec<DeonticFormula> {
        if document_text.trim().is_empty() {
            return Vec::new();
        }
        let document_text = if document_text.len() > crate::MAX_DOCUMENT_SIZE {
            let mut cut = crate::MAX_DOCUMENT_SIZE;
            while !document_text.is_char_boundary(cut) {
                cut -= 1;
            }
            warn!(
                "document exceeds {} bytes; analyzing the first {cut}",
                crate::MAX_DOCUMENT_SIZE
            );
            &document_text[..cut]
        } else {
            document_text
        };

        if let Some(analyzer) = &self.analyzer {
            let analyzer = Arc::clone(analyzer);
            let text = document_text.to_string();
            match with_timeout(self.config.analyzer_timeout, move || {
                analyzer.extract_formulas(&text)
            }) {
                Ok(formulas) => return formulas,
                Err(err) => {
                    warn!("analyzer failed ({err}); falling back to pattern extraction");
                }
            }
        }

        self.extractor.extract(document_text)
    }

    fn collect_issues(
        &self,
        formulas: &[DeonticFormula],
        consistency: &ConsistencyResult,
    ) -> Vec<Issue> {
        let mut issues = Vec::new();

        for conflict in &consistency.conflicts {
            issues.push(Issue::from_logical_conflict(conflict));
        }
        for conflict in &consistency.temporal_conflicts {
            issues.push(Issue::from_temporal_conflict(conflict));
        }

        for formula in formulas {
            if formula.confidence < self.config.low_confidence_threshold {
                issues.push(
                    Issue::new(
                        ConflictSeverity::Low,
                        IssueCategory::LowConfidenceExtraction,
                        format!(
                            "Low-confidence extraction ({:.2}): '{}'",
                            formula.confidence, formula.proposition
                        ),
                        format!(
                            "Review the clause '{}' manually; extraction confidence was low",
                            formula.proposition
                        ),
                    )
                    .with_detail("formula_id", formula.formula_id()),
                );
            }
        }

        if self.read_store().is_empty() {
            issues.push(Issue::new(
                ConflictSeverity::Low,
                IssueCategory::MissingPrecedent,
                "Theorem corpus is empty",
                "Corpus empty; cannot validate against precedent",
            ));
        } else if formulas.is_empty() {
            issues.push(Issue::new(
                ConflictSeverity::Low,
                IssueCategory::MissingPrecedent,
                "No deontic formulas were extracted from the document",
                "Confirm the document contains normative language to validate",
            ));
        }

        issues
    }

    fn read_store(&self) -> RwLockReadGuard<'_, TemporalDeonticRagStore> {
        match self.store.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Aggregate confidence: mean formula confidence, penalized per conflict
///
/// `mean · (1 − 0.1·critical − 0.05·high)`, clamped to [0, 1]. An empty
/// extraction scores 1.0 (nothing asserted, nothing doubted).
fn confidence_score(formulas: &[DeonticFormula], consistency: &ConsistencyResult) -> f64 {
    let mean = if formulas.is_empty() {
        1.0
    } else {
        formulas.iter().map(|f| f.confidence).sum::<f64>() / formulas.len() as f64
    };
    let critical = consistency
        .conflicts
        .iter()
        .filter(|c| c.severity == ConflictSeverity::Critical)
        .count() as f64;
    let high = consistency
        .conflicts
        .iter()
        .filter(|c| c.severity == ConflictSeverity::High)
        .count() as f64;
    (mean * (1.0 - 0.1 * critical - 0.05 * high)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deontic::{AgentKind, DeonticOperator, LegalAgent};
    use crate::error::{JurisError, JurisResult};
    use crate::providers::AnalyzerReport;
    use crate::temporal::TemporalScope;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn confidentiality_store() -> Arc<RwLock<TemporalDeonticRagStore>> {
        let mut store = TemporalDeonticRagStore::new();
        store
            .add_theorem(
                DeonticFormula::prohibition(
                    "disclose confidential information to third parties",
                    LegalAgent::new("professional", "Professional", AgentKind::Person),
                ),
                TemporalScope::open(date(2015, 1, 1)),
                "Federal",
                "confidentiality",
                "Confidentiality Act (2015)",
                0.95,
            )
            .unwrap();
        Arc::new(RwLock::new(store))
    }

    #[test]
    fn test_consistent_document() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store());
        let analysis = checker.check_document(
            "Consultant shall not disclose any confidential client information to \
             unauthorized third parties under any circumstances.",
            "clean_contract.pdf",
            date(2023, 6, 1),
            "Federal",
            "confidentiality",
        );

        assert_eq!(analysis.document_id, "clean_contract.pdf");
        assert!(analysis.consistency_result.is_consistent);
        assert!(analysis
            .extracted_formulas
            .iter()
            .any(|f| f.operator == DeonticOperator::Prohibition));
        let report = checker.generate_debug_report(&analysis);
        assert_eq!(report.critical_errors, 0);
    }

    #[test]
    fn test_conflicting_document() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store());
        let analysis = checker.check_document(
            "Employee may share confidential company information with external partners \
             without restriction.",
            "conflicting.pdf",
            date(2023, 6, 1),
            "Federal",
            "confidentiality",
        );

        assert!(!analysis.consistency_result.is_consistent);
        let report = checker.generate_debug_report(&analysis);
        assert!(report.critical_errors >= 1);
        assert!(report
            .fix_suggestions
            .iter()
            .any(|s| s.contains("2015")));
        assert!(report.summary.ends_with("FAIL"));
    }

    #[test]
    fn test_empty_document() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store());
        let analysis = checker.check_document(
            "",
            "empty.pdf",
            date(2023, 6, 1),
            "Federal",
            "confidentiality",
        );

        assert!(analysis.extracted_formulas.is_empty());
        assert!(analysis.consistency_result.is_consistent);
        assert_eq!(analysis.confidence_score, 1.0);
        assert!(analysis
            .issues_found
            .iter()
            .any(|i| i.category == IssueCategory::MissingPrecedent));
    }

    #[test]
    fn test_empty_corpus_reports_suggestion() {
        let store = Arc::new(RwLock::new(TemporalDeonticRagStore::new()));
        let checker = DocumentConsistencyChecker::new(store);
        let analysis = checker.check_document(
            "The contractor must complete all assigned work punctually.",
            "doc.pdf",
            date(2023, 6, 1),
            "Federal",
            "contract",
        );

        assert!(analysis.consistency_result.is_consistent);
        let report = checker.generate_debug_report(&analysis);
        assert!(report
            .fix_suggestions
            .iter()
            .any(|s| s.contains("Corpus empty")));
        assert!(report.summary.ends_with("PASS with warnings"));
    }

    #[test]
    fn test_confidence_score_penalizes_conflicts() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store());
        let clean = checker.check_document(
            "Consultant shall not disclose any confidential client information to anyone.",
            "clean.pdf",
            date(2023, 6, 1),
            "Federal",
            "confidentiality",
        );
        let dirty = checker.check_document(
            "Employee may share confidential company information with external partners.",
            "dirty.pdf",
            date(2023, 6, 1),
            "Federal",
            "confidentiality",
        );
        assert!(dirty.confidence_score < clean.confidence_score);
    }

    struct FailingAnalyzer;

    impl LlmAnalyzer for FailingAnalyzer {
        fn analyze_document(&self, _text: &str) -> JurisResult<AnalyzerReport> {
            Err(JurisError::external_unavailable("llm", "connection refused"))
        }
    }

    #[test]
    fn test_analyzer_failure_falls_back_to_patterns() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store())
            .with_analyzer(Arc::new(FailingAnalyzer));
        let analysis = checker.check_document(
            "The contractor must provide written notice before termination.",
            "fallback.pdf",
            date(2023, 6, 1),
            "Federal",
            "contract",
        );
        assert_eq!(analysis.extracted_formulas.len(), 1);
    }

    struct CannedAnalyzer(Vec<DeonticFormula>);

    impl LlmAnalyzer for CannedAnalyzer {
        fn analyze_document(&self, _text: &str) -> JurisResult<AnalyzerReport> {
            Ok(AnalyzerReport {
                formulas: self.0.clone(),
                summary: "canned".to_string(),
                confidence: 0.9,
            })
        }
    }

    #[test]
    fn test_analyzer_wins_over_patterns() {
        let canned = DeonticFormula::obligation(
            "maintain insurance coverage continuously",
            LegalAgent::new("contractor", "Contractor", AgentKind::Organization),
        )
        .with_confidence(0.95);
        let checker = DocumentConsistencyChecker::new(confidentiality_store())
            .with_analyzer(Arc::new(CannedAnalyzer(vec![canned.clone()])));

        let analysis = checker.check_document(
            "The employee may access confidential information for business purposes.",
            "analyzer.pdf",
            date(2023, 6, 1),
            "Federal",
            "contract",
        );
        assert_eq!(analysis.extracted_formulas.len(), 1);
        assert_eq!(analysis.extracted_formulas[0].proposition, canned.proposition);
    }

    #[test]
    fn test_batch_check() {
        let checker = DocumentConsistencyChecker::new(confidentiality_store());
        let documents = vec![
            (
                "Consultant must maintain strict confidentiality at all times.".to_string(),
                "doc1.pdf".to_string(),
            ),
            (
                "Employee may share information freely with anyone.".to_string(),
                "doc2.pdf".to_string(),
            ),
        ];
        let results =
            checker.batch_check_documents(&documents, date(2023, 6, 1), "Federal", "confidentiality");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document_id, "doc1.pdf");
        assert_eq!(results[1].document_id, "doc2.pdf");
    }
}
