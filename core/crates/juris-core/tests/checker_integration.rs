//! End-to-end legal debugging scenarios: clean contract, direct conflict,
//! and temporal violation

use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use juris_core::checker::{DocumentConsistencyChecker, IssueCategory};
use juris_core::deontic::{AgentKind, DeonticFormula, DeonticOperator, LegalAgent};
use juris_core::store::{ConflictSeverity, TemporalDeonticRagStore};
use juris_core::temporal::TemporalScope;

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Corpus with one strong confidentiality prohibition from 2015
fn confidentiality_corpus() -> Arc<RwLock<TemporalDeonticRagStore>> {
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
fn clean_contract_passes() {
    let checker = DocumentConsistencyChecker::new(confidentiality_corpus());
    let analysis = checker.check_document(
        "Consultant shall not disclose any confidential client information to \
         unauthorized third parties under any circumstances.",
        "clean_contract.txt",
        date(2023, 6, 1),
        "Federal",
        "confidentiality",
    );

    assert!(analysis.consistency_result.is_consistent);
    assert!(analysis
        .extracted_formulas
        .iter()
        .any(|f| f.operator == DeonticOperator::Prohibition));

    let report = checker.generate_debug_report(&analysis);
    assert_eq!(report.critical_errors, 0);
    assert!(report.summary.starts_with("clean_contract.txt"));
}

#[test]
fn conflicting_document_fails_with_fix_suggestion() {
    let checker = DocumentConsistencyChecker::new(confidentiality_corpus());
    let analysis = checker.check_document(
        "Employee may share confidential company information with external partners \
         without restriction.",
        "conflicting_contract.txt",
        date(2023, 6, 1),
        "Federal",
        "confidentiality",
    );

    assert!(!analysis.consistency_result.is_consistent);
    assert!(analysis
        .consistency_result
        .conflicts
        .iter()
        .any(|c| matches!(
            c.kind,
            juris_core::store::ConflictKind::ExplicitConflict
                | juris_core::store::ConflictKind::DirectContradiction
        )));

    let report = checker.generate_debug_report(&analysis);
    assert!(report.critical_errors >= 1);
    assert!(report.fix_suggestions.iter().any(|s| s.contains("2015")));
    assert!(report.summary.ends_with("FAIL"));
}

#[test]
fn temporal_violation_reported_as_medium() {
    let mut store = TemporalDeonticRagStore::new();
    store
        .add_theorem(
            DeonticFormula::obligation(
                "provide written notice 30 days before termination",
                LegalAgent::new("party", "Contract Party", AgentKind::Person),
            ),
            TemporalScope::open(date(2020, 1, 1)),
            "Federal",
            "contract",
            "Notice Requirement (2020)",
            0.9,
        )
        .unwrap();
    let checker = DocumentConsistencyChecker::new(Arc::new(RwLock::new(store)));

    let analysis = checker.check_document(
        "The vendor must provide written notice 30 days before termination of this agreement.",
        "predates_precedent.txt",
        date(2016, 8, 1),
        "Federal",
        "contract",
    );

    assert_eq!(analysis.consistency_result.temporal_conflicts.len(), 1);
    assert_eq!(
        analysis.consistency_result.temporal_conflicts[0].severity,
        ConflictSeverity::Medium
    );
    assert!(analysis.consistency_result.conflicts.is_empty());

    let report = checker.generate_debug_report(&analysis);
    assert_eq!(report.warnings, 1);
    assert!(report
        .issues
        .iter()
        .any(|i| i.category == IssueCategory::TemporalConflict));
    assert!(report
        .fix_suggestions
        .iter()
        .any(|s| s.contains("active window")));
}

#[test]
fn empty_corpus_still_produces_report() {
    let store = Arc::new(RwLock::new(TemporalDeonticRagStore::new()));
    let checker = DocumentConsistencyChecker::new(store);
    let analysis = checker.check_document(
        "The contractor must complete all deliverables by the agreed date.",
        "no_corpus.txt",
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
fn analyses_are_deterministic() {
    let checker = DocumentConsistencyChecker::new(confidentiality_corpus());
    let text = "Employee may share confidential company information with external partners.";

    let first = checker.check_document(text, "doc.txt", date(2023, 6, 1), "Federal", "confidentiality");
    let second = checker.check_document(text, "doc.txt", date(2023, 6, 1), "Federal", "confidentiality");

    assert_eq!(first.extracted_formulas, second.extracted_formulas);
    assert_eq!(
        first.consistency_result.is_consistent,
        second.consistency_result.is_consistent
    );
    assert_eq!(first.issues_found, second.issues_found);
    assert_eq!(first.confidence_score, second.confidence_score);
}
