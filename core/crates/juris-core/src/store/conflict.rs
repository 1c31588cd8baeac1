//! Pairwise conflict logic between document formulas and stored theorems
//!
//! Conflicts are rule-based: operator pair patterns over matching
//! propositions and agents. Proposition matching is deliberately
//! recall-oriented: a bidirectional substring test, token Jaccard, and a
//! synonym-canonicalized containment test all count as a match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deontic::{DeonticFormula, DeonticOperator};
use crate::temporal::TemporalScope;

use super::scoring::jaccard;
use super::theorem::{tokenize, TheoremRecord};

/// Jaccard threshold above which two propositions are considered the same
const PROPOSITION_JACCARD_THRESHOLD: f64 = 0.6;

/// Containment threshold for the synonym-canonicalized test
const PROPOSITION_CONTAINMENT_THRESHOLD: f64 = 0.5;

/// Severity of a detected conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConflictSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of logical conflict between two deontic formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Obligation vs prohibition over the same action and agent
    DirectContradiction,
    /// Permission vs prohibition over the same action and agent
    ExplicitConflict,
    /// Permission vs prohibition across different agents
    PermissionProhibitionBroad,
    /// Obligation vs permission over a negated form of the same action
    ScopeTension,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectContradiction => "direct_contradiction",
            Self::ExplicitConflict => "explicit_conflict",
            Self::PermissionProhibitionBroad => "permission_prohibition_broad",
            Self::ScopeTension => "scope_tension",
        }
    }

    pub fn severity(&self) -> ConflictSeverity {
        match self {
            Self::DirectContradiction => ConflictSeverity::Critical,
            Self::ExplicitConflict => ConflictSeverity::High,
            Self::PermissionProhibitionBroad => ConflictSeverity::Medium,
            Self::ScopeTension => ConflictSeverity::Low,
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logical conflict between a document formula and a stored theorem
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalConflict {
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub document_formula: DeonticFormula,
    pub theorem_id: String,
    pub source_case: String,
    pub description: String,
}

/// A document formula asserted outside a matching theorem's active window
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalConflict {
    pub severity: ConflictSeverity,
    pub document_formula: DeonticFormula,
    pub theorem_id: String,
    pub source_case: String,
    pub theorem_scope: TemporalScope,
    pub temporal_context: DateTime<Utc>,
    pub description: String,
}

/// Result of checking a set of document formulas against the corpus
#[derive(Debug, Clone)]
pub struct ConsistencyResult {
    pub is_consistent: bool,
    pub conflicts: Vec<LogicalConflict>,
    pub temporal_conflicts: Vec<TemporalConflict>,
    pub relevant_theorems: Vec<TheoremRecord>,
    pub reasoning: String,
}

impl ConsistencyResult {
    /// Consistent-by-vacuity result for an empty corpus
    pub fn empty_corpus() -> Self {
        Self {
            is_consistent: true,
            conflicts: Vec::new(),
            temporal_conflicts: Vec::new(),
            relevant_theorems: Vec::new(),
            reasoning: "Theorem corpus is empty; no precedent to validate against".to_string(),
        }
    }
}

/// Verb synonym groups canonicalized before the containment test
///
/// Legal drafting rarely repeats the precedent's verb verbatim; mapping
/// common paraphrases onto one canonical token keeps recall up without a
/// semantic model.
const SYNONYM_GROUPS: &[(&str, &[&str])] = &[
    ("disclose", &["share", "reveal", "divulge", "release", "disseminate", "leak", "publish"]),
    ("terminate", &["end", "cancel", "rescind", "dissolve"]),
    ("notify", &["inform", "advise", "alert"]),
    ("provide", &["furnish", "supply", "deliver", "give"]),
    ("use", &["utilize", "employ", "exploit"]),
    ("access", &["obtain", "retrieve", "acquire"]),
    ("pay", &["compensate", "remit", "reimburse"]),
];

fn canonicalize_token(token: &str) -> String {
    for (canonical, synonyms) in SYNONYM_GROUPS {
        if token == *canonical || synonyms.contains(&token) {
            return (*canonical).to_string();
        }
    }
    token.to_string()
}

/// Tokens carrying negation; used by the scope-tension heuristic
const NEGATION_TOKENS: &[&str] = &["not", "no", "never", "without", "refrain"];

fn has_negation(proposition: &str) -> bool {
    proposition
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|t| NEGATION_TOKENS.contains(&t))
}

fn normalize_for_substring(proposition: &str) -> String {
    proposition.to_lowercase().replace('_', " ")
}

/// Whether two propositions describe the same action
pub fn propositions_match(a: &str, b: &str) -> bool {
    let norm_a = normalize_for_substring(a);
    let norm_b = normalize_for_substring(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }
    if norm_a.contains(&norm_b) || norm_b.contains(&norm_a) {
        return true;
    }

    let tokens_a = tokenize(&norm_a);
    let tokens_b = tokenize(&norm_b);
    if jaccard(&tokens_a, &tokens_b) >= PROPOSITION_JACCARD_THRESHOLD {
        return true;
    }

    // Synonym-canonicalized containment: how much of the smaller token set
    // the overlap covers.
    let canon_a: std::collections::BTreeSet<String> =
        tokens_a.iter().map(|t| canonicalize_token(t)).collect();
    let canon_b: std::collections::BTreeSet<String> =
        tokens_b.iter().map(|t| canonicalize_token(t)).collect();
    let intersection = canon_a.intersection(&canon_b).count();
    let smaller = canon_a.len().min(canon_b.len());
    if smaller == 0 || intersection < 2 {
        return false;
    }
    intersection as f64 / smaller as f64 >= PROPOSITION_CONTAINMENT_THRESHOLD
}

/// Whether two formulas refer to a commensurable agent
///
/// Identifier equality is the strict test; equal agent kinds also count,
/// since extracted documents rarely reuse the precedent's identifier for
/// what is functionally the same party.
fn agents_commensurable(a: &DeonticFormula, b: &DeonticFormula) -> bool {
    match (&a.agent, &b.agent) {
        (Some(x), Some(y)) => x.identifier == y.identifier || x.kind == y.kind,
        _ => false,
    }
}

/// Check a document formula against a theorem formula for logical conflict
///
/// Returns `None` when the propositions do not describe the same action or
/// when the operator pair carries no conflict pattern.
pub fn check_formula_conflict(
    document: &DeonticFormula,
    theorem: &TheoremRecord,
) -> Option<LogicalConflict> {
    let theorem_formula = &theorem.formula;
    if !propositions_match(&document.proposition, &theorem_formula.proposition) {
        return None;
    }

    use DeonticOperator::{Obligation, Permission, Prohibition};
    let pair = (document.operator, theorem_formula.operator);
    let agents_match = agents_commensurable(document, theorem_formula);

    let kind = match pair {
        (Obligation, Prohibition) | (Prohibition, Obligation) => {
            if agents_match {
                ConflictKind::DirectContradiction
            } else {
                return None;
            }
        }
        (Permission, Prohibition) | (Prohibition, Permission) => {
            if agents_match {
                ConflictKind::ExplicitConflict
            } else {
                ConflictKind::PermissionProhibitionBroad
            }
        }
        (Obligation, Permission) | (Permission, Obligation) => {
            let negation_differs = has_negation(&document.proposition)
                != has_negation(&theorem_formula.proposition);
            if agents_match && negation_differs {
                ConflictKind::ScopeTension
            } else {
                return None;
            }
        }
        _ => return None,
    };

    let description = format!(
        "{}: '{}' ({}) vs '{}' from {}",
        kind,
        document.proposition,
        document.operator.symbol(),
        theorem_formula.proposition,
        theorem.source_case
    );

    Some(LogicalConflict {
        kind,
        severity: kind.severity(),
        document_formula: document.clone(),
        theorem_id: theorem.theorem_id.clone(),
        source_case: theorem.source_case.clone(),
        description,
    })
}

/// Check whether a document formula falls outside a matching theorem's scope
pub fn check_temporal_conflict(
    document: &DeonticFormula,
    theorem: &TheoremRecord,
    temporal_context: DateTime<Utc>,
) -> Option<TemporalConflict> {
    if theorem.temporal_scope.contains(temporal_context) {
        return None;
    }
    if !propositions_match(&document.proposition, &theorem.formula.proposition) {
        return None;
    }

    let description = format!(
        "temporal_conflict: '{}' asserted at {} but precedent {} is in force {}",
        document.proposition,
        temporal_context.format("%Y-%m-%d"),
        theorem.source_case,
        theorem.temporal_scope.canonical_string()
    );

    Some(TemporalConflict {
        severity: ConflictSeverity::Medium,
        document_formula: document.clone(),
        theorem_id: theorem.theorem_id.clone(),
        source_case: theorem.source_case.clone(),
        theorem_scope: theorem.temporal_scope,
        temporal_context,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deontic::{AgentKind, LegalAgent};
    use chrono::TimeZone;

    fn employee() -> LegalAgent {
        LegalAgent::new("employee", "Employee", AgentKind::Person)
    }

    fn theorem(formula: DeonticFormula) -> TheoremRecord {
        TheoremRecord::new(
            formula,
            TemporalScope::open(Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()),
            "Federal",
            "confidentiality",
            "Confidentiality Act (2015)",
            0.95,
        )
    }

    #[test]
    fn test_propositions_match_substring() {
        assert!(propositions_match(
            "disclose confidential information",
            "disclose confidential information to third parties"
        ));
    }

    #[test]
    fn test_propositions_match_snake_case_vs_spaces() {
        assert!(propositions_match(
            "disclose_confidential_information",
            "disclose confidential information"
        ));
    }

    #[test]
    fn test_propositions_match_synonym_containment() {
        assert!(propositions_match(
            "share confidential company information with external partners",
            "disclose confidential information to third parties"
        ));
    }

    #[test]
    fn test_propositions_no_match() {
        assert!(!propositions_match(
            "provide written notice before termination",
            "disclose confidential information"
        ));
    }

    #[test]
    fn test_direct_contradiction() {
        let t = theorem(DeonticFormula::prohibition(
            "disclose confidential information",
            employee(),
        ));
        let doc = DeonticFormula::obligation("disclose confidential information", employee());
        let conflict = check_formula_conflict(&doc, &t).unwrap();
        assert_eq!(conflict.kind, ConflictKind::DirectContradiction);
        assert_eq!(conflict.severity, ConflictSeverity::Critical);
    }

    #[test]
    fn test_explicit_conflict_same_kind_agents() {
        let t = theorem(DeonticFormula::prohibition(
            "disclose confidential information to third parties",
            LegalAgent::new("professional", "Professional", AgentKind::Person),
        ));
        let doc = DeonticFormula::permission(
            "share confidential company information with external partners",
            employee(),
        );
        let conflict = check_formula_conflict(&doc, &t).unwrap();
        assert_eq!(conflict.kind, ConflictKind::ExplicitConflict);
        assert_eq!(conflict.severity, ConflictSeverity::High);
    }

    #[test]
    fn test_broad_conflict_across_agent_kinds() {
        let t = theorem(DeonticFormula::prohibition(
            "disclose confidential information",
            LegalAgent::new("corporation", "Corporation", AgentKind::Organization),
        ));
        let doc = DeonticFormula::permission("disclose confidential information", employee());
        let conflict = check_formula_conflict(&doc, &t).unwrap();
        assert_eq!(conflict.kind, ConflictKind::PermissionProhibitionBroad);
        assert_eq!(conflict.severity, ConflictSeverity::Medium);
    }

    #[test]
    fn test_scope_tension_requires_negation_difference() {
        let t = theorem(DeonticFormula::permission(
            "disclose records without consent",
            employee(),
        ));
        let doc = DeonticFormula::obligation("disclose records", employee());
        let conflict = check_formula_conflict(&doc, &t).unwrap();
        assert_eq!(conflict.kind, ConflictKind::ScopeTension);
        assert_eq!(conflict.severity, ConflictSeverity::Low);

        let doc_same = DeonticFormula::obligation("disclose records without consent", employee());
        assert!(check_formula_conflict(&doc_same, &t).is_none());
    }

    #[test]
    fn test_same_operator_no_conflict() {
        let t = theorem(DeonticFormula::prohibition(
            "disclose confidential information",
            employee(),
        ));
        let doc = DeonticFormula::prohibition("disclose confidential information", employee());
        assert!(check_formula_conflict(&doc, &t).is_none());
    }

    #[test]
    fn test_temporal_conflict_outside_scope() {
        let t = theorem(DeonticFormula::obligation(
            "provide written notice 30 days before termination",
            employee(),
        ));
        let before_scope = Utc.with_ymd_and_hms(2014, 8, 1, 0, 0, 0).unwrap();
        let doc = DeonticFormula::obligation(
            "provide written notice 30 days before termination",
            employee(),
        );
        let conflict = check_temporal_conflict(&doc, &t, before_scope).unwrap();
        assert_eq!(conflict.severity, ConflictSeverity::Medium);

        let inside = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        assert!(check_temporal_conflict(&doc, &t, inside).is_none());
    }
}
