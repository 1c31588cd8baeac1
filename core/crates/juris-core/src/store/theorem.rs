//! Theorem records: formulas enriched with precedent metadata

use std::collections::BTreeSet;

use crate::deontic::formula::short_hash;
use crate::deontic::DeonticFormula;
use crate::temporal::TemporalScope;

/// Tokens ignored when building lexical signatures
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "in", "on", "and", "or", "with", "for", "by", "is", "are", "be",
    "at", "from", "under", "any", "all", "their", "its", "this", "that", "shall", "must", "may",
];

/// Tokenize text into a lexical signature: lowercase content tokens
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// A deontic formula stored as a legal rule with precedent metadata
///
/// Theorems are created at ingestion time and never mutated; an update is
/// a new theorem with a new temporal scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TheoremRecord {
    pub theorem_id: String,
    pub formula: DeonticFormula,
    pub temporal_scope: TemporalScope,
    pub jurisdiction: String,
    pub legal_domain: String,
    pub source_case: String,
    /// How authoritative the source case is, in [0, 1]
    pub precedent_strength: f64,
    /// Dense vector, present only when an embedding provider supplied one
    pub embedding: Option<Vec<f32>>,
    lexical_signature: BTreeSet<String>,
}

impl TheoremRecord {
    pub fn new(
        formula: DeonticFormula,
        temporal_scope: TemporalScope,
        jurisdiction: impl Into<String>,
        legal_domain: impl Into<String>,
        source_case: impl Into<String>,
        precedent_strength: f64,
    ) -> Self {
        let jurisdiction = jurisdiction.into();
        let legal_domain = legal_domain.into();
        let theorem_id = derive_theorem_id(&formula, &jurisdiction, &legal_domain, &temporal_scope);
        let lexical_signature =
            tokenize(&format!("{} {}", formula.proposition, formula.source_text));
        Self {
            theorem_id,
            formula,
            temporal_scope,
            jurisdiction,
            legal_domain,
            source_case: source_case.into(),
            precedent_strength,
            embedding: None,
            lexical_signature,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Token set over the formula's proposition and source text
    pub fn lexical_signature(&self) -> &BTreeSet<String> {
        &self.lexical_signature
    }
}

/// Stable theorem id: formula id plus jurisdiction, domain, and scope
pub fn derive_theorem_id(
    formula: &DeonticFormula,
    jurisdiction: &str,
    legal_domain: &str,
    temporal_scope: &TemporalScope,
) -> String {
    short_hash(
        &format!(
            "{}:{}:{}:{}",
            formula.formula_id(),
            jurisdiction,
            legal_domain,
            temporal_scope.canonical_string()
        ),
        16,
    )
}
