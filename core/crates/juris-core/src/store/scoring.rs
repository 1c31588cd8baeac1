//! Relevance scoring for theorem retrieval
//!
//! Candidates are ranked by a weighted sum of semantic similarity,
//! operator affinity, agent affinity, precedent strength, and temporal
//! proximity. Scoring is pure and deterministic so retrieval ordering is
//! reproducible across runs.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::deontic::{DeonticFormula, DeonticOperator, LegalAgent};

use super::theorem::TheoremRecord;

/// Score component weights; they sum to 1.0
pub const WEIGHT_SEMANTIC: f64 = 0.35;
pub const WEIGHT_OPERATOR: f64 = 0.25;
pub const WEIGHT_AGENT: f64 = 0.20;
pub const WEIGHT_PRECEDENT: f64 = 0.10;
pub const WEIGHT_TEMPORAL: f64 = 0.10;

/// Cosine similarity clamped into [0, 1]
///
/// Mismatched lengths score 0; callers are expected to have validated
/// dimensions already.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Jaccard overlap between two token sets
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Operator affinity: identical 1.0, known-related pair 0.5, else 0.0
pub fn operator_match(a: DeonticOperator, b: DeonticOperator) -> f64 {
    use DeonticOperator::{Obligation, Permission, Prohibition};
    if a == b {
        return 1.0;
    }
    let related = [
        (Obligation, Prohibition),
        (Permission, Prohibition),
        (Obligation, Permission),
    ];
    if related.contains(&(a, b)) || related.contains(&(b, a)) {
        0.5
    } else {
        0.0
    }
}

/// Agent affinity: same identifier 1.0, same kind 0.5, either side absent
/// 0.25, otherwise 0.0
pub fn agent_match(a: Option<&LegalAgent>, b: Option<&LegalAgent>) -> f64 {
    match (a, b) {
        (Some(x), Some(y)) => {
            if x.identifier == y.identifier {
                1.0
            } else if x.kind == y.kind {
                0.5
            } else {
                0.0
            }
        }
        _ => 0.25,
    }
}

/// Weighted relevance of a theorem for a query formula
pub fn relevance_score(
    query: &DeonticFormula,
    query_signature: &BTreeSet<String>,
    query_embedding: Option<&[f32]>,
    theorem: &TheoremRecord,
    temporal_context: DateTime<Utc>,
) -> f64 {
    let semantic = match (query_embedding, theorem.embedding.as_deref()) {
        (Some(q), Some(t)) => cosine_similarity(q, t),
        _ => jaccard(query_signature, theorem.lexical_signature()),
    };
    let operator = operator_match(query.operator, theorem.formula.operator);
    let agent = agent_match(query.agent.as_ref(), theorem.formula.agent.as_ref());
    let temporal = theorem.temporal_scope.proximity(temporal_context);

    WEIGHT_SEMANTIC * semantic
        + WEIGHT_OPERATOR * operator
        + WEIGHT_AGENT * agent
        + WEIGHT_PRECEDENT * theorem.precedent_strength
        + WEIGHT_TEMPORAL * temporal
}
