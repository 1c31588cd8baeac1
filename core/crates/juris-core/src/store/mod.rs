//! Temporal/deontic RAG store
//!
//! Append-only store of theorem records with hybrid lexical/vector
//! retrieval under temporal and jurisdictional filters, plus the
//! consistency-check entry point used by the document checker. All
//! secondary indexes are updated inside the same `&mut self` call that
//! touches the primary map, so readers always observe a point-in-time
//! consistent view.

pub mod config;
pub mod conflict;
pub mod scoring;
pub mod snapshot;
pub mod theorem;

pub use config::StoreConfig;
pub use conflict::{
    check_formula_conflict, check_temporal_conflict, ConflictKind, ConflictSeverity,
    ConsistencyResult, LogicalConflict, TemporalConflict,
};
pub use snapshot::StoreSnapshot;
pub use theorem::TheoremRecord;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::deontic::{DeonticFormula, DeonticOperator};
use crate::error::{JurisError, JurisResult};
use crate::providers::{with_timeout, EmbeddingProvider};
use crate::temporal::{TemporalScope, YearMonth};

use theorem::tokenize;

/// Aggregate statistics over the stored corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_theorems: usize,
    pub jurisdictions: usize,
    pub legal_domains: usize,
    pub avg_precedent_strength: f64,
    /// How many theorems carry an embedding
    pub embedding_backed: usize,
    /// Whether the embedding provider has failed at least once
    pub embedding_degraded: bool,
}

/// The temporal/deontic RAG store
///
/// Owns its theorem records exclusively; retrieval hands out clones, never
/// mutable references. Writes go through `&mut self`, reads through
/// `&self`, so wrapping the store in `Arc<RwLock<_>>` gives the required
/// single-writer / multi-reader discipline.
pub struct TemporalDeonticRagStore {
    config: StoreConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    theorems: BTreeMap<String, TheoremRecord>,
    operator_index: BTreeMap<DeonticOperator, BTreeSet<String>>,
    temporal_index: BTreeMap<YearMonth, BTreeSet<String>>,
    /// Theorems whose scope has no end; checked by containment directly
    open_scope_index: BTreeSet<String>,
    jurisdiction_index: BTreeMap<String, BTreeSet<String>>,
    domain_index: BTreeMap<String, BTreeSet<String>>,
    embedding_degraded: AtomicBool,
}

impl Default for TemporalDeonticRagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemporalDeonticRagStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            embedder: None,
            theorems: BTreeMap::new(),
            operator_index: BTreeMap::new(),
            temporal_index: BTreeMap::new(),
            open_scope_index: BTreeSet::new(),
            jurisdiction_index: BTreeMap::new(),
            domain_index: BTreeMap::new(),
            embedding_degraded: AtomicBool::new(false),
        }
    }

    /// Build a store backed by an embedding provider
    ///
    /// The store's embedding dimension is taken from the provider, so
    /// vectors are uniform within the instance by construction.
    pub fn with_embedder(mut config: StoreConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        config.embedding_dimension = embedder.dimension();
        let mut store = Self::with_config(config);
        store.embedder = Some(embedder);
        store
    }

    /// Detach the embedding provider; the store continues lexical-only
    pub fn drop_embedder(&mut self) {
        self.embedder = None;
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.theorems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theorems.is_empty()
    }

    pub fn theorem(&self, theorem_id: &str) -> Option<&TheoremRecord> {
        self.theorems.get(theorem_id)
    }

    /// All theorems in id order
    pub fn theorems(&self) -> impl Iterator<Item = &TheoremRecord> {
        self.theorems.values()
    }

    /// Whether the embedding provider has failed at least once
    pub fn embedding_degraded(&self) -> bool {
        self.embedding_degraded.load(Ordering::Relaxed)
    }

    /// Add a theorem to the store
    ///
    /// Computes a stable theorem id and inserts into every index. Re-adding
    /// the same inputs returns the same id and leaves the store unchanged.
    pub fn add_theorem(
        &mut self,
        formula: DeonticFormula,
        temporal_scope: TemporalScope,
        jurisdiction: &str,
        legal_domain: &str,
        source_case: &str,
        precedent_strength: f64,
    ) -> JurisResult<String> {
        let jurisdiction = jurisdiction.trim();
        let legal_domain = legal_domain.trim();
        if jurisdiction.is_empty() {
            return Err(JurisError::invalid_input("jurisdiction must be non-empty"));
        }
        if legal_domain.is_empty() {
            return Err(JurisError::invalid_input("legal_domain must be non-empty"));
        }
        if !(0.0..=1.0).contains(&precedent_strength) {
            return Err(JurisError::invalid_input(format!(
                "precedent_strength must be in [0, 1], got {precedent_strength}"
            )));
        }
        if !temporal_scope.is_valid() {
            return Err(JurisError::invalid_input(
                "temporal_scope start must not be after end",
            ));
        }

        let mut record = TheoremRecord::new(
            formula,
            temporal_scope,
            jurisdiction,
            legal_domain,
            source_case,
            precedent_strength,
        );
        let theorem_id = record.theorem_id.clone();

        if self.theorems.contains_key(&theorem_id) {
            debug!("theorem {theorem_id} already indexed; add is a no-op");
            return Ok(theorem_id);
        }

        if self.embedder.is_some() {
            let text = format!(
                "{} {}",
                record.formula.proposition, record.formula.source_text
            );
            match self.embed_text(text) {
                Ok(vector) if vector.len() == self.config.embedding_dimension => {
                    record = record.with_embedding(vector);
                }
                Ok(vector) => {
                    warn!(
                        "embedding provider returned dimension {} (expected {}); \
                         storing theorem {theorem_id} lexical-only",
                        vector.len(),
                        self.config.embedding_dimension
                    );
                }
                Err(err) => {
                    warn!("embedding failed for theorem {theorem_id}: {err}; falling back to lexical");
                    self.embedding_degraded.store(true, Ordering::Relaxed);
                }
            }
        }

        Ok(self.index_record(record))
    }

    /// Insert a record into the primary map and every secondary index
    ///
    /// The caller has already validated inputs; duplicate ids are no-ops.
    pub(crate) fn index_record(&mut self, record: TheoremRecord) -> String {
        let theorem_id = record.theorem_id.clone();
        if self.theorems.contains_key(&theorem_id) {
            return theorem_id;
        }

        self.operator_index
            .entry(record.formula.operator)
            .or_default()
            .insert(theorem_id.clone());
        if record.temporal_scope.end.is_some() {
            for month in record.temporal_scope.months_covered() {
                self.temporal_index
                    .entry(month)
                    .or_default()
                    .insert(theorem_id.clone());
            }
        } else {
            self.open_scope_index.insert(theorem_id.clone());
        }
        self.jurisdiction_index
            .entry(record.jurisdiction.clone())
            .or_default()
            .insert(theorem_id.clone());
        self.domain_index
            .entry(record.legal_domain.clone())
            .or_default()
            .insert(theorem_id.clone());
        self.theorems.insert(theorem_id.clone(), record);

        theorem_id
    }

    /// Retrieve the theorems most relevant to a query formula
    ///
    /// Deterministic for identical inputs and corpus: filters by temporal
    /// containment, jurisdiction, and domain, scores the survivors, and
    /// orders them with stable tie-breaks. Returns clones.
    pub fn retrieve_relevant_theorems(
        &self,
        query: &DeonticFormula,
        temporal_context: DateTime<Utc>,
        jurisdiction: Option<&str>,
        legal_domain: Option<&str>,
        top_k: usize,
    ) -> JurisResult<Vec<TheoremRecord>> {
        let query_embedding = self.query_embedding(query);
        self.retrieve_inner(
            query,
            query_embedding.as_deref(),
            temporal_context,
            jurisdiction,
            legal_domain,
            top_k,
            true,
        )
    }

    /// Retrieve with a caller-supplied query embedding
    ///
    /// Fails with [`JurisError::DimensionMismatch`] when the vector does
    /// not match the store's registered dimension.
    pub fn retrieve_with_query_embedding(
        &self,
        query: &DeonticFormula,
        query_embedding: Option<&[f32]>,
        temporal_context: DateTime<Utc>,
        jurisdiction: Option<&str>,
        legal_domain: Option<&str>,
        top_k: usize,
    ) -> JurisResult<Vec<TheoremRecord>> {
        if let Some(embedding) = query_embedding {
            if embedding.len() != self.config.embedding_dimension {
                return Err(JurisError::DimensionMismatch {
                    expected: self.config.embedding_dimension,
                    actual: embedding.len(),
                });
            }
        }
        self.retrieve_inner(
            query,
            query_embedding,
            temporal_context,
            jurisdiction,
            legal_domain,
            top_k,
            true,
        )
    }

    /// Free-text RAG query over the corpus, scored by semantic similarity
    ///
    /// Honors the same jurisdiction/domain filters and tie-breaks as
    /// formula retrieval, with no temporal filter: the query has no
    /// temporal context of its own.
    pub fn query_similar_theorems(
        &self,
        query_text: &str,
        top_k: usize,
        min_score: f64,
        operator_filter: Option<DeonticOperator>,
        jurisdiction: Option<&str>,
        legal_domain: Option<&str>,
    ) -> JurisResult<Vec<(f64, TheoremRecord)>> {
        if top_k == 0 {
            return Err(JurisError::invalid_input("top_k must be positive"));
        }
        let top_k = top_k.min(self.config.max_top_k);
        let query_signature = tokenize(query_text);
        let query_embedding = self.embed_if_available(query_text.to_string());

        let mut scored: Vec<(f64, &TheoremRecord)> = self
            .theorems
            .values()
            .filter(|t| operator_filter.is_none_or(|op| t.formula.operator == op))
            .filter(|t| jurisdiction.is_none_or(|j| jurisdiction_matches(j, &t.jurisdiction)))
            .filter(|t| legal_domain.is_none_or(|d| self.domain_matches(d, &t.legal_domain)))
            .map(|t| {
                let semantic = match (query_embedding.as_deref(), t.embedding.as_deref()) {
                    (Some(q), Some(e)) => scoring::cosine_similarity(q, e),
                    _ => scoring::jaccard(&query_signature, t.lexical_signature()),
                };
                (semantic, t)
            })
            .filter(|(score, _)| *score >= min_score)
            .collect();

        sort_ranked(&mut scored);
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, t)| (score, t.clone()))
            .collect())
    }

    /// Check document formulas against the stored corpus
    ///
    /// Retrieval here deliberately skips the temporal filter: theorems
    /// outside the document's temporal context must still surface so they
    /// can be reported as temporal conflicts rather than silently ignored.
    pub fn check_document_consistency(
        &self,
        document_formulas: &[DeonticFormula],
        temporal_context: DateTime<Utc>,
        jurisdiction: Option<&str>,
        legal_domain: Option<&str>,
    ) -> ConsistencyResult {
        if self.theorems.is_empty() {
            return ConsistencyResult::empty_corpus();
        }

        let mut conflicts = Vec::new();
        let mut temporal_conflicts = Vec::new();
        let mut relevant: Vec<TheoremRecord> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for formula in document_formulas {
            let query_embedding = self.query_embedding(formula);
            let retrieved = self
                .retrieve_inner(
                    formula,
                    query_embedding.as_deref(),
                    temporal_context,
                    jurisdiction,
                    legal_domain,
                    self.config.default_top_k,
                    false,
                )
                .unwrap_or_default();

            for theorem in &retrieved {
                if theorem.temporal_scope.contains(temporal_context) {
                    if let Some(conflict) = check_formula_conflict(formula, theorem) {
                        conflicts.push(conflict);
                    }
                } else if let Some(conflict) =
                    check_temporal_conflict(formula, theorem, temporal_context)
                {
                    temporal_conflicts.push(conflict);
                }
                if seen.insert(theorem.theorem_id.clone()) {
                    relevant.push(theorem.clone());
                }
            }
        }

        let is_consistent = conflicts.is_empty() && temporal_conflicts.is_empty();
        let reasoning = build_reasoning(
            document_formulas.len(),
            relevant.len(),
            &conflicts,
            &temporal_conflicts,
        );

        ConsistencyResult {
            is_consistent,
            conflicts,
            temporal_conflicts,
            relevant_theorems: relevant,
            reasoning,
        }
    }

    /// Aggregate statistics over the corpus
    pub fn get_statistics(&self) -> StoreStatistics {
        let total = self.theorems.len();
        let avg = if total == 0 {
            0.0
        } else {
            self.theorems
                .values()
                .map(|t| t.precedent_strength)
                .sum::<f64>()
                / total as f64
        };
        StoreStatistics {
            total_theorems: total,
            jurisdictions: self.jurisdiction_index.len(),
            legal_domains: self.domain_index.len(),
            avg_precedent_strength: avg,
            embedding_backed: self
                .theorems
                .values()
                .filter(|t| t.embedding.is_some())
                .count(),
            embedding_degraded: self.embedding_degraded(),
        }
    }

    fn retrieve_inner(
        &self,
        query: &DeonticFormula,
        query_embedding: Option<&[f32]>,
        temporal_context: DateTime<Utc>,
        jurisdiction: Option<&str>,
        legal_domain: Option<&str>,
        top_k: usize,
        enforce_temporal: bool,
    ) -> JurisResult<Vec<TheoremRecord>> {
        if top_k == 0 {
            return Err(JurisError::invalid_input("top_k must be positive"));
        }
        let top_k = top_k.min(self.config.max_top_k);
        let query_signature = tokenize(&format!("{} {}", query.proposition, query.source_text));

        let candidates = self.candidate_records(temporal_context, enforce_temporal);

        let mut scored: Vec<(f64, &TheoremRecord)> = candidates
            .into_iter()
            .filter(|t| !enforce_temporal || t.temporal_scope.contains(temporal_context))
            .filter(|t| jurisdiction.is_none_or(|j| jurisdiction_matches(j, &t.jurisdiction)))
            .filter(|t| legal_domain.is_none_or(|d| self.domain_matches(d, &t.legal_domain)))
            .map(|t| {
                let score = scoring::relevance_score(
                    query,
                    &query_signature,
                    query_embedding,
                    t,
                    temporal_context,
                );
                (score, t)
            })
            .collect();

        sort_ranked(&mut scored);
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, t)| t.clone())
            .collect())
    }

    /// Candidate records for a temporal context
    ///
    /// With the temporal filter on, pulls from the month bucket plus the
    /// open-scope set; callers still verify containment. With it off,
    /// every theorem is a candidate.
    fn candidate_records(
        &self,
        temporal_context: DateTime<Utc>,
        enforce_temporal: bool,
    ) -> Vec<&TheoremRecord> {
        if !enforce_temporal {
            return self.theorems.values().collect();
        }
        let month = YearMonth::from(temporal_context);
        let mut ids: BTreeSet<&String> = BTreeSet::new();
        if let Some(bucket) = self.temporal_index.get(&month) {
            ids.extend(bucket.iter());
        }
        ids.extend(self.open_scope_index.iter());
        ids.iter().filter_map(|id| self.theorems.get(*id)).collect()
    }

    fn domain_matches(&self, filter: &str, theorem_domain: &str) -> bool {
        if filter.eq_ignore_ascii_case(theorem_domain) {
            return true;
        }
        self.config
            .related_domains
            .get(filter)
            .is_some_and(|related| {
                related.iter().any(|d| d.eq_ignore_ascii_case(theorem_domain))
            })
    }

    /// Embed a query formula when a provider is configured
    fn query_embedding(&self, query: &DeonticFormula) -> Option<Vec<f32>> {
        let text = format!("{} {}", query.proposition, query.source_text);
        self.embed_if_available(text)
    }

    fn embed_if_available(&self, text: String) -> Option<Vec<f32>> {
        self.embedder.as_ref()?;
        match self.embed_text(text) {
            Ok(vector) if vector.len() == self.config.embedding_dimension => Some(vector),
            Ok(vector) => {
                warn!(
                    "query embedding has dimension {} (expected {}); using lexical scoring",
                    vector.len(),
                    self.config.embedding_dimension
                );
                None
            }
            Err(err) => {
                warn!("query embedding failed: {err}; using lexical scoring");
                self.embedding_degraded.store(true, Ordering::Relaxed);
                None
            }
        }
    }

    fn embed_text(&self, text: String) -> JurisResult<Vec<f32>> {
        let provider = Arc::clone(
            self.embedder
                .as_ref()
                .ok_or_else(|| JurisError::external_unavailable("embedding", "no provider"))?,
        );
        with_timeout(self.config.embedding_timeout, move || {
            let mut vectors = provider.embed(&[text])?;
            vectors
                .pop()
                .ok_or_else(|| JurisError::external_unavailable("embedding", "empty batch"))
        })
    }
}

/// Jurisdiction filter with asymmetric widening: Federal matches any
fn jurisdiction_matches(filter: &str, theorem_jurisdiction: &str) -> bool {
    filter.eq_ignore_ascii_case(theorem_jurisdiction)
        || theorem_jurisdiction.eq_ignore_ascii_case("Federal")
        || filter.eq_ignore_ascii_case("Federal")
}

/// Sort scored candidates: score desc, precedent desc, start desc, id asc
fn sort_ranked(scored: &mut [(f64, &TheoremRecord)]) {
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| b.precedent_strength.total_cmp(&a.precedent_strength))
            .then_with(|| b.temporal_scope.start.cmp(&a.temporal_scope.start))
            .then_with(|| a.theorem_id.cmp(&b.theorem_id))
    });
}

fn build_reasoning(
    formula_count: usize,
    theorem_count: usize,
    conflicts: &[LogicalConflict],
    temporal_conflicts: &[TemporalConflict],
) -> String {
    let mut reasoning = format!(
        "Checked {formula_count} document formula(s) against {theorem_count} retrieved theorem(s): \
         {} logical conflict(s), {} temporal conflict(s)",
        conflicts.len(),
        temporal_conflicts.len()
    );
    let first_issues: Vec<&str> = conflicts
        .iter()
        .map(|c| c.description.as_str())
        .chain(temporal_conflicts.iter().map(|c| c.description.as_str()))
        .take(3)
        .collect();
    if !first_issues.is_empty() {
        reasoning.push_str("; first issues: ");
        reasoning.push_str(&first_issues.join(" | "));
    }
    reasoning
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deontic::{AgentKind, LegalAgent};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn party() -> LegalAgent {
        LegalAgent::new("party", "Contract Party", AgentKind::Person)
    }

    fn notice_formula() -> DeonticFormula {
        DeonticFormula::obligation("provide written notice before termination", party())
            .with_confidence(0.9)
            .with_source_text("Party must provide written notice")
    }

    fn store_with_notice_theorem() -> (TemporalDeonticRagStore, String) {
        let mut store = TemporalDeonticRagStore::new();
        let id = store
            .add_theorem(
                notice_formula(),
                TemporalScope::open(date(2020, 1, 1)),
                "Federal",
                "contract",
                "Test Case (2020)",
                0.85,
            )
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_add_theorem_indexes_everything() {
        let (store, id) = store_with_notice_theorem();
        assert_eq!(store.len(), 1);
        let theorem = store.theorem(&id).unwrap();
        assert_eq!(theorem.jurisdiction, "Federal");
        assert_eq!(theorem.precedent_strength, 0.85);
        assert!(store.open_scope_index.contains(&id));
        assert!(store.jurisdiction_index["Federal"].contains(&id));
        assert!(store.domain_index["contract"].contains(&id));
        assert!(store.operator_index[&DeonticOperator::Obligation].contains(&id));
    }

    #[test]
    fn test_add_theorem_idempotent() {
        let (mut store, id) = store_with_notice_theorem();
        let again = store
            .add_theorem(
                notice_formula(),
                TemporalScope::open(date(2020, 1, 1)),
                "Federal",
                "contract",
                "Test Case (2020)",
                0.85,
            )
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_statistics().total_theorems, 1);
    }

    #[test]
    fn test_add_theorem_rejects_bad_inputs() {
        let mut store = TemporalDeonticRagStore::new();
        let scope = TemporalScope::open(date(2020, 1, 1));
        assert!(matches!(
            store.add_theorem(notice_formula(), scope, "", "contract", "c", 0.5),
            Err(JurisError::InvalidInput { .. })
        ));
        assert!(matches!(
            store.add_theorem(notice_formula(), scope, "Federal", "  ", "c", 0.5),
            Err(JurisError::InvalidInput { .. })
        ));
        assert!(matches!(
            store.add_theorem(notice_formula(), scope, "Federal", "contract", "c", 1.5),
            Err(JurisError::InvalidInput { .. })
        ));
        let inverted = TemporalScope::new(date(2021, 1, 1), Some(date(2020, 1, 1)));
        assert!(matches!(
            store.add_theorem(notice_formula(), inverted, "Federal", "contract", "c", 0.5),
            Err(JurisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_single_theorem_retrieved_exactly() {
        let (store, id) = store_with_notice_theorem();
        let results = store
            .retrieve_relevant_theorems(
                &notice_formula(),
                date(2020, 1, 1),
                Some("Federal"),
                Some("contract"),
                1,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].theorem_id, id);
    }

    #[test]
    fn test_expired_theorem_not_retrieved() {
        let mut store = TemporalDeonticRagStore::new();
        store
            .add_theorem(
                notice_formula(),
                TemporalScope::new(date(2010, 1, 1), Some(date(2012, 1, 1))),
                "Federal",
                "contract",
                "Expired Case (2010)",
                0.9,
            )
            .unwrap();
        let results = store
            .retrieve_relevant_theorems(&notice_formula(), date(2023, 6, 1), None, None, 5)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_top_k_zero_is_invalid() {
        let (store, _) = store_with_notice_theorem();
        let err = store
            .retrieve_relevant_theorems(&notice_formula(), date(2023, 1, 1), None, None, 0)
            .unwrap_err();
        assert!(matches!(err, JurisError::InvalidInput { .. }));
    }

    #[test]
    fn test_retrieval_deterministic() {
        let (store, _) = store_with_notice_theorem();
        let a = store
            .retrieve_relevant_theorems(&notice_formula(), date(2023, 1, 1), None, None, 5)
            .unwrap();
        let b = store
            .retrieve_relevant_theorems(&notice_formula(), date(2023, 1, 1), None, None, 5)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_jurisdiction_widening() {
        let (store, _) = store_with_notice_theorem();
        // Federal theorem matches a State filter and vice versa.
        let state_filter = store
            .retrieve_relevant_theorems(
                &notice_formula(),
                date(2023, 1, 1),
                Some("State"),
                None,
                5,
            )
            .unwrap();
        assert_eq!(state_filter.len(), 1);
    }

    #[test]
    fn test_domain_filter_uses_related_map() {
        let config = StoreConfig::default().relate_domains("employment", vec!["contract".into()]);
        let mut store = TemporalDeonticRagStore::with_config(config);
        store
            .add_theorem(
                notice_formula(),
                TemporalScope::open(date(2020, 1, 1)),
                "Federal",
                "contract",
                "Test Case (2020)",
                0.85,
            )
            .unwrap();

        let related = store
            .retrieve_relevant_theorems(
                &notice_formula(),
                date(2023, 1, 1),
                None,
                Some("employment"),
                5,
            )
            .unwrap();
        assert_eq!(related.len(), 1);

        let unrelated = store
            .retrieve_relevant_theorems(&notice_formula(), date(2023, 1, 1), None, Some("tort"), 5)
            .unwrap();
        assert!(unrelated.is_empty());
    }

    #[test]
    fn test_query_embedding_dimension_checked() {
        let (store, _) = store_with_notice_theorem();
        let wrong = vec![0.0f32; 7];
        let err = store
            .retrieve_with_query_embedding(
                &notice_formula(),
                Some(&wrong),
                date(2023, 1, 1),
                None,
                None,
                5,
            )
            .unwrap_err();
        assert!(matches!(err, JurisError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_consistency_check_empty_corpus() {
        let store = TemporalDeonticRagStore::new();
        let result =
            store.check_document_consistency(&[notice_formula()], date(2023, 1, 1), None, None);
        assert!(result.is_consistent);
        assert!(result.reasoning.contains("empty"));
    }

    #[test]
    fn test_consistency_check_detects_conflict() {
        let mut store = TemporalDeonticRagStore::new();
        store
            .add_theorem(
                DeonticFormula::prohibition(
                    "disclose confidential information",
                    LegalAgent::new("employee", "Employee", AgentKind::Person),
                ),
                TemporalScope::open(date(2015, 1, 1)),
                "Federal",
                "confidentiality",
                "Confidentiality Act (2015)",
                0.95,
            )
            .unwrap();

        let conflicting = DeonticFormula::permission(
            "share confidential information with partners",
            LegalAgent::new("employee", "Employee", AgentKind::Person),
        );
        let result = store.check_document_consistency(
            &[conflicting],
            date(2023, 6, 1),
            Some("Federal"),
            Some("confidentiality"),
        );
        assert!(!result.is_consistent);
        assert!(!result.conflicts.is_empty());
        assert!(result.reasoning.contains("1 logical conflict"));
    }

    #[test]
    fn test_consistency_check_detects_temporal_violation() {
        let mut store = TemporalDeonticRagStore::new();
        store
            .add_theorem(
                DeonticFormula::obligation(
                    "provide written notice 30 days before termination",
                    party(),
                ),
                TemporalScope::open(date(2020, 1, 1)),
                "Federal",
                "contract",
                "Notice Rule (2020)",
                0.9,
            )
            .unwrap();

        let doc_formula = DeonticFormula::obligation(
            "provide written notice 30 days before termination",
            party(),
        );
        let result =
            store.check_document_consistency(&[doc_formula], date(2016, 8, 1), None, None);
        assert!(!result.is_consistent);
        assert_eq!(result.temporal_conflicts.len(), 1);
        assert_eq!(
            result.temporal_conflicts[0].severity,
            ConflictSeverity::Medium
        );
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_statistics() {
        let (mut store, _) = store_with_notice_theorem();
        store
            .add_theorem(
                DeonticFormula::prohibition("use substandard materials", party()),
                TemporalScope::open(date(2018, 1, 1)),
                "State",
                "construction",
                "Building Code (2018)",
                0.75,
            )
            .unwrap();
        let stats = store.get_statistics();
        assert_eq!(stats.total_theorems, 2);
        assert_eq!(stats.jurisdictions, 2);
        assert_eq!(stats.legal_domains, 2);
        assert!((stats.avg_precedent_strength - 0.80).abs() < 1e-9);
        assert_eq!(stats.embedding_backed, 0);
        assert!(!stats.embedding_degraded);
    }

    #[test]
    fn test_query_similar_theorems() {
        let (store, id) = store_with_notice_theorem();
        let results = store
            .query_similar_theorems("written notice termination", 5, 0.1, None, None, None)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.theorem_id, id);
        assert!(results[0].0 > 0.1);

        let filtered = store
            .query_similar_theorems(
                "written notice termination",
                5,
                0.1,
                Some(DeonticOperator::Prohibition),
                None,
                None,
            )
            .unwrap();
        assert!(filtered.is_empty());
    }
}
