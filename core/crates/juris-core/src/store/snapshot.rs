//! Serialized form of the RAG store
//!
//! The snapshot is the persisted `unified_rag_store.json` artifact: a map
//! of theorem entries plus an export date and count. Maps are ordered, so
//! serialize → deserialize → serialize is byte-identical for a fixed
//! export date. Embeddings are not persisted; an imported store operates
//! lexical-only until re-embedded.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deontic::DeonticFormula;
use crate::error::JurisResult;
use crate::temporal::TemporalScope;

use super::theorem::TheoremRecord;
use super::{StoreConfig, TemporalDeonticRagStore};

/// One persisted theorem entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTheorem {
    pub formula: DeonticFormula,
    pub jurisdiction: String,
    pub legal_domain: String,
    pub source_case: String,
    pub precedent_strength: f64,
    /// `[start, end|null]`, ISO 8601 with offset
    pub temporal_scope: (DateTime<Utc>, Option<DateTime<Utc>>),
}

/// Serialized form of a whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub theorems: BTreeMap<String, SnapshotTheorem>,
    pub export_date: DateTime<Utc>,
    pub total_theorems: usize,
}

impl StoreSnapshot {
    /// Snapshot a store at a fixed export date
    pub fn from_store(store: &TemporalDeonticRagStore, export_date: DateTime<Utc>) -> Self {
        let theorems: BTreeMap<String, SnapshotTheorem> = store
            .theorems()
            .map(|t| {
                (
                    t.theorem_id.clone(),
                    SnapshotTheorem {
                        formula: t.formula.clone(),
                        jurisdiction: t.jurisdiction.clone(),
                        legal_domain: t.legal_domain.clone(),
                        source_case: t.source_case.clone(),
                        precedent_strength: t.precedent_strength,
                        temporal_scope: (t.temporal_scope.start, t.temporal_scope.end),
                    },
                )
            })
            .collect();
        let total_theorems = theorems.len();
        Self {
            theorems,
            export_date,
            total_theorems,
        }
    }

    /// Rebuild a store from a snapshot
    ///
    /// Theorem ids are re-derived from content, so a well-formed snapshot
    /// reproduces its ids exactly.
    pub fn into_store(self, config: StoreConfig) -> JurisResult<TemporalDeonticRagStore> {
        let mut store = TemporalDeonticRagStore::with_config(config);
        for (_, entry) in self.theorems {
            let scope = TemporalScope::new(entry.temporal_scope.0, entry.temporal_scope.1);
            let record = TheoremRecord::new(
                entry.formula,
                scope,
                entry.jurisdiction,
                entry.legal_domain,
                entry.source_case,
                entry.precedent_strength,
            );
            store.index_record(record);
        }
        Ok(store)
    }

    pub fn to_json(&self) -> JurisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> JurisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TemporalDeonticRagStore {
    /// Export the store in its persisted form, stamped with the current time
    pub fn export_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::from_store(self, Utc::now())
    }
}
