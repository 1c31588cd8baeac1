//! Export phase: persisted artifacts of a bulk processing run

use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::deontic::DeonticRuleSet;
use crate::error::JurisResult;
use crate::store::TemporalDeonticRagStore;

use super::stats::ProcessingStats;

/// Cross-corpus conflicts found while validating a sample of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_conflicts: usize,
    pub sample_size: usize,
    /// First few conflict descriptions, for the report file
    pub conflicts: Vec<String>,
    pub validation_date: DateTime<Utc>,
}

/// Write every run artifact into the output directory
///
/// Produces `processing_stats.json`, `unified_rule_set.json`,
/// `unified_rag_store.json`, and `validation_report.json` when a
/// validation report exists. Timestamps are ISO 8601; unknowns are null.
pub fn export_all(
    output_directory: &Path,
    stats: &ProcessingStats,
    store: &TemporalDeonticRagStore,
    validation: Option<&ValidationReport>,
) -> JurisResult<()> {
    std::fs::create_dir_all(output_directory)?;

    let stats_json = serde_json::to_string_pretty(stats)?;
    std::fs::write(output_directory.join("processing_stats.json"), stats_json)?;

    let rule_set = unified_rule_set(store, stats);
    let rule_set_json = serde_json::to_string_pretty(&rule_set)?;
    std::fs::write(output_directory.join("unified_rule_set.json"), rule_set_json)?;

    let snapshot = store.export_snapshot();
    std::fs::write(
        output_directory.join("unified_rag_store.json"),
        snapshot.to_json()?,
    )?;

    if let Some(report) = validation {
        let report_json = serde_json::to_string_pretty(report)?;
        std::fs::write(output_directory.join("validation_report.json"), report_json)?;
    }

    info!(
        "exported unified system ({} theorems) to {}",
        store.len(),
        output_directory.display()
    );
    Ok(())
}

/// Snapshot of every stored formula as one named rule set
fn unified_rule_set(store: &TemporalDeonticRagStore, stats: &ProcessingStats) -> DeonticRuleSet {
    DeonticRuleSet::new("Unified Caselaw Deontic Logic System")
        .with_description(format!(
            "Unified system built from {} theorems across {} jurisdictions",
            store.len(),
            stats.jurisdictions_processed.len()
        ))
        .with_formulas(store.theorems().map(|t| t.formula.clone()).collect())
}
