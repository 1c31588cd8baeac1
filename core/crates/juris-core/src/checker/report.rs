//! Compiler-style diagnostic output for document analyses

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{ConflictSeverity, LogicalConflict, TemporalConflict};

/// Category of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    LogicalConflict,
    TemporalConflict,
    LowConfidenceExtraction,
    MissingPrecedent,
    General,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogicalConflict => "logical_conflict",
            Self::TemporalConflict => "temporal_conflict",
            Self::LowConfidenceExtraction => "low_confidence_extraction",
            Self::MissingPrecedent => "missing_precedent",
            Self::General => "general",
        }
    }
}

/// One diagnostic produced while debugging a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: ConflictSeverity,
    pub category: IssueCategory,
    pub message: String,
    pub suggestion: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Issue {
    pub fn new(
        severity: ConflictSeverity,
        category: IssueCategory,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            suggestion: suggestion.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Build the issue for a logical conflict, including its fix suggestion
    pub fn from_logical_conflict(conflict: &LogicalConflict) -> Self {
        use crate::store::ConflictKind;
        let suggestion = match conflict.kind {
            ConflictKind::DirectContradiction => format!(
                "Reconcile the obligation '{}' with the prohibition from {}",
                conflict.document_formula.proposition, conflict.source_case
            ),
            ConflictKind::ExplicitConflict => format!(
                "Remove or qualify the permission '{}' conflicting with {}",
                conflict.document_formula.proposition, conflict.source_case
            ),
            ConflictKind::PermissionProhibitionBroad => format!(
                "Review the permission '{}' against the broader prohibition in {}",
                conflict.document_formula.proposition, conflict.source_case
            ),
            ConflictKind::ScopeTension => format!(
                "Clarify whether '{}' is obligatory or merely permitted given {}",
                conflict.document_formula.proposition, conflict.source_case
            ),
        };
        Issue::new(
            conflict.severity,
            IssueCategory::LogicalConflict,
            conflict.description.clone(),
            suggestion,
        )
        .with_detail("conflict_kind", conflict.kind.as_str())
        .with_detail("theorem_id", conflict.theorem_id.clone())
        .with_detail("source_case", conflict.source_case.clone())
    }

    /// Build the issue for a temporal conflict
    pub fn from_temporal_conflict(conflict: &TemporalConflict) -> Self {
        let window_end = conflict
            .theorem_scope
            .end
            .map(|e| e.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "open".to_string());
        let suggestion = format!(
            "Ensure the clause applies within the precedent's active window [{}, {}]",
            conflict.theorem_scope.start.format("%Y-%m-%d"),
            window_end
        );
        Issue::new(
            conflict.severity,
            IssueCategory::TemporalConflict,
            conflict.description.clone(),
            suggestion,
        )
        .with_detail("theorem_id", conflict.theorem_id.clone())
        .with_detail("source_case", conflict.source_case.clone())
    }
}

/// Debugger-style report over a document analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugReport {
    pub document_id: String,
    pub total_issues: usize,
    /// Issues with severity critical or high
    pub critical_errors: usize,
    /// Issues with severity medium
    pub warnings: usize,
    /// Issues with severity low
    pub suggestions: usize,
    pub issues: Vec<Issue>,
    pub fix_suggestions: Vec<String>,
    /// One line ending with the PASS/FAIL verdict
    pub summary: String,
}

impl DebugReport {
    /// Assemble a report from issues and the consistency verdict
    pub fn build(document_id: &str, issues: Vec<Issue>, is_consistent: bool) -> Self {
        let critical_errors = issues
            .iter()
            .filter(|i| i.severity >= ConflictSeverity::High)
            .count();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == ConflictSeverity::Medium)
            .count();
        let suggestions = issues
            .iter()
            .filter(|i| i.severity == ConflictSeverity::Low)
            .count();

        let mut fix_suggestions: Vec<String> = Vec::new();
        for issue in &issues {
            if !issue.suggestion.is_empty() && !fix_suggestions.contains(&issue.suggestion) {
                fix_suggestions.push(issue.suggestion.clone());
            }
        }

        let verdict = if !is_consistent {
            "FAIL"
        } else if warnings > 0 || suggestions > 0 {
            "PASS with warnings"
        } else {
            "PASS"
        };
        let summary = format!(
            "{document_id}: {} issue(s) ({critical_errors} critical, {warnings} warning(s), \
             {suggestions} suggestion(s)): {verdict}",
            issues.len()
        );

        Self {
            document_id: document_id.to_string(),
            total_issues: issues.len(),
            critical_errors,
            warnings,
            suggestions,
            issues,
            fix_suggestions,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_partitions_by_severity() {
        let issues = vec![
            Issue::new(
                ConflictSeverity::Critical,
                IssueCategory::LogicalConflict,
                "direct contradiction",
                "reconcile",
            ),
            Issue::new(
                ConflictSeverity::High,
                IssueCategory::LogicalConflict,
                "explicit conflict",
                "remove",
            ),
            Issue::new(
                ConflictSeverity::Medium,
                IssueCategory::TemporalConflict,
                "outside window",
                "check dates",
            ),
            Issue::new(
                ConflictSeverity::Low,
                IssueCategory::LowConfidenceExtraction,
                "weak extraction",
                "review",
            ),
        ];
        let report = DebugReport::build("contract.pdf", issues, false);
        assert_eq!(report.total_issues, 4);
        assert_eq!(report.critical_errors, 2);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.suggestions, 1);
        assert!(report.summary.ends_with("FAIL"));
    }

    #[test]
    fn test_clean_report_passes() {
        let report = DebugReport::build("clean.pdf", vec![], true);
        assert_eq!(report.total_issues, 0);
        assert!(report.summary.ends_with("PASS"));
        assert!(!report.summary.ends_with("with warnings"));
    }

    #[test]
    fn test_pass_with_warnings() {
        let issues = vec![Issue::new(
            ConflictSeverity::Low,
            IssueCategory::MissingPrecedent,
            "corpus empty",
            "Corpus empty; cannot validate against precedent",
        )];
        let report = DebugReport::build("doc.pdf", issues, true);
        assert!(report.summary.ends_with("PASS with warnings"));
        assert_eq!(report.fix_suggestions.len(), 1);
    }

    #[test]
    fn test_fix_suggestions_deduplicated() {
        let issue = Issue::new(
            ConflictSeverity::Medium,
            IssueCategory::TemporalConflict,
            "a",
            "same fix",
        );
        let report = DebugReport::build("doc.pdf", vec![issue.clone(), issue], false);
        assert_eq!(report.fix_suggestions.len(), 1);
    }
}
