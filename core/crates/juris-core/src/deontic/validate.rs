//! Explicit validation for formulas and rule sets
//!
//! Constructors never fail; the invariants of the model are enforced only
//! here, and every violation is reported rather than just the first.

use super::formula::DeonticFormula;
use super::rule_set::DeonticRuleSet;

/// Validate a formula, returning every violated invariant
pub fn validate_formula(formula: &DeonticFormula) -> Vec<String> {
    let mut errors = Vec::new();

    if formula.proposition.is_empty() {
        errors.push("Formula must have a proposition".to_string());
    }

    if !(0.0..=1.0).contains(&formula.confidence) {
        errors.push(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            formula.confidence
        ));
    }

    for tc in &formula.temporal_conditions {
        if let (Some(start), Some(end)) = (tc.start, tc.end) {
            if start >= end {
                errors.push(format!(
                    "Temporal condition '{}' has start >= end",
                    tc.condition
                ));
            }
        }
    }

    for q in &formula.quantifiers {
        if q.variable.is_empty() {
            errors.push("Quantifier variable cannot be empty".to_string());
        }
        if q.domain.is_empty() {
            errors.push("Quantifier domain cannot be empty".to_string());
        }
    }

    errors
}

/// Validate a rule set: basic fields, each formula, and internal consistency
pub fn validate_rule_set(rule_set: &DeonticRuleSet) -> Vec<String> {
    let mut errors = Vec::new();

    if rule_set.name.is_empty() {
        errors.push("Rule set must have a name".to_string());
    }

    if rule_set.formulas.is_empty() {
        errors.push("Rule set must contain at least one formula".to_string());
    }

    for (i, formula) in rule_set.formulas.iter().enumerate() {
        for error in validate_formula(formula) {
            errors.push(format!("Formula {i}: {error}"));
        }
    }

    for conflict in rule_set.check_consistency() {
        errors.push(format!(
            "Consistency conflict: {} between formulas {} and {}",
            conflict.description,
            conflict.first.formula_id(),
            conflict.second.formula_id()
        ));
    }

    errors
}
