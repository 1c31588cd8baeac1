//! Named collections of deontic formulas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::formula::{short_hash, DeonticFormula, DeonticOperator, LegalContext};

/// A pairwise inconsistency found inside a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetConflict {
    pub first: DeonticFormula,
    pub second: DeonticFormula,
    pub description: String,
}

/// A named, versioned collection of deontic formulas
///
/// Rule sets are mutable containers used by callers; they are never stored
/// inside the RAG store and do not deduplicate their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeonticRuleSet {
    pub name: String,
    pub formulas: Vec<DeonticFormula>,
    #[serde(default)]
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub source_document: Option<String>,
    #[serde(default)]
    pub legal_context: Option<LegalContext>,
    pub created_at: DateTime<Utc>,
}

impl DeonticRuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formulas: Vec::new(),
            description: String::new(),
            version: "1.0".to_string(),
            source_document: None,
            legal_context: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_formulas(mut self, formulas: Vec<DeonticFormula>) -> Self {
        self.formulas = formulas;
        self
    }

    /// Stable short identifier derived from name and version
    pub fn rule_set_id(&self) -> String {
        short_hash(&format!("{}:{}", self.name, self.version), 10)
    }

    pub fn add_formula(&mut self, formula: DeonticFormula) {
        self.formulas.push(formula);
    }

    /// Remove the first formula with the given id; returns whether one was found
    pub fn remove_formula(&mut self, formula_id: &str) -> bool {
        match self.formulas.iter().position(|f| f.formula_id() == formula_id) {
            Some(idx) => {
                self.formulas.remove(idx);
                true
            }
            None => false,
        }
    }

    /// All formulas bound to the given agent identifier
    pub fn formulas_for_agent(&self, agent_identifier: &str) -> Vec<&DeonticFormula> {
        self.formulas
            .iter()
            .filter(|f| {
                f.agent
                    .as_ref()
                    .is_some_and(|a| a.identifier == agent_identifier)
            })
            .collect()
    }

    /// All formulas carrying the given deontic operator
    pub fn formulas_with_operator(&self, operator: DeonticOperator) -> Vec<&DeonticFormula> {
        self.formulas.iter().filter(|f| f.operator == operator).collect()
    }

    /// Pairwise consistency check over the rule set
    ///
    /// Reports direct conflicts (obligation vs prohibition) and
    /// permission-vs-prohibition pairs for formulas sharing an agent
    /// identifier and proposition. Deeper conflict logic lives in the RAG
    /// store.
    pub fn check_consistency(&self) -> Vec<RuleSetConflict> {
        let mut conflicts = Vec::new();

        for (i, first) in self.formulas.iter().enumerate() {
            for second in self.formulas.iter().skip(i + 1) {
                if !same_agent(first, second) || first.proposition != second.proposition {
                    continue;
                }
                let pair = operator_pair(first.operator, second.operator);
                let description = match pair {
                    (DeonticOperator::Obligation, DeonticOperator::Prohibition) => {
                        "Direct conflict: obligation vs prohibition"
                    }
                    (DeonticOperator::Permission, DeonticOperator::Prohibition) => {
                        "Conflict: permission vs prohibition"
                    }
                    _ => continue,
                };
                conflicts.push(RuleSetConflict {
                    first: first.clone(),
                    second: second.clone(),
                    description: description.to_string(),
                });
            }
        }

        conflicts
    }
}

fn same_agent(a: &DeonticFormula, b: &DeonticFormula) -> bool {
    match (&a.agent, &b.agent) {
        (Some(x), Some(y)) => x.identifier == y.identifier,
        _ => false,
    }
}

/// Order an operator pair canonically so conflict patterns are symmetric
fn operator_pair(a: DeonticOperator, b: DeonticOperator) -> (DeonticOperator, DeonticOperator) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deontic::agent::{AgentKind, LegalAgent};

    fn employee() -> LegalAgent {
        LegalAgent::new("employee", "Employee", AgentKind::Person)
    }

    #[test]
    fn test_rule_set_id_stable() {
        let a = DeonticRuleSet::new("Springfield Construction Contract");
        let b = DeonticRuleSet::new("Springfield Construction Contract");
        assert_eq!(a.rule_set_id(), b.rule_set_id());
    }

    #[test]
    fn test_add_and_remove() {
        let mut rs = DeonticRuleSet::new("test");
        let f = DeonticFormula::obligation("file quarterly report", employee());
        let id = f.formula_id();
        rs.add_formula(f);
        assert_eq!(rs.formulas.len(), 1);
        assert!(rs.remove_formula(&id));
        assert!(!rs.remove_formula(&id));
        assert!(rs.formulas.is_empty());
    }

    #[test]
    fn test_direct_conflict_detected_regardless_of_order() {
        let mut rs = DeonticRuleSet::new("test");
        rs.add_formula(DeonticFormula::prohibition("disclose records", employee()));
        rs.add_formula(DeonticFormula::obligation("disclose records", employee()));

        let conflicts = rs.check_consistency();
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].description.contains("obligation vs prohibition"));
    }

    #[test]
    fn test_permission_vs_prohibition() {
        let mut rs = DeonticRuleSet::new("test");
        rs.add_formula(DeonticFormula::permission("access archives", employee()));
        rs.add_formula(DeonticFormula::prohibition("access archives", employee()));

        let conflicts = rs.check_consistency();
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].description.contains("permission vs prohibition"));
    }

    #[test]
    fn test_no_conflict_across_agents() {
        let mut rs = DeonticRuleSet::new("test");
        rs.add_formula(DeonticFormula::prohibition("disclose records", employee()));
        rs.add_formula(DeonticFormula::obligation(
            "disclose records",
            LegalAgent::new("court", "Court", AgentKind::Government),
        ));
        assert!(rs.check_consistency().is_empty());
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut rs = DeonticRuleSet::new("test");
        let f = DeonticFormula::permission("inspect premises", employee());
        rs.add_formula(f.clone());
        rs.add_formula(f);
        assert_eq!(rs.formulas.len(), 2);
    }

    #[test]
    fn test_lookup_helpers() {
        let mut rs = DeonticRuleSet::new("test");
        rs.add_formula(DeonticFormula::obligation("pay fees", employee()));
        rs.add_formula(DeonticFormula::permission("inspect premises", employee()));

        assert_eq!(rs.formulas_for_agent("employee").len(), 2);
        assert_eq!(rs.formulas_with_operator(DeonticOperator::Obligation).len(), 1);
    }
}
