//! Deontic formula model
//!
//! Immutable value types for deontic first-order logic: operators, agents,
//! temporal conditions, formulas, and rule sets. These are the primitives
//! every other component builds on.

pub mod agent;
pub mod formula;
pub mod rule_set;
pub mod validate;

pub use agent::{AgentKind, LegalAgent};
pub use formula::{
    DeonticFormula, DeonticOperator, LegalContext, QuantifiedVariable, Quantifier,
    TemporalCondition, TemporalOperator,
};
pub use rule_set::{DeonticRuleSet, RuleSetConflict};
pub use validate::{validate_formula, validate_rule_set};
