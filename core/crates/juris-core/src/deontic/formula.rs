//! Deontic formulas and their constituent parts
//!
//! A [`DeonticFormula`] is an immutable record of a normative statement:
//! a deontic operator applied to a proposition, optionally bound to an
//! agent and guarded by conditions, temporal conditions, and quantifiers.
//! Formula identity is a stable content hash, so structurally equal
//! formulas always share an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::agent::LegalAgent;
use crate::error::{JurisError, JurisResult};

/// Deontic operators expressing normative modalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeonticOperator {
    /// O(φ) - it is obligatory that φ
    Obligation,
    /// P(φ) - it is permitted that φ
    Permission,
    /// F(φ) - it is forbidden that φ
    Prohibition,
    /// S(φ) - above and beyond duty
    Supererogation,
    /// R(φ) - φ is a right
    Right,
    /// L(φ) - φ is a liberty/privilege
    Liberty,
    /// POW(φ) - power to bring about φ
    Power,
    /// IMM(φ) - immunity from φ
    Immunity,
}

impl DeonticOperator {
    /// Symbol used in FOL serialization
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Obligation => "O",
            Self::Permission => "P",
            Self::Prohibition => "F",
            Self::Supererogation => "S",
            Self::Right => "R",
            Self::Liberty => "L",
            Self::Power => "POW",
            Self::Immunity => "IMM",
        }
    }

    /// Parse an operator from its FOL symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "O" => Some(Self::Obligation),
            "P" => Some(Self::Permission),
            "F" => Some(Self::Prohibition),
            "S" => Some(Self::Supererogation),
            "R" => Some(Self::Right),
            "L" => Some(Self::Liberty),
            "POW" => Some(Self::Power),
            "IMM" => Some(Self::Immunity),
            _ => None,
        }
    }

    /// All operators, longest symbol first so prefix matching is unambiguous
    pub(crate) fn all_by_symbol_length() -> &'static [DeonticOperator] {
        &[
            Self::Power,
            Self::Immunity,
            Self::Obligation,
            Self::Permission,
            Self::Prohibition,
            Self::Supererogation,
            Self::Right,
            Self::Liberty,
        ]
    }
}

impl std::fmt::Display for DeonticOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Temporal operators for time-dependent legal statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalOperator {
    /// □ - always
    Always,
    /// ◊ - eventually
    Eventually,
    /// X - next time point
    Next,
    /// U - until
    Until,
    /// S - since
    Since,
}

impl TemporalOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Always => "□",
            Self::Eventually => "◊",
            Self::Next => "X",
            Self::Until => "U",
            Self::Since => "S",
        }
    }
}

/// A temporal guard on a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalCondition {
    pub operator: TemporalOperator,
    pub condition: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Duration in whole seconds, when the condition carries one
    #[serde(default)]
    pub duration_seconds: Option<i64>,
}

impl TemporalCondition {
    pub fn new(operator: TemporalOperator, condition: impl Into<String>) -> Self {
        Self {
            operator,
            condition: condition.into(),
            start: None,
            end: None,
            duration_seconds: None,
        }
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// The legal context in which a formula applies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalContext {
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub legal_domain: Option<String>,
    #[serde(default)]
    pub applicable_law: Option<String>,
    #[serde(default)]
    pub precedents: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// First-order quantifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    ForAll,
    Exists,
}

impl Quantifier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::ForAll => "∀",
            Self::Exists => "∃",
        }
    }
}

/// A quantified variable binding: `∀v:D` / `∃v:D`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantifiedVariable {
    pub quantifier: Quantifier,
    pub variable: String,
    pub domain: String,
}

/// A deontic first-order logic formula
///
/// Constructed once and never mutated; all derived data (`formula_id`,
/// FOL serialization) is computed from structural fields, so equal fields
/// always produce equal ids. Equality is structural: the creation
/// timestamp is derived metadata and does not participate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeonticFormula {
    pub operator: DeonticOperator,
    /// Normalized action string (lowercase, ASCII-safe)
    pub proposition: String,
    /// Bearer of the modality
    #[serde(default)]
    pub agent: Option<LegalAgent>,
    #[serde(default)]
    pub beneficiary: Option<LegalAgent>,
    /// Free-text guards, rendered as a conjunction in FOL form
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub temporal_conditions: Vec<TemporalCondition>,
    #[serde(default)]
    pub legal_context: Option<LegalContext>,
    /// Confidence in the extraction/interpretation, in [0, 1]
    pub confidence: f64,
    /// Raw text the formula was extracted from
    #[serde(default)]
    pub source_text: String,
    /// Variable bindings, keyed by variable name
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub quantifiers: Vec<QuantifiedVariable>,
    pub created_at: DateTime<Utc>,
}

impl DeonticFormula {
    /// Create a formula with the given operator and proposition
    pub fn new(operator: DeonticOperator, proposition: impl Into<String>) -> Self {
        Self {
            operator,
            proposition: normalize_proposition(&proposition.into()),
            agent: None,
            beneficiary: None,
            conditions: Vec::new(),
            temporal_conditions: Vec::new(),
            legal_context: None,
            confidence: 1.0,
            source_text: String::new(),
            variables: BTreeMap::new(),
            quantifiers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Convenience constructor for an obligation
    pub fn obligation(proposition: impl Into<String>, agent: LegalAgent) -> Self {
        Self::new(DeonticOperator::Obligation, proposition).with_agent(agent)
    }

    /// Convenience constructor for a permission
    pub fn permission(proposition: impl Into<String>, agent: LegalAgent) -> Self {
        Self::new(DeonticOperator::Permission, proposition).with_agent(agent)
    }

    /// Convenience constructor for a prohibition
    pub fn prohibition(proposition: impl Into<String>, agent: LegalAgent) -> Self {
        Self::new(DeonticOperator::Prohibition, proposition).with_agent(agent)
    }

    pub fn with_agent(mut self, agent: LegalAgent) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_beneficiary(mut self, beneficiary: LegalAgent) -> Self {
        self.beneficiary = Some(beneficiary);
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_temporal_conditions(mut self, conditions: Vec<TemporalCondition>) -> Self {
        self.temporal_conditions = conditions;
        self
    }

    pub fn with_legal_context(mut self, context: LegalContext) -> Self {
        self.legal_context = Some(context);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_source_text(mut self, source_text: impl Into<String>) -> Self {
        self.source_text = source_text.into();
        self
    }

    pub fn with_quantifiers(mut self, quantifiers: Vec<QuantifiedVariable>) -> Self {
        self.quantifiers = quantifiers;
        self
    }

    /// Stable short identifier derived from structural fields
    ///
    /// Equal (operator, proposition, agent identifier, conditions) always
    /// produce equal ids, across processes and runs.
    pub fn formula_id(&self) -> String {
        let agent_id = self
            .agent
            .as_ref()
            .map(|a| a.identifier.as_str())
            .unwrap_or("-");
        let content = format!(
            "{}:{}:{}:{}",
            self.operator.symbol(),
            self.proposition,
            agent_id,
            self.conditions.join("|")
        );
        short_hash(&content, 12)
    }

    /// Deterministic first-order logic serialization
    ///
    /// Format: operator symbol, `[agent_id]` if bound, then the proposition
    /// wrapped by quantifier prefixes, the condition implication, and each
    /// temporal operator in declaration order (outermost last).
    pub fn to_fol_string(&self) -> String {
        let mut out = self.operator.symbol().to_string();

        if let Some(agent) = &self.agent {
            out.push_str(&format!("[{}]", agent.identifier));
        }

        let mut prop = self.proposition.clone();

        for q in &self.quantifiers {
            prop = format!("{}{}:{} ({})", q.quantifier.symbol(), q.variable, q.domain, prop);
        }

        if !self.conditions.is_empty() {
            prop = format!("({}) → ({})", self.conditions.join(" ∧ "), prop);
        }

        for tc in &self.temporal_conditions {
            prop = format!("{}({})", tc.operator.symbol(), prop);
        }

        out.push_str(&format!("({})", prop));
        out
    }

    /// Structural re-parse of a FOL string produced by [`to_fol_string`]
    ///
    /// Recovers the operator, agent identifier, and proposition; quantifier
    /// and condition structure is not reconstructed.
    ///
    /// [`to_fol_string`]: DeonticFormula::to_fol_string
    pub fn parse_fol_string(fol: &str) -> JurisResult<DeonticFormula> {
        let fol = fol.trim();
        let operator = DeonticOperator::all_by_symbol_length()
            .iter()
            .find(|op| fol.starts_with(op.symbol()))
            .copied()
            .ok_or_else(|| JurisError::invalid_input(format!("no deontic operator in '{fol}'")))?;

        let mut rest = &fol[operator.symbol().len()..];

        let mut agent = None;
        if rest.starts_with('[') {
            let close = rest
                .find(']')
                .ok_or_else(|| JurisError::invalid_input("unterminated agent bracket"))?;
            let identifier = &rest[1..close];
            agent = Some(LegalAgent::new(
                identifier,
                identifier,
                super::agent::AgentKind::Unknown,
            ));
            rest = &rest[close + 1..];
        }

        let body = rest
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| JurisError::invalid_input("proposition must be parenthesized"))?;

        // Peel temporal operator wrappers and the condition implication to
        // reach the innermost proposition.
        let mut prop = body;
        loop {
            let wrapped = [TemporalOperator::Always, TemporalOperator::Eventually]
                .iter()
                .find_map(|t| prop.strip_prefix(t.symbol()));
            match wrapped {
                Some(inner) => {
                    prop = inner
                        .strip_prefix('(')
                        .and_then(|s| s.strip_suffix(')'))
                        .unwrap_or(inner);
                }
                None => break,
            }
        }
        if let Some(idx) = prop.rfind("→ (") {
            prop = prop[idx + "→ (".len()..].strip_suffix(')').unwrap_or(&prop[idx..]);
        }
        // Quantifier prefixes leave the proposition in trailing parentheses.
        while let Some(open) = prop.find('(') {
            if prop.starts_with('(') || !prop.contains(':') {
                break;
            }
            prop = prop[open + 1..].strip_suffix(')').unwrap_or(&prop[open + 1..]);
        }

        let mut formula = DeonticFormula::new(operator, prop);
        formula.agent = agent;
        Ok(formula)
    }
}

impl PartialEq for DeonticFormula {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator
            && self.proposition == other.proposition
            && self.agent == other.agent
            && self.beneficiary == other.beneficiary
            && self.conditions == other.conditions
            && self.temporal_conditions == other.temporal_conditions
            && self.legal_context == other.legal_context
            && self.confidence == other.confidence
            && self.source_text == other.source_text
            && self.variables == other.variables
            && self.quantifiers == other.quantifiers
    }
}

/// Normalize an action string: trimmed, lowercased, ASCII-safe, single spaces
pub fn normalize_proposition(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable truncated SHA-256 hex digest
pub(crate) fn short_hash(content: &str, len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..len].to_string()
}
