//! Deterministic pattern-based formula extraction
//!
//! The fallback extractor used whenever no LLM analyzer is configured or
//! the analyzer fails. Sentences are matched against ordered marker sets;
//! the prohibition scan runs before obligation and permission so negated
//! modals ("must not", "may not") are classified correctly.

use log::debug;
use regex::Regex;

use crate::deontic::formula::normalize_proposition;
use crate::deontic::{AgentKind, DeonticFormula, DeonticOperator, LegalAgent};
use crate::error::JurisResult;
use crate::providers::{AnalyzerReport, LlmAnalyzer};

/// Minimum length of a usable proposition
const MIN_PROPOSITION_LEN: usize = 10;

/// Confidence assigned to explicit obligation/prohibition markers
const STRONG_MARKER_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to permission markers
const PERMISSION_MARKER_CONFIDENCE: f64 = 0.7;

/// Verbs that flag conversational, non-normative text
const NON_LEGAL_INDICATORS: &[&str] = &[
    "said", "says", "went", "came", "looked", "seemed", "hello", "goodbye", "thank", "please",
    "sorry",
];

/// Legal-role lexicon for agent inference, nearest match wins
const AGENT_LEXICON: &[(&str, &str, AgentKind)] = &[
    ("contractor", "Contractor", AgentKind::Organization),
    ("subcontractor", "Subcontractor", AgentKind::Organization),
    ("client", "Client", AgentKind::Person),
    ("party", "Legal Party", AgentKind::Role),
    ("employee", "Employee", AgentKind::Person),
    ("worker", "Worker", AgentKind::Person),
    ("employer", "Employer", AgentKind::Organization),
    ("defendant", "Defendant", AgentKind::Person),
    ("plaintiff", "Plaintiff", AgentKind::Person),
    ("consultant", "Consultant", AgentKind::Person),
    ("court", "Court", AgentKind::Government),
    ("company", "Company", AgentKind::Organization),
    ("corporation", "Corporation", AgentKind::Organization),
    ("business", "Business", AgentKind::Organization),
    ("government", "Government", AgentKind::Government),
    ("agency", "Agency", AgentKind::Government),
    ("tenant", "Tenant", AgentKind::Person),
    ("landlord", "Landlord", AgentKind::Person),
    ("licensee", "Licensee", AgentKind::Organization),
    ("licensor", "Licensor", AgentKind::Organization),
];

/// Deterministic marker-based extractor
pub struct PatternExtractor {
    prohibition: Regex,
    obligation: Regex,
    permission: Regex,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternExtractor {
    pub fn new() -> Self {
        // The marker alternations are fixed strings, so compilation cannot
        // fail at runtime.
        let prohibition = Regex::new(
            r"(?i)\b(must not|shall not|may not|is prohibited from|are prohibited from|prohibited from|forbidden to|barred from|cannot)\s+([^.!?;]+)",
        )
        .expect("static prohibition pattern");
        let obligation = Regex::new(
            r"(?i)\b(must|shall|is required to|are required to|required to|obligated to|has a duty to|have a duty to|duty to)\s+([^.!?;]+)",
        )
        .expect("static obligation pattern");
        let permission = Regex::new(
            r"(?i)\b(may|can|is permitted to|are permitted to|permitted to|allowed to|authorized to|has the right to|have the right to|entitled to)\s+([^.!?;]+)",
        )
        .expect("static permission pattern");
        Self {
            prohibition,
            obligation,
            permission,
        }
    }

    /// Extract deontic formulas from document text
    ///
    /// One bad sentence never aborts extraction; rejected matches are
    /// logged and skipped.
    pub fn extract(&self, text: &str) -> Vec<DeonticFormula> {
        let mut formulas = Vec::new();
        for sentence in split_sentences(text) {
            if let Some(formula) = self.extract_from_sentence(sentence) {
                formulas.push(formula);
            }
        }
        formulas
    }

    /// Classify one sentence; the first matching category wins, with
    /// prohibition checked before obligation and permission
    fn extract_from_sentence(&self, sentence: &str) -> Option<DeonticFormula> {
        let scans = [
            (&self.prohibition, DeonticOperator::Prohibition, STRONG_MARKER_CONFIDENCE),
            (&self.obligation, DeonticOperator::Obligation, STRONG_MARKER_CONFIDENCE),
            (&self.permission, DeonticOperator::Permission, PERMISSION_MARKER_CONFIDENCE),
        ];

        for (pattern, operator, confidence) in scans {
            let Some(captures) = pattern.captures(sentence) else {
                continue;
            };
            let matched = captures.get(0).expect("whole match");
            let object = captures.get(2).map(|m| m.as_str()).unwrap_or("");
            let proposition = normalize_proposition(object);

            if proposition.len() < MIN_PROPOSITION_LEN {
                debug!("skipping short proposition in '{}'", sentence.trim());
                return None;
            }
            if !is_legal_proposition(&proposition) {
                debug!("skipping non-legal proposition '{proposition}'");
                return None;
            }

            let agent = infer_agent(&sentence[..matched.start()]);
            return Some(
                DeonticFormula::new(operator, proposition)
                    .with_agent(agent)
                    .with_confidence(confidence)
                    .with_source_text(matched.as_str().trim()),
            );
        }
        None
    }
}

impl LlmAnalyzer for PatternExtractor {
    fn analyze_document(&self, text: &str) -> JurisResult<AnalyzerReport> {
        let formulas = self.extract(text);
        let confidence = if formulas.is_empty() {
            0.0
        } else {
            formulas.iter().map(|f| f.confidence).sum::<f64>() / formulas.len() as f64
        };
        Ok(AnalyzerReport {
            summary: format!("pattern extraction produced {} formula(s)", formulas.len()),
            confidence,
            formulas,
        })
    }
}

/// Split text into sentence-like units
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Reject conversational text that the markers match by accident
fn is_legal_proposition(proposition: &str) -> bool {
    !NON_LEGAL_INDICATORS
        .iter()
        .any(|indicator| proposition.contains(indicator))
}

/// Look backward in the sentence for the nearest legal-role noun
fn infer_agent(prefix: &str) -> LegalAgent {
    let lower = prefix.to_lowercase();
    let mut best: Option<(usize, &(&str, &str, AgentKind))> = None;
    for entry in AGENT_LEXICON {
        if let Some(pos) = lower.rfind(entry.0) {
            if best.is_none_or(|(best_pos, _)| pos > best_pos) {
                best = Some((pos, entry));
            }
        }
    }
    match best {
        Some((_, (identifier, name, kind))) => LegalAgent::new(*identifier, *name, *kind),
        None => LegalAgent::generic_party(),
    }
}
