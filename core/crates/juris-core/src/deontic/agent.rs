//! Legal agents: the bearers and beneficiaries of deontic modalities

use serde::{Deserialize, Serialize};

/// Classification of a legal agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Person,
    Organization,
    Government,
    Role,
    Unknown,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Government => "government",
            Self::Role => "role",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A legal agent (person, organization, government body, or role)
///
/// The identifier is stable and used as the join key when matching agents
/// across formulas; the display name is free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalAgent {
    pub identifier: String,
    pub name: String,
    pub kind: AgentKind,
}

impl LegalAgent {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            kind,
        }
    }

    /// Generic fallback agent used when no specific party can be inferred
    pub fn generic_party() -> Self {
        Self::new("party", "Legal Party", AgentKind::Role)
    }
}
