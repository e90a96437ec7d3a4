//! Action policy types.
//!
//! An action may only appear in a plan if the allow-list names it. The
//! allow-list is also the sole source of an action's risk level and
//! reversibility: a requester can never declare these for itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of risk levels an allow-listed action can carry.
///
/// Serialized exactly as written in policy documents: `"Low"`, `"Medium"`,
/// `"High"`. Any other spelling is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// All levels, lowest first.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// The canonical policy-document spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// True for the levels that call for explicit human confirmation.
    pub fn is_elevated(&self) -> bool {
        match self {
            RiskLevel::Low => false,
            RiskLevel::Medium | RiskLevel::High => true,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("invalid risk level '{s}'; must be one of: Low, Medium, High"))
    }
}

/// One allow-listed action, as held by the policy index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Unique action name, e.g. `"fs.delete"`.
    pub action: String,
    /// Declared risk of performing the action.
    pub risk: RiskLevel,
    /// Whether the action's effect can be undone.
    pub reversible: bool,
}
