//! Policy document parsing.
//!
//! A policy document is an allow-list of actions:
//!
//! ```json
//! { "allowed_actions": [ { "action": "fs.delete", "risk": "High", "reversible": false } ] }
//! ```
//!
//! or the same shape in TOML:
//!
//! ```toml
//! [[allowed_actions]]
//! action = "fs.delete"
//! risk = "High"
//! reversible = false
//! ```
//!
//! A document that is not an object, or whose `allowed_actions` is not a
//! list, is rejected outright. Individual entries that are malformed are
//! skipped and recorded in `PolicyDocument::skipped`; the rest still load.
//! A malformed entry that names an action also drops any earlier entry for
//! that action, so the action is no longer allowed.
//! Unknown extra fields on an entry are ignored.

use serde_json::Value;
use tracing::{debug, warn};

use aegis_contracts::{
    error::{AegisError, AegisResult},
    policy::{PolicyEntry, RiskLevel},
};

/// An entry that could not be loaded, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// 0-based position in `allowed_actions`.
    pub position: usize,
    pub reason: String,
}

/// The parsed contents of a policy document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    pub entries: Vec<PolicyEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl PolicyDocument {
    /// Parse a document already decoded into a JSON value.
    pub fn from_value(doc: &Value) -> AegisResult<Self> {
        let Some(obj) = doc.as_object() else {
            return Err(AegisError::PolicyDocument {
                reason: "policy document must be an object".to_string(),
            });
        };

        let raw_entries = match obj.get("allowed_actions") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                return Err(AegisError::PolicyDocument {
                    reason: "'allowed_actions' must be a list".to_string(),
                })
            }
        };

        let mut document = PolicyDocument::default();
        for (position, raw) in raw_entries.iter().enumerate() {
            match parse_entry(raw) {
                Ok(entry) => document.entries.push(entry),
                Err(rejected) => {
                    warn!(position, reason = %rejected.reason, "skipping policy entry");
                    // A malformed entry naming an action drops earlier entries for it.
                    if let Some(action) = &rejected.action {
                        let before = document.entries.len();
                        document.entries.retain(|e| &e.action != action);
                        if document.entries.len() != before {
                            warn!(position, %action, "earlier policy entry revoked by malformed redefinition");
                        }
                    }
                    document.skipped.push(SkippedEntry {
                        position,
                        reason: rejected.reason,
                    });
                }
            }
        }

        debug!(
            loaded = document.entries.len(),
            skipped = document.skipped.len(),
            "policy document parsed"
        );
        Ok(document)
    }

    /// Parse a JSON policy document.
    pub fn from_json_str(s: &str) -> AegisResult<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| AegisError::PolicyDocument {
            reason: format!("failed to parse policy JSON: {}", e),
        })?;
        Self::from_value(&value)
    }

    /// Parse a TOML policy document.
    pub fn from_toml_str(s: &str) -> AegisResult<Self> {
        let value: Value = toml::from_str(s).map_err(|e| AegisError::PolicyDocument {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_value(&value)
    }
}

/// Why an entry was rejected, and the action it named if it had one.
struct Rejected {
    action: Option<String>,
    reason: String,
}

impl Rejected {
    fn anonymous(reason: &str) -> Self {
        Self { action: None, reason: reason.to_string() }
    }

    fn for_action(action: &str, reason: String) -> Self {
        Self { action: Some(action.to_string()), reason }
    }
}

/// Decode one raw entry.
fn parse_entry(raw: &Value) -> Result<PolicyEntry, Rejected> {
    let Some(obj) = raw.as_object() else {
        return Err(Rejected::anonymous("entry is not an object"));
    };

    let action = match obj.get("action") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(Rejected::anonymous("entry has no non-empty 'action'")),
    };

    let risk = match obj.get("risk") {
        Some(Value::String(s)) => s
            .parse::<RiskLevel>()
            .map_err(|e| Rejected::for_action(&action, format!("action '{action}': {e}")))?,
        Some(other) => {
            return Err(Rejected::for_action(
                &action,
                format!("action '{action}': risk {other} is not a string"),
            ))
        }
        None => {
            return Err(Rejected::for_action(&action, format!("action '{action}': missing 'risk'")))
        }
    };

    // An entry that does not say otherwise is treated as irreversible.
    let reversible = match obj.get("reversible") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(Rejected::for_action(
                &action,
                format!("action '{action}': reversible {other} is not a boolean"),
            ))
        }
    };

    Ok(PolicyEntry { action, risk, reversible })
}
