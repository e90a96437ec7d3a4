//! The policy index: action name → allow-list entry.
//!
//! `PolicyIndex` is built once per policy document and never mutated
//! afterwards. It implements the `ActionPolicy` trait from aegis-core and is
//! what the plan builder and validator consult.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use aegis_contracts::{
    error::{AegisError, AegisResult},
    policy::PolicyEntry,
};
use aegis_core::traits::ActionPolicy;

use crate::document::PolicyDocument;

/// An immutable allow-list keyed by action name.
///
/// Construct via `from_json_str`, `from_toml_str`, `from_file` or
/// `from_entries`, then share it read-only (typically behind an `Arc`).
///
/// ```rust,ignore
/// use aegis_policy::PolicyIndex;
///
/// let index = PolicyIndex::from_file(Path::new("policies/allowed_actions.json"))?;
/// assert!(index.lookup("fs.delete").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyIndex {
    entries: HashMap<String, PolicyEntry>,
}

impl PolicyIndex {
    /// Build from entries in order. A repeated action name keeps the last entry.
    pub fn from_entries(entries: impl IntoIterator<Item = PolicyEntry>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            if let Some(previous) = map.insert(entry.action.clone(), entry) {
                debug!(action = %previous.action, "policy entry replaced by later duplicate");
            }
        }
        Self { entries: map }
    }

    pub fn from_document(document: PolicyDocument) -> Self {
        Self::from_entries(document.entries)
    }

    /// Build from a policy document already decoded into JSON.
    pub fn from_value(doc: &Value) -> AegisResult<Self> {
        PolicyDocument::from_value(doc).map(Self::from_document)
    }

    pub fn from_json_str(s: &str) -> AegisResult<Self> {
        PolicyDocument::from_json_str(s).map(Self::from_document)
    }

    pub fn from_toml_str(s: &str) -> AegisResult<Self> {
        PolicyDocument::from_toml_str(s).map(Self::from_document)
    }

    /// Read the file at `path`. A `.toml` extension selects TOML; anything
    /// else is parsed as JSON.
    pub fn from_file(path: &Path) -> AegisResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AegisError::PolicyDocument {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allow-listed action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ActionPolicy for PolicyIndex {
    fn lookup(&self, action: &str) -> Option<&PolicyEntry> {
        self.entries.get(action)
    }
}
