//! Captured human intent.
//!
//! An `Intent` is a record of what someone asked for. It is not a command and
//! carries no execution authority. Build one with `aegis_core::IntentFactory`
//! so that ids and timestamps come from injected generators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Context about where and when an intent was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    /// Capture surface, e.g. "cli", "api", "web".
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Immutable record of a requester's stated goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_id: String,
    /// The text exactly as the requester typed it.
    pub raw_input: String,
    pub goal: String,
    pub scope: Vec<String>,
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
    #[serde(default)]
    pub assumptions: BTreeMap<String, String>,
    /// Raw step requests, decoded by the plan builder. Kept as JSON so that a
    /// malformed request becomes a refusal rather than a capture error.
    #[serde(default)]
    pub requested_steps: Vec<Value>,
    pub metadata: IntentMetadata,
}
