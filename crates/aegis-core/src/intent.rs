//! Factory for `Intent` records.
//!
//! Ids and timestamps come from the injected `IdGenerator` and `Clock`.

use std::collections::BTreeMap;

use serde_json::Value;

use aegis_contracts::intent::{Intent, IntentMetadata};

use crate::traits::{Clock, IdGenerator};

/// Builds immutable `Intent` values.
pub struct IntentFactory<'a> {
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
}

/// Optional parts of an intent. `source` defaults to `"cli"`.
#[derive(Debug, Clone, Default)]
pub struct IntentOptions {
    pub constraints: BTreeMap<String, String>,
    pub assumptions: BTreeMap<String, String>,
    pub source: Option<String>,
    pub user_id: Option<String>,
}

impl<'a> IntentFactory<'a> {
    pub fn new(ids: &'a dyn IdGenerator, clock: &'a dyn Clock) -> Self {
        Self { ids, clock }
    }

    pub fn create(
        &self,
        raw_input: impl Into<String>,
        goal: impl Into<String>,
        scope: Vec<String>,
        requested_steps: Vec<Value>,
        options: IntentOptions,
    ) -> Intent {
        Intent {
            intent_id: self.ids.next_id(),
            raw_input: raw_input.into(),
            goal: goal.into(),
            scope,
            constraints: options.constraints,
            assumptions: options.assumptions,
            requested_steps,
            metadata: IntentMetadata {
                request_id: self.ids.next_id(),
                timestamp: self.clock.now(),
                source: options.source.unwrap_or_else(|| "cli".to_string()),
                user_id: options.user_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{IntentFactory, IntentOptions};
    use crate::traits::{FixedClock, SequentialIds};

    #[test]
    fn test_create_uses_injected_ids_and_clock() {
        let ids = SequentialIds::new("intent");
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock(at);

        let intent = IntentFactory::new(&ids, &clock).create(
            "clean up tmp",
            "remove stale files",
            vec!["workspace".to_string()],
            vec![json!({ "action": "fs.delete", "scope_token": "workspace" })],
            IntentOptions::default(),
        );

        assert_eq!(intent.intent_id, "intent-1");
        assert_eq!(intent.metadata.request_id, "intent-2");
        assert_eq!(intent.metadata.timestamp, at);
        assert_eq!(intent.metadata.source, "cli");
        assert!(intent.metadata.user_id.is_none());
        assert_eq!(intent.requested_steps.len(), 1);
    }

    #[test]
    fn test_options_override_defaults() {
        let ids = SequentialIds::new("i");
        let clock = FixedClock(Utc::now());
        let intent = IntentFactory::new(&ids, &clock).create(
            "x",
            "y",
            vec![],
            vec![],
            IntentOptions {
                source: Some("api".to_string()),
                user_id: Some("u-7".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(intent.metadata.source, "api");
        assert_eq!(intent.metadata.user_id.as_deref(), Some("u-7"));
    }
}
