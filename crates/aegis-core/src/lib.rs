//! # aegis-core
//!
//! The non-executing mediation pipeline for Aegis.
//!
//! This crate provides:
//! - The trait seams (`ActionPolicy`, `Verifier`, `IdGenerator`, `Clock`)
//! - The `PlanBuilder` and `validate_plan`, which turn step requests into an
//!   immutable, policy-derived `Plan`
//! - The refusal aggregator, which reduces findings to PASS / WARN / REFUSE
//! - The `Mediator` that wires them together for one intent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aegis_core::{Mediator, traits::ActionPolicy};
//!
//! let mediator = Mediator::new(Box::new(pipeline));
//! let result = mediator.mediate(intent, &*policy_snapshot);
//! println!("{}", result.decision.summary);
//! ```

pub mod builder;
pub mod intent;
pub mod mediator;
pub mod refusal;
pub mod request;
pub mod traits;
pub mod validator;

pub use builder::{BuiltPlan, PlanBuilder};
pub use intent::{IntentFactory, IntentOptions};
pub use mediator::{Mediator, MediatorConfig};
pub use refusal::aggregate;
pub use validator::validate_plan;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use aegis_contracts::policy::{PolicyEntry, RiskLevel};

    use crate::traits::ActionPolicy;

    /// A bare `ActionPolicy` over a map, for tests that do not need the
    /// document loader.
    pub struct MapPolicy(pub HashMap<String, PolicyEntry>);

    impl MapPolicy {
        pub fn of(entries: &[(&str, RiskLevel, bool)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(action, risk, reversible)| {
                        (
                            action.to_string(),
                            PolicyEntry {
                                action: action.to_string(),
                                risk: *risk,
                                reversible: *reversible,
                            },
                        )
                    })
                    .collect(),
            )
        }
    }

    impl ActionPolicy for MapPolicy {
        fn lookup(&self, action: &str) -> Option<&PolicyEntry> {
            self.0.get(action)
        }
    }

    /// fs.read (Low, reversible), fs.write (Medium, reversible),
    /// fs.delete (High, irreversible).
    pub fn fs_policy() -> MapPolicy {
        MapPolicy::of(&[
            ("fs.read", RiskLevel::Low, true),
            ("fs.write", RiskLevel::Medium, true),
            ("fs.delete", RiskLevel::High, false),
        ])
    }
}
