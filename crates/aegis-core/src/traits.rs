//! Trait seams for the Aegis mediation pipeline.
//!
//! - `ActionPolicy`: read-only allow-list snapshot (action → risk/reversibility)
//! - `Verifier`:     runs every registered check over a built plan
//! - `IdGenerator`:  source of plan and intent identifiers
//! - `Clock`:        source of timestamps
//!
//! The mediator receives all four explicitly. Nothing in the pipeline reaches
//! for global state, so tests can supply deterministic ids and clocks.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use aegis_contracts::{plan::Plan, policy::PolicyEntry, verify::VerificationReport};

/// An immutable allow-list of actions.
///
/// Implementations must not change what `lookup` returns while an evaluation
/// holds a reference. Policy updates are made by building a new snapshot and
/// swapping it in whole.
pub trait ActionPolicy: Send + Sync {
    /// The entry for `action`, or `None` if the action is not allowed.
    fn lookup(&self, action: &str) -> Option<&PolicyEntry>;

    /// True if `action` is allow-listed.
    fn allows(&self, action: &str) -> bool {
        self.lookup(action).is_some()
    }
}

/// The verification stage: turns a built plan into a report.
///
/// Implementations must be total. A check that cannot evaluate a condition
/// reports that as a finding instead of failing.
pub trait Verifier: Send + Sync {
    fn verify(&self, plan: &Plan) -> VerificationReport;
}

/// Generates unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Supplies the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic ids: `"{prefix}-1"`, `"{prefix}-2"`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
