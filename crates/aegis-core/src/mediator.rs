//! The mediator: the non-executing pipeline for one intent.
//!
//!   Intent → Plan Builder → Verifier → Refusal Aggregator → MediationResult
//!
//! `Mediator::mediate` is total. A request that cannot be planned is itself
//! a refusal condition: it yields a REFUSE decision with the failure text as
//! the single reason, and the plan and report are absent. Nothing on this
//! path executes, approves, or persists anything.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use aegis_contracts::{
    error::{AegisError, AegisResult},
    intent::Intent,
    mediation::MediationResult,
};

use crate::{
    builder::{BuiltPlan, PlanBuilder},
    refusal::{aggregate, refuse_planning_failure},
    traits::{ActionPolicy, Clock, IdGenerator, SystemClock, UuidGenerator, Verifier},
};

/// Settings applied to every mediation.
///
/// Deserializable so hosts can read it from their own config files; absent
/// keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    /// Notes stamped on every plan the mediator builds.
    pub notes: Option<String>,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            notes: Some("Generated via mediation pipeline".to_string()),
        }
    }
}

/// Composes plan building, verification and aggregation.
///
/// A mediator holds no per-evaluation state, so one instance can serve many
/// evaluations concurrently. The policy snapshot is passed to each call.
pub struct Mediator {
    verifier: Box<dyn Verifier>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    config: MediatorConfig,
}

impl Mediator {
    /// A mediator with UUID plan ids, the system clock and default config.
    pub fn new(verifier: Box<dyn Verifier>) -> Self {
        Self::with_ports(
            verifier,
            Box::new(UuidGenerator),
            Box::new(SystemClock),
            MediatorConfig::default(),
        )
    }

    /// A mediator with every collaborator supplied by the caller.
    pub fn with_ports(
        verifier: Box<dyn Verifier>,
        ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
        config: MediatorConfig,
    ) -> Self {
        Self { verifier, ids, clock, config }
    }

    /// Mediate one intent against one policy snapshot.
    ///
    /// # Pipeline
    ///
    /// 1. Build a plan from `intent.requested_steps`:
    ///    - any failure → REFUSE with the failure text, plan/report absent
    /// 2. Run the verifier over the plan to get a report
    /// 3. Aggregate the report into a PASS / WARN / REFUSE decision
    pub fn mediate(&self, intent: Intent, policy: &dyn ActionPolicy) -> MediationResult {
        debug!(
            intent_id = %intent.intent_id,
            step_count = intent.requested_steps.len(),
            "mediation starting"
        );

        // ── Step 1: Plan construction ────────────────────────────────────────
        let built = match self.build(&intent, policy) {
            Ok(built) => built,
            Err(err) => {
                warn!(
                    intent_id = %intent.intent_id,
                    error = %err,
                    "planning failed, refusing"
                );
                return MediationResult {
                    decision: refuse_planning_failure(err.to_string()),
                    intent,
                    plan: None,
                    plan_audit: None,
                    verification: None,
                };
            }
        };

        // ── Step 2: Verification ─────────────────────────────────────────────
        let report = self.verifier.verify(&built.plan);

        // ── Step 3: Aggregation ──────────────────────────────────────────────
        let decision = aggregate(&report);

        info!(
            intent_id = %intent.intent_id,
            plan_id = %built.plan.plan_id.as_str(),
            decision = %decision.decision,
            finding_count = report.findings.len(),
            "mediation complete"
        );

        MediationResult {
            intent,
            plan: Some(built.plan),
            plan_audit: Some(built.audit),
            verification: Some(report),
            decision,
        }
    }

    /// Run the builder, turning a panic in any collaborator into an error.
    fn build(&self, intent: &Intent, policy: &dyn ActionPolicy) -> AegisResult<BuiltPlan> {
        let builder = PlanBuilder::new(policy, self.ids.as_ref(), self.clock.as_ref())
            .with_notes(self.config.notes.clone());

        panic::catch_unwind(AssertUnwindSafe(|| {
            builder.build_from_json(&intent.requested_steps, &intent.intent_id)
        }))
        .unwrap_or_else(|_| {
            Err(AegisError::MalformedRequest {
                reason: "plan construction aborted unexpectedly".to_string(),
            })
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
