//! The verifier pipeline.
//!
//! `VerifierPipeline` implements the `Verifier` trait from `aegis-core`. It
//! holds an ordered list of `PlanCheck`s and runs every one of them against
//! the plan:
//!
//! 1. Checks run in registration order; each check's findings are appended
//!    in the order it returned them (step order for the built-ins).
//! 2. No short-circuiting: a BLOCK from one check does not stop the rest, so
//!    the report always carries the full picture.
//! 3. A check that panics is contained and reported as a BLOCK finding naming
//!    the check. A check that could not run must never read as a pass.
//!
//! Findings without a code are stamped with the name of the check that
//! produced them.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use aegis_contracts::{
    plan::Plan,
    verify::{Finding, Severity, VerificationReport},
};
use aegis_core::traits::Verifier;

use crate::{
    check::{CheckFn, FnCheck, PlanCheck},
    checks::{ConfirmationForRisk, ScopeMustBeBounded},
};

/// Ordered registry of plan checks.
///
/// `Default` is the empty pipeline, same as `new()`. Use `standard()` for
/// the built-in checks.
#[derive(Default)]
pub struct VerifierPipeline {
    checks: Vec<Box<dyn PlanCheck>>,
}

impl VerifierPipeline {
    /// A pipeline with no checks registered. Every plan passes it.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// A pipeline with the built-in checks: confirmation-for-risk, then
    /// scope-must-be-bounded.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(ConfirmationForRisk));
        pipeline.register(Box::new(ScopeMustBeBounded));
        pipeline
    }

    /// Append `check` to the end of the pipeline.
    pub fn register(&mut self, check: Box<dyn PlanCheck>) {
        debug!(check = %check.name(), position = self.checks.len(), "registering plan check");
        self.checks.push(check);
    }

    /// Append a closure-backed check under `name`.
    pub fn register_fn(&mut self, name: impl Into<String>, f: CheckFn) {
        self.register(Box::new(FnCheck::new(name, f)));
    }

    /// Names of the registered checks, in run order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    fn run_check(check: &dyn PlanCheck, plan: &Plan) -> Vec<Finding> {
        match panic::catch_unwind(AssertUnwindSafe(|| check.check(plan))) {
            Ok(findings) => findings
                .into_iter()
                .map(|mut f| {
                    if f.code.is_none() {
                        f.code = Some(check.name().to_string());
                    }
                    f
                })
                .collect(),
            Err(_) => {
                let message = format!(
                    "check '{}' could not evaluate the plan; treating as blocking",
                    check.name()
                );
                warn!(plan_id = %plan.plan_id.as_str(), check = %check.name(), "plan check panicked");
                vec![Finding::block(message).with_code(check.name())]
            }
        }
    }
}

impl Verifier for VerifierPipeline {
    /// Run every registered check over `plan`.
    fn verify(&self, plan: &Plan) -> VerificationReport {
        let mut findings: Vec<Finding> = Vec::new();

        for check in &self.checks {
            debug!(plan_id = %plan.plan_id.as_str(), check = %check.name(), "running plan check");

            for finding in Self::run_check(check.as_ref(), plan) {
                match finding.level {
                    Severity::Block => warn!(
                        check = %check.name(),
                        step_id = ?finding.step_id,
                        message = %finding.message,
                        "blocking finding"
                    ),
                    Severity::Warn => debug!(
                        check = %check.name(),
                        step_id = ?finding.step_id,
                        message = %finding.message,
                        "warning finding"
                    ),
                }
                findings.push(finding);
            }
        }

        debug!(
            plan_id = %plan.plan_id.as_str(),
            finding_count = findings.len(),
            "verification complete"
        );

        VerificationReport { findings }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use aegis_contracts::{
        plan::{Plan, PlanId, PlanStep, ScopeConstraints, ScopeSpec},
        policy::RiskLevel,
        verify::{Finding, Severity},
    };
    use aegis_core::traits::Verifier;

    use super::VerifierPipeline;
    use crate::checks::{ConfirmationForRisk, ScopeMustBeBounded};

    fn unbounded_unconfirmed_plan() -> Plan {
        let step = |step_id| PlanStep {
            step_id,
            action: "fs.delete".to_string(),
            args: Map::new(),
            scope: ScopeSpec {
                scope_token: "workspace".to_string(),
                constraints: ScopeConstraints::default(),
            },
            risk: RiskLevel::High,
            reversible: false,
            requires_confirmation: false,
            validators: vec![],
            dry_run_supported: true,
        };
        Plan {
            plan_id: PlanId("plan-test".to_string()),
            steps: vec![step(1), step(2)],
            notes: None,
        }
    }

    #[test]
    fn test_standard_registration_order() {
        let pipeline = VerifierPipeline::standard();
        assert_eq!(
            pipeline.check_names(),
            vec![ConfirmationForRisk::NAME, ScopeMustBeBounded::NAME]
        );
    }

    /// Findings are grouped by check in registration order, then by step.
    #[test]
    fn test_findings_ordered_by_check_then_step() {
        let report = VerifierPipeline::standard().verify(&unbounded_unconfirmed_plan());

        let shape: Vec<(Severity, Option<u32>)> =
            report.findings.iter().map(|f| (f.level, f.step_id)).collect();
        assert_eq!(
            shape,
            vec![
                (Severity::Warn, Some(1)),
                (Severity::Warn, Some(2)),
                (Severity::Block, Some(1)),
                (Severity::Block, Some(2)),
            ]
        );
    }

    /// An earlier BLOCK does not stop later checks from running.
    #[test]
    fn test_no_short_circuit_after_block() {
        let mut pipeline = VerifierPipeline::new();
        pipeline.register(Box::new(ScopeMustBeBounded));
        pipeline.register_fn(
            "plan-note",
            Box::new(|plan: &Plan| vec![Finding::warn(format!("reviewed {} steps", plan.steps.len()))]),
        );

        let report = pipeline.verify(&unbounded_unconfirmed_plan());

        assert_eq!(report.count(Severity::Block), 2);
        let last = report.findings.last().unwrap();
        assert_eq!(last.message, "reviewed 2 steps");
        // Code defaults to the registering name.
        assert_eq!(last.code.as_deref(), Some("plan-note"));
        assert!(last.step_id.is_none());
    }

    /// A panicking check fails closed with a BLOCK naming it, and the
    /// remaining checks still run.
    #[test]
    fn test_panicking_check_fails_closed() {
        let mut pipeline = VerifierPipeline::new();
        pipeline.register_fn("broken", Box::new(|_plan: &Plan| panic!("index out of range")));
        pipeline.register(Box::new(ConfirmationForRisk));

        let report = pipeline.verify(&unbounded_unconfirmed_plan());

        assert_eq!(report.findings[0].level, Severity::Block);
        assert_eq!(report.findings[0].code.as_deref(), Some("broken"));
        assert!(report.findings[0].message.contains("'broken'"));
        assert_eq!(report.count(Severity::Warn), 2);
    }

    #[test]
    fn test_empty_pipeline_reports_nothing() {
        let report = VerifierPipeline::new().verify(&unbounded_unconfirmed_plan());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_default_matches_new() {
        let pipeline = VerifierPipeline::default();
        assert!(pipeline.check_names().is_empty());
        assert!(pipeline.verify(&unbounded_unconfirmed_plan()).findings.is_empty());
    }
}
