//! Built-in plan checks.
//!
//! - `ConfirmationForRisk`: WARN when an elevated-risk step skips confirmation.
//! - `ScopeMustBeBounded`:  BLOCK when a step has no scope constraints at all.
//!   This one never downgrades to a warning, whatever the step's risk.

use aegis_contracts::{
    plan::Plan,
    verify::Finding,
};

use crate::check::PlanCheck;

/// Medium or High risk steps should require explicit confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationForRisk;

impl ConfirmationForRisk {
    pub const NAME: &'static str = "confirmation-required";
}

impl PlanCheck for ConfirmationForRisk {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, plan: &Plan) -> Vec<Finding> {
        plan.steps
            .iter()
            .filter(|step| step.risk.is_elevated() && !step.requires_confirmation)
            .map(|step| {
                Finding::warn(format!(
                    "Step {}: risk level '{}' requires explicit confirmation but none is set.",
                    step.step_id, step.risk
                ))
                .for_step(step.step_id)
                .with_code(Self::NAME)
            })
            .collect()
    }
}

/// Every step must declare at least one scope constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeMustBeBounded;

impl ScopeMustBeBounded {
    pub const NAME: &'static str = "scope-unbounded";
}

impl PlanCheck for ScopeMustBeBounded {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, plan: &Plan) -> Vec<Finding> {
        plan.steps
            .iter()
            .filter(|step| step.scope.constraints.is_unbounded())
            .map(|step| {
                Finding::block(format!(
                    "Step {}: unbounded scope is not permitted; no scope constraints are defined.",
                    step.step_id
                ))
                .for_step(step.step_id)
                .with_code(Self::NAME)
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
