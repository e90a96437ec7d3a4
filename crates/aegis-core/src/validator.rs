//! Structural and policy validation of a built plan.
//!
//! `validate_plan` is pure: it reads a plan and a policy snapshot and returns
//! every violation it finds. The builder runs it on each plan it assembles,
//! and callers holding a plan from elsewhere can run it again.
//!
//! Boolean flags, the risk enum and the validators list are enforced by the
//! plan's types; a raw request with the wrong JSON types is rejected earlier
//! by `request::decode_step_request`.

use std::collections::HashSet;

use aegis_contracts::plan::{Plan, PlanStep};

use crate::traits::ActionPolicy;

/// Check one step in isolation. Messages are prefixed with the step id.
pub fn validate_step(step: &PlanStep) -> Vec<String> {
    let mut errors = Vec::new();
    let prefix = format!("Step {}", step.step_id);

    if step.step_id < 1 {
        errors.push(format!("{prefix}: step_id must be >= 1."));
    }
    if step.action.trim().is_empty() {
        errors.push(format!("{prefix}: action must be a non-empty string."));
    }
    if step.scope.scope_token.trim().is_empty() {
        errors.push(format!("{prefix}: scope.scope_token must be a non-empty string."));
    }
    if matches!(step.scope.constraints.max_bytes, Some(n) if n < 0) {
        errors.push(format!(
            "{prefix}: scope.constraints.max_bytes must be >= 0 when provided."
        ));
    }

    errors
}

/// Check a whole plan against `policy`. An empty result means the plan is valid.
pub fn validate_plan(plan: &Plan, policy: &dyn ActionPolicy) -> Vec<String> {
    let mut errors = Vec::new();

    if plan.plan_id.as_str().trim().is_empty() {
        errors.push("plan_id must be a non-empty string.".to_string());
    }

    if plan.steps.is_empty() {
        errors.push("steps must contain at least one step.".to_string());
    }

    let mut seen = HashSet::new();
    if !plan.steps.iter().all(|s| seen.insert(s.step_id)) {
        errors.push("step_id values must be unique within a plan.".to_string());
    }
    if plan.steps.iter().any(|s| s.step_id < 1) {
        errors.push("step_id values must be >= 1.".to_string());
    }

    for step in &plan.steps {
        match policy.lookup(&step.action) {
            None => errors.push(format!(
                "Step {}: action '{}' is not present in the action policy.",
                step.step_id, step.action
            )),
            Some(entry) if entry.risk != step.risk || entry.reversible != step.reversible => {
                errors.push(format!(
                    "Step {}: risk/reversible for action '{}' do not match the action policy.",
                    step.step_id, step.action
                ))
            }
            Some(_) => {}
        }
    }

    for step in &plan.steps {
        errors.extend(validate_step(step));
    }

    errors
}

// ── Tests ─────────────────────────────────────────────────────────────────────
