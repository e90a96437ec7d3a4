//! The plan builder: step requests + policy snapshot → immutable `Plan`.
//!
//! Build algorithm:
//!
//! 1. Walk every request in order, assigning step ids 1..N. For each one:
//!    a. `action` must be non-empty and allow-listed by the policy snapshot.
//!    b. `risk` and `reversible` are copied from the policy entry. Requests
//!       have no way to supply them.
//!    c. `scope_token` must be non-empty; `max_bytes` must be >= 0.
//!    d. Optional flags default conservatively: confirmation required,
//!       dry-run supported.
//! 2. Keep going after a bad step so that every violation is collected.
//! 3. If anything was collected, fail with all of it.
//! 4. Assemble the plan, run `validate_plan` over it, and fail with its
//!    findings if it reports any. A partially built plan is never returned.

use serde_json::Value;
use tracing::{debug, warn};

use aegis_contracts::{
    error::{AegisError, AegisResult},
    plan::{Plan, PlanAudit, PlanId, PlanStep, ScopeSpec, StepRequest},
};

use crate::{
    request::decode_step_request,
    traits::{ActionPolicy, Clock, IdGenerator},
    validator::validate_plan,
};

/// A successfully built plan and its in-memory audit metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPlan {
    pub plan: Plan,
    pub audit: PlanAudit,
}

/// Builds plans against one policy snapshot.
///
/// The builder borrows its collaborators, so a single policy snapshot stays
/// fixed for the whole build.
pub struct PlanBuilder<'a> {
    policy: &'a dyn ActionPolicy,
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
    notes: Option<String>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(
        policy: &'a dyn ActionPolicy,
        ids: &'a dyn IdGenerator,
        clock: &'a dyn Clock,
    ) -> Self {
        Self { policy, ids, clock, notes: None }
    }

    /// Notes stamped on every plan this builder produces.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Build a plan from typed requests.
    ///
    /// # Errors
    ///
    /// `AegisError::PlanValidation` carrying every violation across every
    /// step, in step order.
    pub fn build(&self, requests: &[StepRequest], intent_id: &str) -> AegisResult<BuiltPlan> {
        debug!(intent_id, step_count = requests.len(), "building plan");

        let mut violations = Vec::new();
        let mut steps = Vec::with_capacity(requests.len());

        for (i, request) in requests.iter().enumerate() {
            match self.build_step(i + 1, request) {
                Ok(step) => steps.push(step),
                Err(errs) => violations.extend(errs),
            }
        }

        self.finish(steps, violations, intent_id)
    }

    /// Build a plan from raw JSON step requests, as captured on an intent.
    ///
    /// Decoding problems and policy violations are reported together.
    pub fn build_from_json(&self, raw: &[Value], intent_id: &str) -> AegisResult<BuiltPlan> {
        debug!(intent_id, step_count = raw.len(), "building plan from raw requests");

        let mut violations = Vec::new();
        let mut steps = Vec::with_capacity(raw.len());

        for (i, value) in raw.iter().enumerate() {
            let position = i + 1;
            let built = decode_step_request(position, value)
                .and_then(|request| self.build_step(position, &request));
            match built {
                Ok(step) => steps.push(step),
                Err(errs) => violations.extend(errs),
            }
        }

        self.finish(steps, violations, intent_id)
    }

    fn build_step(&self, position: usize, request: &StepRequest) -> Result<PlanStep, Vec<String>> {
        let mut errors = Vec::new();

        let action = request.action.trim();
        let entry = if action.is_empty() {
            errors.push(format!("Step {position}: action must be a non-empty string."));
            None
        } else {
            let entry = self.policy.lookup(&request.action);
            if entry.is_none() {
                errors.push(format!(
                    "Step {position}: action '{}' is not allowed by the action policy.",
                    request.action
                ));
            }
            entry
        };

        if request.scope_token.trim().is_empty() {
            errors.push(format!("Step {position}: scope_token must be a non-empty string."));
        }

        let constraints = request.constraints.clone().unwrap_or_default();
        if matches!(constraints.max_bytes, Some(n) if n < 0) {
            errors.push(format!(
                "Step {position}: constraints.max_bytes must be >= 0 when provided."
            ));
        }

        let step_id = match u32::try_from(position) {
            Ok(id) => id,
            Err(_) => {
                errors.push(format!("Step {position}: too many steps in one plan."));
                0
            }
        };

        let Some(entry) = entry else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PlanStep {
            step_id,
            action: request.action.clone(),
            args: request.args.clone(),
            scope: ScopeSpec {
                scope_token: request.scope_token.clone(),
                constraints,
            },
            risk: entry.risk,
            reversible: entry.reversible,
            requires_confirmation: request.requires_confirmation.unwrap_or(true),
            validators: request.validators.clone(),
            dry_run_supported: request.dry_run_supported.unwrap_or(true),
        })
    }

    fn finish(
        &self,
        steps: Vec<PlanStep>,
        violations: Vec<String>,
        intent_id: &str,
    ) -> AegisResult<BuiltPlan> {
        if !violations.is_empty() {
            warn!(intent_id, violation_count = violations.len(), "plan build rejected");
            return Err(AegisError::PlanValidation { violations });
        }

        let plan = Plan {
            plan_id: PlanId(self.ids.next_id()),
            steps,
            notes: self.notes.clone(),
        };

        // Re-check the assembled plan as a whole.
        let violations = validate_plan(&plan, self.policy);
        if !violations.is_empty() {
            warn!(
                intent_id,
                plan_id = %plan.plan_id.as_str(),
                violation_count = violations.len(),
                "assembled plan failed validation"
            );
            return Err(AegisError::PlanValidation { violations });
        }

        debug!(
            intent_id,
            plan_id = %plan.plan_id.as_str(),
            step_count = plan.steps.len(),
            "plan built"
        );

        Ok(BuiltPlan {
            audit: PlanAudit {
                created_at: self.clock.now(),
                derived_from_intent_id: intent_id.to_string(),
            },
            plan,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use aegis_contracts::{
        error::AegisError,
        plan::{ScopeConstraints, StepRequest},
        policy::RiskLevel,
    };

    use super::PlanBuilder;
    use crate::{
        test_support::fs_policy,
        traits::{FixedClock, SequentialIds},
    };

    fn bounded(path: &str) -> ScopeConstraints {
        ScopeConstraints {
            paths: vec![path.to_string()],
            ..Default::default()
        }
    }

    fn violations_of(err: AegisError) -> Vec<String> {
        match err {
            AegisError::PlanValidation { violations } => violations,
            other => panic!("expected PlanValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_step_ids_are_sequential_in_request_order() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let raw = vec![
            json!({ "step_id": 10, "action": "fs.read", "scope_token": "ws" }),
            json!({ "step_id": 10, "action": "fs.write", "scope_token": "ws" }),
            json!({ "step_id": 0, "action": "fs.delete", "scope_token": "ws" }),
        ];
        let built = builder.build_from_json(&raw, "intent-1").unwrap();

        let ids: Vec<u32> = built.plan.steps.iter().map(|s| s.step_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let actions: Vec<&str> = built.plan.steps.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(actions, vec!["fs.read", "fs.write", "fs.delete"]);
    }

    #[test]
    fn test_risk_and_reversible_come_from_policy_not_caller() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let raw = vec![json!({
            "action": "fs.delete",
            "scope_token": "ws",
            "risk": "Low",
            "reversible": true
        })];
        let built = builder.build_from_json(&raw, "intent-1").unwrap();

        let step = &built.plan.steps[0];
        assert_eq!(step.risk, RiskLevel::High);
        assert!(!step.reversible);
    }

    #[test]
    fn test_defaults_are_conservative() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let built = builder
            .build(&[StepRequest::new("fs.read", "ws")], "intent-1")
            .unwrap();
        let step = &built.plan.steps[0];
        assert!(step.requires_confirmation);
        assert!(step.dry_run_supported);
        assert!(step.validators.is_empty());
        assert!(step.args.is_empty());
        assert!(step.scope.constraints.is_unbounded());
    }

    #[test]
    fn test_plan_and_audit_use_injected_ports() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(at);
        let builder = PlanBuilder::new(&policy, &ids, &clock)
            .with_notes(Some("dry run only".to_string()));

        let request = StepRequest::new("fs.write", "ws")
            .with_constraints(bounded("/tmp"))
            .with_arg("mode", json!("0644"));
        let built = builder.build(&[request], "intent-9").unwrap();

        assert_eq!(built.plan.plan_id.as_str(), "plan-1");
        assert_eq!(built.plan.notes.as_deref(), Some("dry run only"));
        assert_eq!(built.audit.created_at, at);
        assert_eq!(built.audit.derived_from_intent_id, "intent-9");
        assert_eq!(built.plan.steps[0].args["mode"], "0644");

        // Each build draws a fresh id.
        let again = builder.build(&[StepRequest::new("fs.read", "ws")], "intent-9").unwrap();
        assert_eq!(again.plan.plan_id.as_str(), "plan-2");
    }

    #[test]
    fn test_unknown_action_names_the_action() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let err = builder
            .build(&[StepRequest::new("shell.exec", "ws")], "intent-1")
            .unwrap_err();
        let violations = violations_of(err);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("shell.exec"), "got: {}", violations[0]);
        assert!(violations[0].contains("not allowed"));
    }

    #[test]
    fn test_all_violations_across_all_steps_are_collected() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let requests = vec![
            StepRequest::new("shell.exec", "ws"),
            StepRequest::new("fs.read", ""),
            StepRequest::new("fs.write", "ws").with_constraints(ScopeConstraints {
                max_bytes: Some(-5),
                ..Default::default()
            }),
            StepRequest::new("", "ws"),
        ];
        let violations = violations_of(builder.build(&requests, "intent-1").unwrap_err());

        assert_eq!(violations.len(), 4, "got: {violations:?}");
        assert!(violations[0].starts_with("Step 1:"));
        assert!(violations[1].starts_with("Step 2:") && violations[1].contains("scope_token"));
        assert!(violations[2].starts_with("Step 3:") && violations[2].contains("max_bytes"));
        assert!(violations[3].starts_with("Step 4:") && violations[3].contains("action"));
    }

    #[test]
    fn test_decode_and_policy_violations_are_reported_together() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let raw = vec![
            json!({ "action": "fs.read", "scope_token": "ws", "requires_confirmation": "no" }),
            json!({ "action": "net.post", "scope_token": "ws" }),
        ];
        let violations = violations_of(builder.build_from_json(&raw, "intent-1").unwrap_err());
        assert_eq!(violations.len(), 2, "got: {violations:?}");
        assert!(violations[0].contains("requires_confirmation must be boolean"));
        assert!(violations[1].contains("net.post"));
    }

    #[test]
    fn test_failed_build_consumes_no_plan_id() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        assert!(builder.build(&[StepRequest::new("nope", "ws")], "i").is_err());
        let built = builder.build(&[StepRequest::new("fs.read", "ws")], "i").unwrap();
        assert_eq!(built.plan.plan_id.as_str(), "plan-1");
    }

    #[test]
    fn test_empty_request_list_is_rejected() {
        let policy = fs_policy();
        let ids = SequentialIds::new("plan");
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &ids, &clock);

        let violations = violations_of(builder.build(&[], "intent-1").unwrap_err());
        assert_eq!(violations, vec!["steps must contain at least one step.".to_string()]);
    }

    #[test]
    fn test_empty_plan_id_fails_final_validation() {
        struct BlankIds;
        impl crate::traits::IdGenerator for BlankIds {
            fn next_id(&self) -> String {
                String::new()
            }
        }

        let policy = fs_policy();
        let clock = FixedClock(Utc::now());
        let builder = PlanBuilder::new(&policy, &BlankIds, &clock);

        let violations =
            violations_of(builder.build(&[StepRequest::new("fs.read", "ws")], "i").unwrap_err());
        assert!(violations.iter().any(|v| v.contains("plan_id")), "got: {violations:?}");
    }
}
