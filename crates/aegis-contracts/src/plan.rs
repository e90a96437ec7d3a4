//! Step requests and the plans built from them.
//!
//! A `StepRequest` is what a requester asks for. A `PlanStep` is what the
//! builder produces after consulting the policy index: same action, args and
//! scope, but with `risk` and `reversible` copied from the allow-list entry.
//! A `Plan` is hypothetical. Nothing in Aegis ever carries one out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::policy::RiskLevel;

/// Unique identifier for one built plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

impl PlanId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The bounding description of what a step may touch.
///
/// A step whose constraints are all empty is unbounded and is blocked by
/// verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConstraints {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    /// Upper bound on bytes touched. Must be >= 0 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<i64>,
}

impl ScopeConstraints {
    /// True when no list has an entry and no byte limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.paths.is_empty()
            && self.domains.is_empty()
            && self.apps.is_empty()
            && self.methods.is_empty()
            && self.max_bytes.is_none()
    }
}

/// A scope token plus the constraints that bound it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpec {
    pub scope_token: String,
    #[serde(default)]
    pub constraints: ScopeConstraints,
}

/// One step as requested by the caller, before policy is applied.
///
/// Has no `risk`, `reversible` or `step_id` field. The builder assigns all
/// three and ignores any value the caller sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    pub action: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    pub scope_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ScopeConstraints>,
    /// Defaults to `true` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_confirmation: Option<bool>,
    #[serde(default)]
    pub validators: Vec<String>,
    /// Defaults to `true` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run_supported: Option<bool>,
}

impl StepRequest {
    /// A request with no args, no constraints and every optional flag left
    /// at its default.
    pub fn new(action: impl Into<String>, scope_token: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Map::new(),
            scope_token: scope_token.into(),
            constraints: None,
            requires_confirmation: None,
            validators: Vec::new(),
            dry_run_supported: None,
        }
    }

    pub fn with_constraints(mut self, constraints: ScopeConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_confirmation(mut self, requires_confirmation: bool) -> Self {
        self.requires_confirmation = Some(requires_confirmation);
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// One hypothetical step of a built plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Position in the plan, assigned 1..N in request order.
    pub step_id: u32,
    pub action: String,
    pub args: Map<String, Value>,
    pub scope: ScopeSpec,
    /// Copied from the policy entry for `action`.
    pub risk: RiskLevel,
    /// Copied from the policy entry for `action`.
    pub reversible: bool,
    pub requires_confirmation: bool,
    pub validators: Vec<String>,
    pub dry_run_supported: bool,
}

/// An immutable, validated sequence of hypothetical steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: PlanId,
    pub steps: Vec<PlanStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Plan {
    /// Look up a step by its id.
    pub fn step(&self, step_id: u32) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}

/// In-memory traceability metadata produced alongside every plan.
///
/// Not part of the plan itself and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAudit {
    pub created_at: DateTime<Utc>,
    pub derived_from_intent_id: String,
}
