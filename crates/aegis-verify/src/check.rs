//! The `PlanCheck` trait and closure-backed checks.

use aegis_contracts::{plan::Plan, verify::Finding};

/// One independent, pure check over a built plan.
///
/// A check returns zero or more findings; returning none means every
/// condition it examines passed. A check must not fail: when it cannot
/// evaluate a condition it reports that as a WARN or BLOCK finding.
pub trait PlanCheck: Send + Sync {
    /// Stable name, used as the default finding code and in logs.
    fn name(&self) -> &str;

    /// Inspect `plan`, returning findings in step order.
    fn check(&self, plan: &Plan) -> Vec<Finding>;
}

/// A caller-supplied check function.
pub type CheckFn = Box<dyn Fn(&Plan) -> Vec<Finding> + Send + Sync>;

/// Adapts a closure into a `PlanCheck`.
pub struct FnCheck {
    name: String,
    f: CheckFn,
}

impl FnCheck {
    pub fn new(name: impl Into<String>, f: CheckFn) -> Self {
        Self { name: name.into(), f }
    }
}

impl PlanCheck for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, plan: &Plan) -> Vec<Finding> {
        (self.f)(plan)
    }
}
