//! The bundled outcome of mediating one intent.

use serde::{Deserialize, Serialize};

use crate::{
    intent::Intent,
    plan::{Plan, PlanAudit},
    refusal::RefusalDecision,
    verify::VerificationReport,
};

/// Everything one mediation produced, for inspection and rendering.
///
/// `plan`, `plan_audit` and `verification` are absent when planning failed;
/// `decision` is always present. Purely informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediationResult {
    pub intent: Intent,
    pub plan: Option<Plan>,
    pub plan_audit: Option<PlanAudit>,
    pub verification: Option<VerificationReport>,
    pub decision: RefusalDecision,
}
