//! Refusal decision types.
//!
//! A `RefusalDecision` is advisory. It says whether a plan may later be
//! allowed to proceed; it never approves or triggers anything itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::verify::{Finding, Severity};

/// The tri-state outcome of aggregating a verification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionKind {
    Pass,
    Warn,
    Refuse,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionKind::Pass => f.write_str("PASS"),
            DecisionKind::Warn => f.write_str("WARN"),
            DecisionKind::Refuse => f.write_str("REFUSE"),
        }
    }
}

/// A finding re-exposed as part of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalReason {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&Finding> for RefusalReason {
    fn from(finding: &Finding) -> Self {
        Self {
            severity: finding.level,
            message: finding.message.clone(),
            step_id: finding.step_id,
            code: finding.code.clone(),
        }
    }
}

/// The advisory decision for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalDecision {
    pub decision: DecisionKind,
    /// Every finding, in report order, whatever the decision.
    pub reasons: Vec<RefusalReason>,
    /// One-line human summary.
    pub summary: String,
}

impl RefusalDecision {
    pub const REFUSE_SUMMARY: &'static str =
        "Plan refused due to blocking verification findings.";
    pub const WARN_SUMMARY: &'static str =
        "Plan may proceed with warnings requiring human review.";
    pub const PASS_SUMMARY: &'static str =
        "Plan passed verification with no blocking findings.";
    pub const PLANNING_FAILED_SUMMARY: &'static str =
        "Plan refused because the request could not be planned.";

    pub fn is_refusal(&self) -> bool {
        self.decision == DecisionKind::Refuse
    }
}
