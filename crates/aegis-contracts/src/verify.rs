//! Verification findings and report types.
//!
//! Verifier checks inspect a built plan and emit findings. A condition that
//! produces no finding passed; there is no explicit PASS finding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Needs human review but does not stop the plan.
    Warn,
    /// The plan must be refused.
    Block,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => f.write_str("warn"),
            Severity::Block => f.write_str("block"),
        }
    }
}

/// A single observation about one step, or about the plan as a whole when
/// `step_id` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub level: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<u32>,
    /// Machine-readable code naming the check, e.g. `"scope-unbounded"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Finding {
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Warn,
            message: message.into(),
            step_id: None,
            code: None,
        }
    }

    pub fn block(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Block,
            message: message.into(),
            step_id: None,
            code: None,
        }
    }

    pub fn for_step(mut self, step_id: u32) -> Self {
        self.step_id = Some(step_id);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// All findings from one verification run.
///
/// Ordered by check registration, then by step within each check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    pub fn has_blockers(&self) -> bool {
        self.findings.iter().any(|f| f.level == Severity::Block)
    }

    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.level == Severity::Warn)
    }

    /// Number of findings at the given severity.
    pub fn count(&self, level: Severity) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }

    /// Findings that reference `step_id`.
    pub fn for_step(&self, step_id: u32) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.step_id == Some(step_id))
    }
}
