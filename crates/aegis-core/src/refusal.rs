//! The refusal aggregator: verification report → advisory decision.
//!
//! Reduction rules:
//!
//! - any BLOCK finding → REFUSE
//! - otherwise any WARN finding → WARN
//! - otherwise → PASS
//!
//! The outcome depends only on which severities are present. Every finding is
//! carried through as a reason, in report order, whatever the outcome.

use tracing::info;

use aegis_contracts::{
    refusal::{DecisionKind, RefusalDecision, RefusalReason},
    verify::{Finding, Severity, VerificationReport},
};

/// Reason code attached to a refusal synthesized from a planning failure.
pub const PLAN_BUILD_FAILED: &str = "plan-build-failed";

/// Reduce `report` to a decision. Total and deterministic.
pub fn aggregate(report: &VerificationReport) -> RefusalDecision {
    let mut has_block = false;
    let mut has_warn = false;

    let reasons: Vec<RefusalReason> = report
        .findings
        .iter()
        .inspect(|finding| match finding.level {
            Severity::Block => has_block = true,
            Severity::Warn => has_warn = true,
        })
        .map(RefusalReason::from)
        .collect();

    let (decision, summary) = if has_block {
        (DecisionKind::Refuse, RefusalDecision::REFUSE_SUMMARY)
    } else if has_warn {
        (DecisionKind::Warn, RefusalDecision::WARN_SUMMARY)
    } else {
        (DecisionKind::Pass, RefusalDecision::PASS_SUMMARY)
    };

    info!(
        %decision,
        reason_count = reasons.len(),
        "refusal decision reached"
    );

    RefusalDecision {
        decision,
        reasons,
        summary: summary.to_string(),
    }
}

/// A REFUSE decision for a plan that could not be built.
///
/// The single reason carries `message` verbatim.
pub fn refuse_planning_failure(message: impl Into<String>) -> RefusalDecision {
    let finding = Finding::block(message).with_code(PLAN_BUILD_FAILED);
    RefusalDecision {
        decision: DecisionKind::Refuse,
        reasons: vec![RefusalReason::from(&finding)],
        summary: RefusalDecision::PLANNING_FAILED_SUMMARY.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use aegis_contracts::{
        refusal::{DecisionKind, RefusalDecision},
        verify::{Finding, Severity, VerificationReport},
    };

    use super::{aggregate, refuse_planning_failure, PLAN_BUILD_FAILED};

    fn report(findings: Vec<Finding>) -> VerificationReport {
        VerificationReport { findings }
    }

    #[test]
    fn test_empty_report_passes() {
        let decision = aggregate(&report(vec![]));
        assert_eq!(decision.decision, DecisionKind::Pass);
        assert_eq!(decision.summary, RefusalDecision::PASS_SUMMARY);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_warnings_only_warn() {
        for n in 1..=3 {
            let findings = (1..=n).map(|i| Finding::warn(format!("w{i}")).for_step(i)).collect();
            let decision = aggregate(&report(findings));
            assert_eq!(decision.decision, DecisionKind::Warn, "with {n} warnings");
            assert_eq!(decision.summary, RefusalDecision::WARN_SUMMARY);
            assert_eq!(decision.reasons.len(), n as usize);
        }
    }

    #[test]
    fn test_any_block_refuses_regardless_of_warn_count() {
        for warns in 0..3 {
            let mut findings: Vec<Finding> =
                (0..warns).map(|i| Finding::warn(format!("w{i}"))).collect();
            findings.push(Finding::block("b").for_step(1));
            let decision = aggregate(&report(findings));
            assert_eq!(decision.decision, DecisionKind::Refuse, "with {warns} warnings");
            assert_eq!(decision.summary, RefusalDecision::REFUSE_SUMMARY);
        }
    }

    #[test]
    fn test_outcome_is_order_independent_but_reasons_keep_report_order() {
        let a = report(vec![Finding::block("b").for_step(2), Finding::warn("w").for_step(1)]);
        let b = report(vec![Finding::warn("w").for_step(1), Finding::block("b").for_step(2)]);

        let da = aggregate(&a);
        let db = aggregate(&b);
        assert_eq!(da.decision, db.decision);

        assert_eq!(da.reasons[0].severity, Severity::Block);
        assert_eq!(da.reasons[1].severity, Severity::Warn);
        assert_eq!(db.reasons[0].severity, Severity::Warn);
        assert_eq!(db.reasons[1].severity, Severity::Block);
    }

    #[test]
    fn test_warnings_stay_visible_under_refuse() {
        let decision = aggregate(&report(vec![
            Finding::warn("needs confirmation").for_step(1),
            Finding::block("unbounded").for_step(2),
        ]));
        assert_eq!(decision.decision, DecisionKind::Refuse);
        assert!(decision
            .reasons
            .iter()
            .any(|r| r.severity == Severity::Warn && r.message == "needs confirmation"));
    }

    #[test]
    fn test_reasons_reexpose_finding_fields_verbatim() {
        let finding = Finding::warn("msg").for_step(7).with_code("confirmation-required");
        let decision = aggregate(&report(vec![finding.clone()]));
        let reason = &decision.reasons[0];
        assert_eq!(reason.severity, finding.level);
        assert_eq!(reason.message, finding.message);
        assert_eq!(reason.step_id, Some(7));
        assert_eq!(reason.code.as_deref(), Some("confirmation-required"));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let r = report(vec![Finding::warn("w").for_step(1), Finding::block("b")]);
        assert_eq!(aggregate(&r), aggregate(&r));
    }

    #[test]
    fn test_planning_failure_refuses_with_one_reason() {
        let decision = refuse_planning_failure("Step 1: action 'rm' is not allowed");
        assert_eq!(decision.decision, DecisionKind::Refuse);
        assert_eq!(decision.reasons.len(), 1);
        assert_eq!(decision.reasons[0].severity, Severity::Block);
        assert_eq!(decision.reasons[0].message, "Step 1: action 'rm' is not allowed");
        assert_eq!(decision.reasons[0].code.as_deref(), Some(PLAN_BUILD_FAILED));
        assert!(decision.reasons[0].step_id.is_none());
    }
}
