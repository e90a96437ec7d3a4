//! Canned mediation scenarios.
//!
//! Each scenario mediates one intent against the desktop policy and prints
//! the outcome. None of them executes anything: the pipeline only decides
//! whether a plan may proceed.

use serde_json::{json, Value};

use aegis_contracts::{
    error::AegisResult,
    mediation::MediationResult,
    refusal::DecisionKind,
    verify::Severity,
};
use aegis_core::{IntentFactory, IntentOptions, Mediator};
use aegis_core::traits::{SystemClock, UuidGenerator};
use aegis_policy::PolicyIndex;
use aegis_verify::VerifierPipeline;

/// Desktop assistant policy, shared by every scenario.
pub const DESKTOP_POLICY: &str = include_str!("../policies/desktop.toml");

const CLEANUP_REQUEST: &str = include_str!("../requests/cleanup.json");

/// A named scenario: its intent text, its step requests and the decision it
/// should produce.
pub struct Scenario {
    pub name: &'static str,
    pub title: &'static str,
    pub goal: &'static str,
    pub expected: DecisionKind,
    steps: fn() -> AegisResult<Vec<Value>>,
}

pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "bounded-cleanup",
            title: "Bounded, confirmed cleanup",
            goal: "remove temporary files from the scratch folder",
            expected: DecisionKind::Pass,
            steps: || crate::parse_steps(CLEANUP_REQUEST),
        },
        Scenario {
            name: "unconfirmed-delete",
            title: "High risk delete without confirmation",
            goal: "remove temporary files from the scratch folder",
            expected: DecisionKind::Warn,
            steps: || {
                Ok(vec![json!({
                    "action": "fs.delete",
                    "scope_token": "workspace",
                    "constraints": { "paths": ["/tmp"] },
                    "requires_confirmation": false
                })])
            },
        },
        Scenario {
            name: "unbounded-scope",
            title: "Upload with no scope constraints",
            goal: "send the report to the team",
            expected: DecisionKind::Refuse,
            steps: || {
                Ok(vec![json!({
                    "action": "http.post",
                    "args": { "body": "report.pdf" },
                    "scope_token": "network"
                })])
            },
        },
        Scenario {
            name: "unknown-action",
            title: "Action missing from the allow-list",
            goal: "clean up the machine",
            expected: DecisionKind::Refuse,
            steps: || {
                Ok(vec![json!({
                    "action": "shell.exec",
                    "args": { "command": "rm -rf ~/scratch" },
                    "scope_token": "workspace",
                    "constraints": { "paths": ["/home/user/scratch"] }
                })])
            },
        },
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

// ── Scenario runner ───────────────────────────────────────────────────────────

/// Mediate `scenario` and print the outcome. Returns whether the decision
/// matched the expected one.
pub fn run(scenario: &Scenario, policy: &PolicyIndex) -> AegisResult<bool> {
    println!("=== Scenario: {} ===", scenario.title);
    println!();

    let ids = UuidGenerator;
    let clock = SystemClock;
    let intent = IntentFactory::new(&ids, &clock).create(
        scenario.goal,
        scenario.goal,
        vec!["workspace".to_string()],
        (scenario.steps)()?,
        IntentOptions {
            source: Some("demo".to_string()),
            ..IntentOptions::default()
        },
    );

    let mediator = Mediator::new(Box::new(VerifierPipeline::standard()));
    let result = mediator.mediate(intent, policy);

    print_result(&result);

    let matched = result.decision.decision == scenario.expected;
    if matched {
        println!("  RESULT: {} (expected)", result.decision.decision);
    } else {
        println!(
            "  RESULT: {} (UNEXPECTED, wanted {})",
            result.decision.decision, scenario.expected
        );
    }
    println!();
    Ok(matched)
}

pub fn print_result(result: &MediationResult) {
    match &result.plan {
        Some(plan) => {
            println!("  Plan id:                {}", plan.plan_id.as_str());
            for step in &plan.steps {
                println!(
                    "    step {}: {:<12} risk={:<6} reversible={:<5} confirm={}",
                    step.step_id,
                    step.action,
                    step.risk.as_str(),
                    step.reversible,
                    step.requires_confirmation
                );
            }
        }
        None => println!("  Plan:                   not built"),
    }

    if let Some(report) = &result.verification {
        println!(
            "  Verification:           {} warning(s), {} blocker(s)",
            report.count(Severity::Warn),
            report.count(Severity::Block)
        );
    }

    println!("  Decision:               {}", result.decision.decision);
    println!("  Summary:                {}", result.decision.summary);
    for reason in &result.decision.reasons {
        let step = match (reason.step_id, result.plan.as_ref()) {
            (Some(id), Some(plan)) => match plan.step(id) {
                Some(step) => format!("step {id} ({})", step.action),
                None => format!("step {id}"),
            },
            (Some(id), None) => format!("step {id}"),
            (None, _) => "plan".to_string(),
        };
        println!("    [{}] {}: {}", reason.severity, step, reason.message);
    }
}
