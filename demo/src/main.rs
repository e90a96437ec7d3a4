//! Aegis mediation pipeline demo CLI.
//!
//! Runs canned scenarios, or mediates a step-request file against a policy
//! file. Nothing is ever executed: the output is the decision only.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- scenario unconfirmed-delete
//!   cargo run -p demo -- mediate --policy demo/policies/desktop.toml \
//!       --steps demo/requests/cleanup.json --config demo/aegis.toml

mod scenarios;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use aegis_contracts::error::{AegisError, AegisResult};
use aegis_core::{IntentFactory, IntentOptions, Mediator, MediatorConfig};
use aegis_core::traits::{SystemClock, UuidGenerator};
use aegis_policy::PolicyIndex;
use aegis_verify::VerifierPipeline;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Aegis: non-executing plan mediation.
///
/// Builds a plan from requested steps, verifies it against the allow-listed
/// action policy and prints PASS, WARN or REFUSE.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Aegis mediation pipeline demo",
    long_about = "Turns requested steps into a verified plan and a PASS / WARN / REFUSE\n\
                  decision. No step is ever executed."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every canned scenario in sequence.
    RunAll,
    /// Run one canned scenario by name.
    Scenario {
        /// bounded-cleanup, unconfirmed-delete, unbounded-scope or unknown-action.
        name: String,
    },
    /// Mediate a JSON list of step requests against a policy file.
    Mediate {
        /// Policy document (`.toml`, otherwise JSON).
        #[arg(long)]
        policy: PathBuf,
        /// JSON file holding a list of step requests.
        #[arg(long)]
        steps: PathBuf,
        /// Optional TOML file with mediator settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Free-text goal recorded on the intent.
        #[arg(long, default_value = "mediate requested steps")]
        goal: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see every pipeline stage.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Scenario { name } => run_named(&name),
        Command::Mediate { policy, steps, config, goal } => {
            mediate(&policy, &steps, config.as_deref(), goal)
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> AegisResult<()> {
    print_banner();
    let policy = PolicyIndex::from_toml_str(scenarios::DESKTOP_POLICY)?;

    let mut unexpected = 0;
    for scenario in scenarios::all() {
        if !scenarios::run(&scenario, &policy)? {
            unexpected += 1;
        }
    }

    if unexpected == 0 {
        println!("All scenarios produced their expected decisions.");
    } else {
        println!("{} scenario(s) produced an unexpected decision.", unexpected);
    }
    Ok(())
}

fn run_named(name: &str) -> AegisResult<()> {
    let scenario = scenarios::find(name).ok_or_else(|| AegisError::ConfigError {
        reason: format!("unknown scenario '{name}'"),
    })?;
    let policy = PolicyIndex::from_toml_str(scenarios::DESKTOP_POLICY)?;
    scenarios::run(&scenario, &policy)?;
    Ok(())
}

// ── File-driven mediation ─────────────────────────────────────────────────────

fn mediate(
    policy_path: &Path,
    steps_path: &Path,
    config_path: Option<&Path>,
    goal: String,
) -> AegisResult<()> {
    let policy = PolicyIndex::from_file(policy_path)?;
    let steps = parse_steps(&read_file(steps_path)?)?;
    let config = match config_path {
        Some(path) => load_config(&read_file(path)?)?,
        None => MediatorConfig::default(),
    };

    let ids = UuidGenerator;
    let clock = SystemClock;
    let intent = IntentFactory::new(&ids, &clock).create(
        goal.clone(),
        goal,
        Vec::new(),
        steps,
        IntentOptions::default(),
    );

    let mediator = Mediator::with_ports(
        Box::new(VerifierPipeline::standard()),
        Box::new(UuidGenerator),
        Box::new(SystemClock),
        config,
    );
    let result = mediator.mediate(intent, &policy);

    let rendered = serde_json::to_string_pretty(&result).map_err(|e| AegisError::ConfigError {
        reason: format!("failed to render mediation result: {e}"),
    })?;
    println!("{rendered}");
    Ok(())
}

fn read_file(path: &Path) -> AegisResult<String> {
    std::fs::read_to_string(path).map_err(|e| AegisError::ConfigError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })
}

/// Parse a JSON list of raw step requests. Each element is decoded and
/// validated later by the plan builder.
pub(crate) fn parse_steps(s: &str) -> AegisResult<Vec<Value>> {
    serde_json::from_str(s).map_err(|e| AegisError::ConfigError {
        reason: format!("step requests must be a JSON list: {e}"),
    })
}

fn load_config(s: &str) -> AegisResult<MediatorConfig> {
    toml::from_str(s).map_err(|e| AegisError::ConfigError {
        reason: format!("failed to parse mediator config: {e}"),
    })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Aegis: Non-executing Plan Mediation");
    println!("===================================");
    println!();
    println!("Pipeline per request:");
    println!("  [1] Plan builder: every action must be allow-listed; risk comes from policy");
    println!("  [2] Verifier: confirmation-for-risk (WARN), bounded scope (BLOCK)");
    println!("  [3] Aggregator: any BLOCK → REFUSE, any WARN → WARN, else PASS");
    println!();
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_steps};
    use aegis_contracts::error::AegisError;

    #[test]
    fn test_config_file_overrides_notes() {
        let config = load_config(r#"notes = "nightly batch""#).unwrap();
        assert_eq!(config.notes.as_deref(), Some("nightly batch"));
    }

    #[test]
    fn test_empty_config_keeps_default_notes() {
        let config = load_config("").unwrap();
        assert_eq!(config.notes.as_deref(), Some("Generated via mediation pipeline"));
    }

    #[test]
    fn test_non_list_steps_file_is_a_config_error() {
        match parse_steps(r#"{"action":"fs.read"}"#) {
            Err(AegisError::ConfigError { reason }) => assert!(reason.contains("JSON list")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
