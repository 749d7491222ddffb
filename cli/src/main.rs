//! gtaf: command-line front end for the GTAF runtime gate.
//!
//! Usage:
//!   gtaf evaluate --drc drc.json --context context.json --artifacts artifacts.json
//!   gtaf validate --drc drc.json --context context.json --artifacts artifacts.json
//!   gtaf fixtures
//!
//! Exit codes: `evaluate` exits 0 on EXECUTE and 2 on DENY. `validate` and
//! `fixtures` exit 1 if anything failed. Any tool error (unreadable input,
//! bad config) exits 1.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gtaf_audit::InMemoryDecisionLog;
use gtaf_config::GateConfig;
use gtaf_contracts::{
    artifact::ArtifactPool,
    context::RuntimeContext,
    error::{GtafError, GtafResult},
    result::EnforcementResult,
    validation::{ContractKind, ValidationReport},
};
use gtaf_core::{temporal::parse_timestamp, AuditedEnforcer, Enforcer, Gate};
use gtaf_schema::{fixture::SCHEMA_INVALID_CASES, ContractSchemas};

const EXIT_FAILURE: i32 = 1;
const EXIT_DENY: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

/// GTAF runtime gate: decide EXECUTE or DENY for a DRC-bound action.
#[derive(Parser)]
#[command(
    name = "gtaf",
    about = "GTAF runtime enforcement gate",
    long_about = "Evaluates decision record contracts against a runtime context and an\n\
                  artifact pool, validates contract documents, and runs the projection\n\
                  fixture matrix."
)]
struct Cli {
    /// Gate configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one DRC and print the enforcement result as JSON.
    Evaluate {
        #[arg(long)]
        drc: PathBuf,
        #[arg(long)]
        context: PathBuf,
        #[arg(long)]
        artifacts: PathBuf,
        /// Evaluation instant (ISO-8601 with offset). Defaults to now.
        #[arg(long)]
        now: Option<String>,
        /// Record the decision in a hash-chained log and report its head.
        #[arg(long)]
        audit: bool,
    },
    /// Validate contract documents against the shipped JSON Schemas.
    Validate {
        #[arg(long)]
        drc: PathBuf,
        #[arg(long)]
        context: Option<PathBuf>,
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },
    /// Run the projection fixture matrix through the gate and the validator.
    Fixtures {
        /// Fixture root. Defaults to the tree shipped with the workspace.
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(GateConfig::from_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("gtaf: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    // RUST_LOG wins, then the config file, then "warn".
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.logging.filter.as_deref().unwrap_or("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = match cli.command {
        Command::Evaluate {
            drc,
            context,
            artifacts,
            now,
            audit,
        } => run_evaluate(&config, &drc, &context, &artifacts, now.as_deref(), audit),
        Command::Validate {
            drc,
            context,
            artifacts,
        } => run_validate(&drc, context.as_deref(), artifacts.as_deref()),
        Command::Fixtures { root } => run_fixtures(&config, root),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("gtaf: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

// ── evaluate ──────────────────────────────────────────────────────────────────

fn run_evaluate(
    config: &GateConfig,
    drc_path: &Path,
    context_path: &Path,
    artifacts_path: &Path,
    now: Option<&str>,
    audit: bool,
) -> GtafResult<i32> {
    let drc = read_json(drc_path)?;
    let context = RuntimeContext::from_value(&read_json(context_path)?);
    let pool = read_pool(artifacts_path)?;
    let now = resolve_now(now)?;

    let result = if audit {
        let gate_id = "gtaf-cli";
        let log = InMemoryDecisionLog::new(gate_id);
        let gate = AuditedEnforcer::new(gate_id, config.enforcer(), Box::new(log.clone()));
        let result = gate.enforce(&drc, &context, &pool, now);
        gate.close()?;

        let exported = log.export_log();
        info!(events = exported.events.len(), intact = log.verify_integrity(), "decision log closed");
        eprintln!("audit: {} event(s), terminal hash {}", exported.events.len(), exported.terminal_hash);
        result
    } else {
        config.enforcer().evaluate_at(&drc, &context, &pool, now)
    };

    print_json(&result)?;
    Ok(if result.is_execute() { 0 } else { EXIT_DENY })
}

fn resolve_now(raw: Option<&str>) -> GtafResult<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => parse_timestamp(raw).ok_or_else(|| GtafError::Input {
            path: "--now".to_string(),
            reason: format!("{raw:?} is not an ISO-8601 timestamp with an offset"),
        }),
    }
}

// ── validate ──────────────────────────────────────────────────────────────────

fn run_validate(drc_path: &Path, context_path: Option<&Path>, artifacts_path: Option<&Path>) -> GtafResult<i32> {
    let schemas = ContractSchemas::new()?;
    let drc = read_json(drc_path)?;

    let mut report = schemas.validate_at(ContractKind::Drc, &drc, "$.drc");
    if let Some(path) = context_path {
        report.merge(schemas.validate_at(ContractKind::RuntimeContext, &read_json(path)?, "$.context"));
    }
    if let Some(path) = artifacts_path {
        report.merge(schemas.validate_artifacts(&drc, &read_pool(path)?));
    }

    print_report(&report);
    Ok(if report.passed { 0 } else { EXIT_FAILURE })
}

fn print_report(report: &ValidationReport) {
    if report.passed {
        println!("valid");
        return;
    }
    for failure in &report.failures {
        println!("{}", failure);
    }
    println!("{} failure(s)", report.failures.len());
}

// ── fixtures ──────────────────────────────────────────────────────────────────

fn run_fixtures(config: &GateConfig, root: Option<PathBuf>) -> GtafResult<i32> {
    let root = root.unwrap_or_else(gtaf_schema::default_root);
    debug!(root = %root.display(), "running fixture matrix");

    let gate: Enforcer = config.into();
    let schemas = ContractSchemas::new()?;
    let mut mismatches = 0usize;

    for case in gtaf_schema::load_all(&root)? {
        let result = case.evaluate(&gate)?;
        let report = schemas.validate_bundle(&case.drc, &case.context, &case.artifacts);
        let schema_ok = report.passed != SCHEMA_INVALID_CASES.contains(&case.name.as_str());
        let gate_ok = case.matches(&result);

        let status = if gate_ok && schema_ok { "PASS" } else { "FAIL" };
        if status == "FAIL" {
            mismatches += 1;
        }
        println!(
            "{status}  {:<28} {:<7} {:<26} schema={}",
            case.name,
            result.outcome,
            result.reason_code,
            if report.passed { "valid" } else { "invalid" }
        );
        if !gate_ok {
            println!(
                "      expected {} / {}",
                case.expected.outcome, case.expected.reason_code
            );
        }
    }

    if mismatches > 0 {
        println!("{mismatches} case(s) failed");
        return Ok(EXIT_FAILURE);
    }
    println!("all cases passed");
    Ok(0)
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

fn read_json(path: &Path) -> GtafResult<Value> {
    let input_error = |reason: String| GtafError::Input {
        path: path.display().to_string(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| input_error(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| input_error(e.to_string()))
}

fn read_pool(path: &Path) -> GtafResult<ArtifactPool> {
    serde_json::from_value(read_json(path)?).map_err(|e| GtafError::Input {
        path: path.display().to_string(),
        reason: format!("artifacts must be an object of id -> artifact: {}", e),
    })
}

fn print_json(result: &EnforcementResult) -> GtafResult<()> {
    let rendered = serde_json::to_string_pretty(result).map_err(|e| GtafError::Input {
        path: "<stdout>".to_string(),
        reason: e.to_string(),
    })?;
    println!("{}", rendered);
    Ok(())
}
