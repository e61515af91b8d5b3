//! SAR Health Specialist CLI
//!
//! Drives a `HealthAgent` from the command line: raw JSON requests, live
//! interaction lookups, full field assessments, and LLM consultations.
//!
//! Usage:
//!   cargo run -p demo -- request '{"get_status": true}'
//!   cargo run -p demo -- interactions skyclarys
//!   cargo run -p demo -- assess --profile subject.json --environment site.json
//!   cargo run -p demo -- consult --profile subject.json --info "found near river"

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sar_agent::{AgentConfig, HealthAgent};
use sar_contracts::{
    environment::EnvironmentData,
    error::{HealthError, HealthResult},
    profile::PatientProfile,
    request::NO_OTHER_INFO,
};

const DEFAULT_CONFIG: &str = include_str!("../../config/health-agent.toml");

// ── CLI definition ────────────────────────────────────────────────────────────

/// SAR health specialist agent.
#[derive(Parser)]
#[command(
    name = "sar-health",
    about = "SAR health specialist agent",
    long_about = "Health assessments, drug interaction lookups, and mission status\n\
                  for search-and-rescue operations."
)]
struct Cli {
    /// Agent configuration file (TOML). The built-in defaults apply otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch one JSON request and print the JSON reply.
    Request {
        /// e.g. '{"get_status": true}'
        message: String,
    },
    /// Look up drug, food, and disease interactions for a drug.
    Interactions { drug: String },
    /// Run status, survival, resource, risk, and advice assessments.
    Assess {
        /// Patient profile as JSON.
        #[arg(long)]
        profile: PathBuf,
        /// Environment readings as JSON.
        #[arg(long)]
        environment: PathBuf,
    },
    /// Ask the language model about a patient profile.
    Consult {
        #[arg(long)]
        profile: PathBuf,
        /// Extra information for the model.
        #[arg(long, default_value = NO_OTHER_INFO)]
        info: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-page and per-request detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("sar-health: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> HealthResult<()> {
    let config = match &cli.config {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    debug!(
        agent = %config.agent.name,
        base_url = %config.scraper.base_url,
        custom = cli.config.is_some(),
        "configuration loaded"
    );
    let mut agent = HealthAgent::from_config(&config)?;

    let result = execute(&mut agent, cli.command);
    let closed = agent.close();
    result.and(closed)
}

fn execute(agent: &mut HealthAgent, command: Command) -> HealthResult<()> {
    match command {
        Command::Request { message } => {
            let message: serde_json::Value =
                serde_json::from_str(&message).map_err(|e| HealthError::InvalidRequest {
                    reason: format!("request is not valid JSON: {e}"),
                })?;
            print_json(&agent.process_request(&message))
        }
        Command::Interactions { drug } => print_json(&agent.get_all_interactions(&drug)?),
        Command::Assess {
            profile,
            environment,
        } => assess(agent, read_json(&profile)?, read_json(&environment)?),
        Command::Consult { profile, info } => {
            let profile: PatientProfile = read_json(&profile)?;
            let id = agent.assemble_health_profile(profile).profile.id;
            println!("{}", agent.consult_profile(&id, &info)?.response);
            Ok(())
        }
    }
}

// ── Assessment report ─────────────────────────────────────────────────────────

fn assess(
    agent: &mut HealthAgent,
    profile: PatientProfile,
    environment: EnvironmentData,
) -> HealthResult<()> {
    let profile = agent.assemble_health_profile(profile).profile;
    let status = agent.extrapolate_current_status(&profile);
    let medication = agent.analyze_medication(&profile.medications);
    let impact = agent.evaluate_environment(&environment, &profile);
    let survival = agent.estimate_survival_time(&profile, &environment);
    let resources = agent.plan_medical_resources(&profile, &status);
    let risks = agent.assess_health_risk(&profile, &environment);
    let advice = agent.generate_medical_advice(&profile, &environment, &survival);

    println!();
    println!("Health assessment: {}", profile.id);
    println!("=================================");
    println!("  Status            : {}", status.current_status);
    println!("  Health score      : {:.1}", status.health_score);
    println!("  Environment impact: {}", impact.environmental_impact);
    println!("  Survival estimate : {:.1} h", survival.estimated_survival_hours);
    println!();
    println!("Medication:");
    for line in &medication.medication_analysis {
        println!("  - {}", line);
    }
    println!("Resources:");
    for item in &resources.recommended_resources {
        println!("  - {}", item);
    }
    println!("Risks:");
    if risks.health_risks.is_empty() {
        println!("  (none identified)");
    }
    for risk in &risks.health_risks {
        println!("  - {}", risk);
    }
    println!();
    println!("Advice: {}", advice.medical_advice);
    println!();
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> HealthResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| HealthError::InvalidRequest {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| HealthError::InvalidRequest {
        reason: format!("'{}' is malformed: {}", path.display(), e),
    })
}

fn print_json<T: Serialize>(value: &T) -> HealthResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| HealthError::Serialization {
        reason: e.to_string(),
    })?;
    println!("{}", text);
    Ok(())
}
