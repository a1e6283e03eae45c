//! One-shot experiment run

use colored::*;
use eyre::{Result, eyre};
use serde::Serialize;

use super::render;
use crate::agent::Agent;
use crate::arena::Arena;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::console::{ExperimentConsole, ExperimentLog, LogId, Preset, Scenario};
use crate::narrative::NarrativeAdapter;

#[derive(Serialize)]
struct ExperimentReport<'a> {
    log: &'a ExperimentLog,
    agent: &'a Agent,
}

pub fn scenario_from_args(preset: Option<Preset>, scenario: Option<String>) -> Result<Scenario> {
    match (preset, scenario) {
        (Some(preset), _) => Ok(Scenario::Preset(preset)),
        (None, Some(text)) => Ok(Scenario::custom(text)),
        (None, None) => Err(eyre!("Either a scenario or --preset is required")),
    }
}

/// Select `agent_id` and run one experiment to completion
async fn execute(
    arena: &mut Arena,
    console: &mut ExperimentConsole,
    narrator: &NarrativeAdapter,
    agent_id: &str,
    scenario: &Scenario,
) -> Result<LogId> {
    if arena.agent(agent_id).is_none() {
        eyre::bail!("Unknown agent '{}'", agent_id);
    }
    arena.select_agent(agent_id);
    console
        .run_experiment(arena, narrator, scenario)
        .await
        .map_err(|rejection| eyre!("Experiment rejected: {}", rejection))
}

pub async fn run(
    agent_id: &str,
    preset: Option<Preset>,
    scenario: Option<String>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let scenario = scenario_from_args(preset, scenario)?;
    let mut arena = Arena::seeded(config.selection.reselect_policy);
    let mut console = ExperimentConsole::new();

    let narrator = NarrativeAdapter::from_config(&config.narrative);
    if !narrator.has_credentials() {
        log::warn!("No API key found in ${}", config.narrative.api_key_env);
    }

    if format == OutputFormat::Text {
        println!("{} Running experiment on {}...", "→".blue(), agent_id.bold());
    }
    let log_id = execute(&mut arena, &mut console, &narrator, agent_id, &scenario).await?;

    let entry = console
        .log(&log_id)
        .ok_or_else(|| eyre!("Experiment log entry {} missing", log_id))?;
    let agent = arena
        .agent(agent_id)
        .ok_or_else(|| eyre!("Agent '{}' vanished", agent_id))?;

    let report = ExperimentReport { log: entry, agent };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Text => {
            println!();
            render::print_log_entry(entry);
            println!();
            println!("{}", "Telemetry after run:".bold());
            render::print_stats(&agent.stats, 2);
            println!("  {} {}", "Jingjie index:".bold(), agent.jingjie_index().to_string().magenta());
        }
    }

    Ok(())
}
