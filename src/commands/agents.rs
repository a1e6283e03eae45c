//! Agent listing and telemetry

use colored::*;
use eyre::Result;
use serde::Serialize;

use super::render;
use crate::agent::{Agent, AgentStatus, Stats};
use crate::arena::Arena;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::realm::RealmId;

#[derive(Serialize)]
struct AgentSummary<'a> {
    id: &'a str,
    name: &'a str,
    realm: RealmId,
    status: AgentStatus,
    stats: Stats,
    jingjie_index: i32,
}

impl<'a> From<&'a Agent> for AgentSummary<'a> {
    fn from(agent: &'a Agent) -> Self {
        Self {
            id: &agent.id,
            name: &agent.name,
            realm: agent.current_realm,
            status: agent.status,
            stats: agent.stats,
            jingjie_index: agent.jingjie_index(),
        }
    }
}

pub fn list(format: OutputFormat, config: &Config) -> Result<()> {
    let arena = Arena::seeded(config.selection.reselect_policy);
    let summaries: Vec<AgentSummary> = arena.agents().map(AgentSummary::from).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&summaries)?),
        OutputFormat::Text => {
            println!("{}", "Agents:".bold());
            println!();
            for agent in arena.agents() {
                render::print_agent_line(agent);
            }
            println!();
            println!("  Inspect one with: {}", "jingjie agent <id>".cyan());
        }
    }

    Ok(())
}

pub fn show(id: &str, format: OutputFormat, config: &Config) -> Result<()> {
    let arena = Arena::seeded(config.selection.reselect_policy);
    let Some(agent) = arena.agent(id) else {
        let known: Vec<&str> = arena.agents().map(|a| a.id.as_str()).collect();
        eyre::bail!("Unknown agent '{}' (known: {})", id, known.join(", "));
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(agent)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(agent)?),
        OutputFormat::Text => render::print_agent(agent),
    }

    Ok(())
}
