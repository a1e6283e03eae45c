//! One-shot traversal

use colored::*;
use eyre::{Result, eyre};
use serde::Serialize;

use super::render;
use crate::agent::Agent;
use crate::arena::TraversalRecord;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::realm::RealmId;
use crate::session::{Gesture, Session, Update};

#[derive(Serialize)]
struct TraversalReport<'a> {
    record: &'a TraversalRecord,
    agent: &'a Agent,
}

pub async fn run(agent_id: &str, realm: RealmId, format: OutputFormat, config: &Config) -> Result<()> {
    let mut session = Session::from_config(config);
    let current = session
        .arena()
        .agent(agent_id)
        .map(|a| a.current_realm)
        .ok_or_else(|| eyre!("Unknown agent '{}'", agent_id))?;

    if current == realm {
        eyre::bail!("{} is already in {}", agent_id, realm);
    }

    session.handle(Gesture::SelectAgent(agent_id.to_string()));
    if session.handle(Gesture::InitTraversal) != Update::TargetSelection {
        eyre::bail!("{} cannot traverse right now", agent_id);
    }

    let record_id = match session.handle(Gesture::SelectRealm(realm)) {
        Update::TraversalCommitted { record_id, .. } => record_id,
        other => eyre::bail!("Traversal not committed: {:?}", other),
    };

    if format == OutputFormat::Text {
        println!(
            "{} {} departs {} for {}...",
            "→".blue(),
            agent_id.bold(),
            render::realm_label(current),
            render::realm_label(realm)
        );
    }

    for update in session.settle().await {
        log::debug!("Traversal update: {:?}", update);
    }

    let record = session
        .arena()
        .traversal_record(record_id)
        .ok_or_else(|| eyre!("Traversal record {} missing", record_id))?;
    let agent = session
        .arena()
        .agent(agent_id)
        .ok_or_else(|| eyre!("Agent '{}' vanished", agent_id))?;

    let report = TraversalReport { record, agent };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Text => {
            render::print_traversal(record);
            println!();
            render::print_agent_line(agent);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_realm_fails() {
        let err = run("einstein", RealmId::Solvay, OutputFormat::Json, &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already in"));
    }

    #[tokio::test]
    async fn test_unknown_agent_fails() {
        let err = run("socrates", RealmId::Solvay, OutputFormat::Json, &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown agent"));
    }
}
