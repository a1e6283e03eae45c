//! Experiment console
//!
//! Submits scenarios against the selected agent, keeps the append-only
//! experiment log and folds returned trait changes back into the arena.
//!
//! A run is split in two so the caller can keep handling other events while
//! the narrative service works: [`ExperimentConsole::begin`] appends a pending
//! entry and claims the console, [`ExperimentConsole::finish`] resolves the
//! entry, applies the deltas and releases the console.

pub mod preset;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;

use crate::agent::Agent;
use crate::arena::Arena;
use crate::narrative::{ExperimentOutcome, NarrativeAdapter};
use crate::realm::RealmId;
pub use preset::{Preset, Scenario};

pub const PENDING_OUTCOME: &str = "Analyzing quantum coherence...";
pub const PENDING_IMPACT: &str = "Calculating...";

/// Token identifying a log entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LogId(String);

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    /// Waiting for the narrative service
    Pending,
    Resolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentLog {
    pub id: LogId,
    pub timestamp: DateTime<Local>,
    pub agent_id: String,
    pub scenario: String,
    pub status: LogStatus,
    pub outcome: String,
    pub impact: String,
}

/// Why a submission was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoAgent,
    Busy,
    EmptyScenario,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoAgent => write!(f, "no agent selected"),
            Rejection::Busy => write!(f, "an experiment is already running"),
            Rejection::EmptyScenario => write!(f, "scenario is empty"),
        }
    }
}

/// An accepted run waiting for its outcome
#[derive(Debug, Clone)]
pub struct PendingRun {
    pub log_id: LogId,
    /// Agent as it was at submission
    pub agent: Agent,
    pub realm: RealmId,
    /// Text sent to the narrative service
    pub scenario: String,
}

#[derive(Debug, Default)]
pub struct ExperimentConsole {
    logs: Vec<ExperimentLog>,
    index: HashMap<LogId, usize>,
    running: bool,
    seq: u64,
}

impl ExperimentConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn logs(&self) -> &[ExperimentLog] {
        &self.logs
    }

    pub fn log(&self, id: &LogId) -> Option<&ExperimentLog> {
        self.index.get(id).map(|i| &self.logs[*i])
    }

    /// Whether a submission would currently be accepted
    pub fn can_submit(&self, arena: &Arena, scenario: &Scenario) -> Result<(), Rejection> {
        if arena.selected_agent().is_none() {
            return Err(Rejection::NoAgent);
        }
        if self.running {
            return Err(Rejection::Busy);
        }
        if scenario.prompt_text().trim().is_empty() {
            return Err(Rejection::EmptyScenario);
        }
        Ok(())
    }

    /// Accept a scenario for the selected agent and log a pending entry
    pub fn begin(&mut self, arena: &Arena, scenario: &Scenario) -> Result<PendingRun, Rejection> {
        self.can_submit(arena, scenario)?;
        let Some(agent) = arena.selected_agent() else {
            return Err(Rejection::NoAgent);
        };

        let now = Local::now();
        self.seq += 1;
        let id = LogId(format!("{:x}-{}", now.timestamp_millis(), self.seq));

        self.index.insert(id.clone(), self.logs.len());
        self.logs.push(ExperimentLog {
            id: id.clone(),
            timestamp: now,
            agent_id: agent.id.clone(),
            scenario: scenario.log_text(),
            status: LogStatus::Pending,
            outcome: PENDING_OUTCOME.to_string(),
            impact: PENDING_IMPACT.to_string(),
        });
        self.running = true;

        log::info!("Experiment {} started on {}", id, agent.id);

        Ok(PendingRun {
            log_id: id,
            agent: agent.clone(),
            realm: agent.current_realm,
            scenario: scenario.prompt_text().to_string(),
        })
    }

    /// Resolve a pending entry and apply its trait changes
    pub fn finish(&mut self, run: &PendingRun, outcome: &ExperimentOutcome, arena: &mut Arena) {
        match self.index.get(&run.log_id) {
            Some(&i) => {
                let entry = &mut self.logs[i];
                if entry.status == LogStatus::Pending {
                    entry.outcome = outcome.narrative.clone();
                    entry.impact = outcome.stat_changes.impact_summary();
                    entry.status = LogStatus::Resolved;
                } else {
                    log::warn!("Experiment {} was already resolved", run.log_id);
                }
            }
            None => log::warn!("No experiment log entry {}", run.log_id),
        }

        arena.update_stats(&run.agent.id, &outcome.stat_changes);
        self.running = false;

        log::info!("Experiment {} finished: {}", run.log_id, outcome.stat_changes.impact_summary());
    }

    /// Begin, await the narrative service and finish in one go
    pub async fn run_experiment(
        &mut self,
        arena: &mut Arena,
        narrator: &NarrativeAdapter,
        scenario: &Scenario,
    ) -> Result<LogId, Rejection> {
        let run = self.begin(arena, scenario)?;
        let outcome = narrator
            .request_experiment_outcome(&run.agent, &run.scenario, run.realm)
            .await;
        self.finish(&run, &outcome, arena);
        Ok(run.log_id)
    }
}
