//! Traversal controller
//!
//! Moving an agent is a small state machine:
//!
//! ```text
//! Inactive --init_traversal--> TargetSelection
//! TargetSelection --select_realm(same)--> Inactive            (cancelled)
//! TargetSelection --select_realm(other)--> Inactive + ticket  (committed)
//! ticket --complete_traversal--> agent arrives, status idle
//! ```
//!
//! Committing sets the agent to `traversing` and hands back a ticket. The
//! caller schedules the narrative request and the delayed completion; neither
//! waits on the other.

use chrono::{DateTime, Local};
use serde::Serialize;

use super::Arena;
use crate::agent::{Agent, AgentStatus};
use crate::realm::RealmId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    Inactive,
    /// Realm gestures pick a traversal target instead of navigating
    TargetSelection,
}

/// Result of a realm gesture
#[derive(Debug, Clone, PartialEq)]
pub enum RealmSelection {
    /// Not choosing a target, or nothing selected
    Ignored,
    /// Target was the agent's own realm
    Cancelled,
    Committed(TraversalTicket),
}

/// A committed traversal waiting for completion
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalTicket {
    pub record_id: u64,
    /// Agent as it was when the traversal was committed
    pub agent: Agent,
    pub from: RealmId,
    pub to: RealmId,
}

/// Interaction log entry for one traversal
#[derive(Debug, Clone, Serialize)]
pub struct TraversalRecord {
    pub id: u64,
    pub agent_id: String,
    pub from: RealmId,
    pub to: RealmId,
    pub started_at: DateTime<Local>,
    pub completed_at: Option<DateTime<Local>>,
    pub narrative: Option<String>,
}

impl Arena {
    /// Enter target selection for the selected agent
    ///
    /// Returns false (and changes nothing) when no agent is selected or the
    /// agent is already traversing.
    pub fn init_traversal(&mut self) -> bool {
        match self.selected_agent() {
            Some(agent) if !agent.is_traversing() => {
                log::debug!("Choosing traversal target for {}", agent.id);
                self.mode = TraversalMode::TargetSelection;
                true
            }
            Some(agent) => {
                log::debug!("{} is already traversing", agent.id);
                false
            }
            None => false,
        }
    }

    /// Leave target selection without moving anyone
    pub fn cancel_traversal(&mut self) {
        self.mode = TraversalMode::Inactive;
    }

    /// Handle a realm gesture
    pub fn select_realm(&mut self, target: RealmId) -> RealmSelection {
        if self.mode != TraversalMode::TargetSelection {
            return RealmSelection::Ignored;
        }

        let Some(agent) = self.selected_agent().cloned() else {
            return RealmSelection::Ignored;
        };

        if agent.current_realm == target {
            log::debug!("{} is already in {}, cancelling traversal", agent.id, target);
            self.mode = TraversalMode::Inactive;
            return RealmSelection::Cancelled;
        }

        let from = agent.current_realm;
        if let Some(a) = self.agent_mut(&agent.id) {
            a.status = AgentStatus::Traversing;
        }
        self.mode = TraversalMode::Inactive;

        let record_id = self.traversals.len() as u64 + 1;
        self.traversals.push(TraversalRecord {
            id: record_id,
            agent_id: agent.id.clone(),
            from,
            to: target,
            started_at: Local::now(),
            completed_at: None,
            narrative: None,
        });

        log::info!("{} traversing {} -> {}", agent.id, from, target);

        RealmSelection::Committed(TraversalTicket {
            record_id,
            agent,
            from,
            to: target,
        })
    }

    /// Land the agent in its target realm and make it idle again
    pub fn complete_traversal(&mut self, ticket: &TraversalTicket) {
        if let Some(agent) = self.agent_mut(&ticket.agent.id) {
            agent.current_realm = ticket.to;
            agent.status = AgentStatus::Idle;
            log::info!("{} arrived in {}", ticket.agent.id, ticket.to);
        }
        if let Some(record) = self.record_mut(ticket.record_id) {
            record.completed_at = Some(Local::now());
        }
    }

    /// Attach a transition narrative to its record, whenever it arrives
    pub fn attach_narrative(&mut self, record_id: u64, narrative: String) {
        match self.record_mut(record_id) {
            Some(record) => record.narrative = Some(narrative),
            None => log::debug!("No traversal record {}", record_id),
        }
    }

    pub fn traversal_records(&self) -> &[TraversalRecord] {
        &self.traversals
    }

    pub fn traversal_record(&self, record_id: u64) -> Option<&TraversalRecord> {
        self.traversals.iter().find(|r| r.id == record_id)
    }

    fn record_mut(&mut self, record_id: u64) -> Option<&mut TraversalRecord> {
        self.traversals.iter_mut().find(|r| r.id == record_id)
    }
}
