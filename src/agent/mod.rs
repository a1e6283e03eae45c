//! Arena agents
//!
//! Agents are historical or fictional figures that live in one realm at a
//! time. The roster is seeded once at startup and only mutated in place.

pub mod roster;
pub mod traits;

use serde::{Deserialize, Serialize};

use crate::realm::RealmId;
pub use traits::{StatDelta, Stats, Trait};

/// What an agent is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Debating,
    Pondering,
    /// Between a committed traversal and its completion
    Traversing,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Avatar image URL
    pub avatar: String,
    pub current_realm: RealmId,
    pub stats: Stats,
    pub status: AgentStatus,
    pub description: String,
    pub historical_context: String,
}

impl Agent {
    pub fn is_traversing(&self) -> bool {
        self.status == AgentStatus::Traversing
    }

    pub fn jingjie_index(&self) -> i32 {
        self.stats.jingjie_index()
    }
}
