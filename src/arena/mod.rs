//! Arena state store
//!
//! Single source of truth for the agent roster, the current selection, realm
//! activity and the traversal records. The arena is a plain value owned by
//! whoever drives it (normally a [`crate::session::Session`]); every mutation
//! is synchronous.

pub mod traversal;

use indexmap::IndexMap;
use serde::Serialize;

use crate::agent::{Agent, StatDelta, roster};
use crate::config::ReselectPolicy;
use crate::realm::{RandomSource, RealmActivity, RealmId};
pub use traversal::{RealmSelection, TraversalMode, TraversalRecord, TraversalTicket};

#[derive(Debug, Clone)]
pub struct Arena {
    agents: IndexMap<String, Agent>,
    selected: Option<String>,
    mode: TraversalMode,
    activity: RealmActivity,
    traversals: Vec<TraversalRecord>,
    reselect_policy: ReselectPolicy,
}

/// Read-only view handed to renderers
#[derive(Debug, Serialize)]
pub struct ArenaSnapshot<'a> {
    pub agents: Vec<&'a Agent>,
    pub selected: Option<&'a str>,
    pub traversal_mode: TraversalMode,
    pub activity: &'a RealmActivity,
    pub jingjie_index: i32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(roster::initial_agents(), ReselectPolicy::default())
    }
}

impl Arena {
    pub fn new(agents: Vec<Agent>, reselect_policy: ReselectPolicy) -> Self {
        Self {
            agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
            selected: None,
            mode: TraversalMode::Inactive,
            activity: RealmActivity::default(),
            traversals: Vec::new(),
            reselect_policy,
        }
    }

    /// Arena seeded with the standard roster
    pub fn seeded(reselect_policy: ReselectPolicy) -> Self {
        Self::new(roster::initial_agents(), reselect_policy)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub(crate) fn agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Agents currently in `realm`, in roster order
    pub fn agents_in(&self, realm: RealmId) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(move |a| a.current_realm == realm)
    }

    /// Raw selected id, which may not name an existing agent
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected agent, if the selection names one
    pub fn selected_agent(&self) -> Option<&Agent> {
        self.selected.as_deref().and_then(|id| self.agents.get(id))
    }

    pub fn traversal_mode(&self) -> TraversalMode {
        self.mode
    }

    pub fn activity(&self) -> &RealmActivity {
        &self.activity
    }

    /// Change the selection
    ///
    /// While choosing a traversal target, picking a different agent cancels
    /// target selection. Picking the already selected agent is governed by the
    /// reselect policy. Unknown ids are accepted and simply select nothing.
    pub fn select_agent(&mut self, id: &str) {
        if self.mode == TraversalMode::TargetSelection {
            if self.selected.as_deref() == Some(id) {
                match self.reselect_policy {
                    ReselectPolicy::Ignore => {
                        log::debug!("Reselected {} during target selection, ignoring", id);
                    }
                    ReselectPolicy::Cancel => {
                        log::debug!("Reselected {} during target selection, cancelling", id);
                        self.mode = TraversalMode::Inactive;
                    }
                }
                return;
            }
            log::debug!("Selection changed during target selection, cancelling traversal");
            self.mode = TraversalMode::Inactive;
        }

        if !self.agents.contains_key(id) {
            log::debug!("Selected unknown agent id: {}", id);
        }
        self.selected = Some(id.to_string());
    }

    /// Apply trait changes to an agent, clamping every touched trait
    pub fn update_stats(&mut self, agent_id: &str, delta: &StatDelta) {
        if delta.is_noop() {
            log::debug!("No stat changes for {}", agent_id);
            return;
        }
        match self.agents.get_mut(agent_id) {
            Some(agent) => {
                agent.stats.apply(delta);
                log::debug!("Stats of {} now {:?}", agent_id, agent.stats);
            }
            None => log::debug!("Ignoring stat update for unknown agent {}", agent_id),
        }
    }

    /// One random activity fluctuation for every realm
    pub fn tick_activity(&mut self, rng: &mut dyn RandomSource) {
        self.activity.tick(rng);
    }

    /// Rounded trait mean of the selected agent, 0 without a selection
    pub fn jingjie_index(&self) -> i32 {
        self.selected_agent().map(Agent::jingjie_index).unwrap_or(0)
    }

    pub fn snapshot(&self) -> ArenaSnapshot<'_> {
        ArenaSnapshot {
            agents: self.agents.values().collect(),
            selected: self.selected.as_deref(),
            traversal_mode: self.mode,
            activity: &self.activity,
            jingjie_index: self.jingjie_index(),
        }
    }
}
