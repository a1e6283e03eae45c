//! Session event loop
//!
//! The session is the explicit context object for one run of the arena. It
//! owns the arena and the experiment console and is the only thing that
//! mutates them. Gestures are handled synchronously; slow work (narrative
//! requests, the traversal arrival timer) runs in spawned tasks that only
//! hold snapshots and report back through a channel. Results are applied
//! when the session receives them, so everything happens on one logical
//! thread without locks.

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::arena::{Arena, RealmSelection, TraversalMode, TraversalTicket};
use crate::config::Config;
use crate::console::{ExperimentConsole, LogId, PendingRun, Rejection, Scenario};
use crate::narrative::{ExperimentOutcome, NarrativeAdapter};
use crate::realm::{RandomSource, RealmId, SystemRandom};

/// User input
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    SelectAgent(String),
    InitTraversal,
    CancelTraversal,
    SelectRealm(RealmId),
    Submit(Scenario),
}

/// What changed, for renderers
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Selected {
        agent_id: String,
        traversal_mode: TraversalMode,
    },
    TargetSelection,
    TraversalRejected,
    TraversalCancelled,
    RealmIgnored,
    TraversalCommitted {
        record_id: u64,
        agent_id: String,
        from: RealmId,
        to: RealmId,
    },
    TraversalNarrated {
        record_id: u64,
    },
    TraversalCompleted {
        record_id: u64,
        agent_id: String,
    },
    ExperimentStarted(LogId),
    ExperimentRejected(Rejection),
    ExperimentResolved(LogId),
    ActivityTick,
}

/// What the run loop hands to its driver
#[derive(Debug)]
pub enum Event<I> {
    Input(I),
    Update(Update),
}

/// Results reported by spawned tasks
enum Completion {
    Experiment { run: PendingRun, outcome: ExperimentOutcome },
    Narrated { record_id: u64, narrative: String },
    Arrived { ticket: TraversalTicket },
}

pub struct Session {
    arena: Arena,
    console: ExperimentConsole,
    narrator: NarrativeAdapter,
    rng: Box<dyn RandomSource>,
    tick_interval: Duration,
    traversal_delay: Duration,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Session {
    pub fn new(arena: Arena, narrator: NarrativeAdapter, tick_interval: Duration, traversal_delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            arena,
            console: ExperimentConsole::new(),
            narrator,
            rng: Box::new(SystemRandom),
            tick_interval,
            traversal_delay,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Seeded arena, Gemini narrator (or fallbacks) and configured timings
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arena::seeded(config.selection.reselect_policy),
            NarrativeAdapter::from_config(&config.narrative),
            config.timing.tick_interval(),
            config.timing.traversal_delay(),
        )
    }

    #[cfg(test)]
    pub fn with_random(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn console(&self) -> &ExperimentConsole {
        &self.console
    }

    pub fn narrator(&self) -> &NarrativeAdapter {
        &self.narrator
    }

    /// Number of spawned tasks that have not reported back
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a gesture; any slow follow-up work is spawned
    pub fn handle(&mut self, gesture: Gesture) -> Update {
        match gesture {
            Gesture::SelectAgent(id) => {
                self.arena.select_agent(&id);
                Update::Selected {
                    agent_id: id,
                    traversal_mode: self.arena.traversal_mode(),
                }
            }
            Gesture::InitTraversal => {
                if self.arena.init_traversal() {
                    Update::TargetSelection
                } else {
                    Update::TraversalRejected
                }
            }
            Gesture::CancelTraversal => {
                self.arena.cancel_traversal();
                Update::TraversalCancelled
            }
            Gesture::SelectRealm(realm) => match self.arena.select_realm(realm) {
                RealmSelection::Ignored => Update::RealmIgnored,
                RealmSelection::Cancelled => Update::TraversalCancelled,
                RealmSelection::Committed(ticket) => {
                    let update = Update::TraversalCommitted {
                        record_id: ticket.record_id,
                        agent_id: ticket.agent.id.clone(),
                        from: ticket.from,
                        to: ticket.to,
                    };
                    self.spawn_traversal(ticket);
                    update
                }
            },
            Gesture::Submit(scenario) => match self.console.begin(&self.arena, &scenario) {
                Ok(run) => {
                    let id = run.log_id.clone();
                    self.spawn_experiment(run);
                    Update::ExperimentStarted(id)
                }
                Err(rejection) => {
                    log::debug!("Experiment rejected: {}", rejection);
                    Update::ExperimentRejected(rejection)
                }
            },
        }
    }

    /// One activity fluctuation
    pub fn tick(&mut self) -> Update {
        self.arena.tick_activity(self.rng.as_mut());
        Update::ActivityTick
    }

    fn spawn_experiment(&mut self, run: PendingRun) {
        let narrator = self.narrator.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = narrator
                .request_experiment_outcome(&run.agent, &run.scenario, run.realm)
                .await;
            let _ = tx.send(Completion::Experiment { run, outcome });
        });
    }

    /// Narrative and arrival are independent tasks; the narrative never delays arrival
    fn spawn_traversal(&mut self, ticket: TraversalTicket) {
        let narrator = self.narrator.clone();
        let tx = self.tx.clone();
        let agent = ticket.agent.clone();
        let (record_id, from, to) = (ticket.record_id, ticket.from, ticket.to);
        self.in_flight += 1;
        tokio::spawn(async move {
            let narrative = narrator.request_traversal_narrative(&agent, from, to).await;
            let _ = tx.send(Completion::Narrated { record_id, narrative });
        });

        let tx = self.tx.clone();
        let delay = self.traversal_delay;
        self.in_flight += 1;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Completion::Arrived { ticket });
        });
    }

    fn apply(&mut self, completion: Completion) -> Update {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Experiment { run, outcome } => {
                self.console.finish(&run, &outcome, &mut self.arena);
                Update::ExperimentResolved(run.log_id)
            }
            Completion::Narrated { record_id, narrative } => {
                self.arena.attach_narrative(record_id, narrative);
                Update::TraversalNarrated { record_id }
            }
            Completion::Arrived { ticket } => {
                self.arena.complete_traversal(&ticket);
                Update::TraversalCompleted {
                    record_id: ticket.record_id,
                    agent_id: ticket.agent.id,
                }
            }
        }
    }

    /// Wait for the next spawned task to report and apply its result
    ///
    /// Returns `None` straight away when nothing is in flight.
    pub async fn step(&mut self) -> Option<Update> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply every result that has already arrived, without waiting
    #[cfg(test)]
    pub fn drain_ready(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            updates.push(self.apply(completion));
        }
        updates
    }

    /// Run until every spawned task has reported back
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.step().await {
            updates.push(update);
        }
        updates
    }

    /// Wait for the next task result; never resolves while nothing is in flight
    pub async fn next_completion(&mut self) -> Update {
        match self.rx.recv().await {
            Some(completion) => self.apply(completion),
            // the session holds a sender, so the channel never closes
            None => std::future::pending().await,
        }
    }

    /// Event loop: inputs, task results and activity ticks
    ///
    /// Runs until the input stream ends or the driver breaks. Inputs are
    /// handed to the driver untouched so it can turn them into gestures or
    /// answer them itself.
    pub async fn run<I, F>(&mut self, mut inputs: mpsc::UnboundedReceiver<I>, mut driver: F)
    where
        F: FnMut(&mut Session, Event<I>) -> ControlFlow<()>,
    {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // the first tick fires immediately
        ticker.tick().await;

        loop {
            let event = tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => Event::Input(input),
                    None => break,
                },
                update = self.next_completion() => Event::Update(update),
                _ = ticker.tick() => Event::Update(self.tick()),
            };
            if driver(self, event).is_break() {
                break;
            }
        }

        log::info!("Session loop ended with {} task(s) in flight", self.in_flight);
    }
}
