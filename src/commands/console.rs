//! Interactive control console
//!
//! Reads commands from stdin on a plain thread and feeds them to the session
//! loop, which owns all state. Updates are printed as they happen.

use colored::*;
use eyre::Result;
use std::io::BufRead;
use std::ops::ControlFlow;
use tokio::sync::mpsc;

use super::render;
use crate::config::Config;
use crate::console::{Preset, Scenario};
use crate::realm::RealmId;
use crate::session::{Event, Gesture, Session, Update};

/// One console line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Gesture(Gesture),
    Status,
    Agents,
    Log,
    Traversals,
    Snapshot,
    Help,
    Quit,
    Invalid(String),
}

const HELP: &[(&str, &str)] = &[
    ("select <agent>", "select an agent"),
    ("traverse", "choose a destination for the selected agent"),
    ("realm <realm>", "pick the destination (same realm cancels)"),
    ("cancel", "leave target selection"),
    ("foolish", "inject the foolishness protocol"),
    ("paradox", "confront a paradox of the current realm"),
    ("run <scenario>", "run a free-text experiment"),
    ("status", "realm activity and the selected agent"),
    ("agents", "list agents"),
    ("log", "experiment log"),
    ("trips", "traversal records"),
    ("json", "arena snapshot as JSON"),
    ("help", "this list"),
    ("quit", "leave the console"),
];

/// Parse a console line; blank lines yield nothing
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "select" | "s" if !rest.is_empty() => Command::Gesture(Gesture::SelectAgent(rest.to_string())),
        "select" | "s" => Command::Invalid("usage: select <agent>".to_string()),
        "traverse" | "t" => Command::Gesture(Gesture::InitTraversal),
        "realm" | "r" => match rest.parse::<RealmId>() {
            Ok(realm) => Command::Gesture(Gesture::SelectRealm(realm)),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "cancel" => Command::Gesture(Gesture::CancelTraversal),
        "foolish" | "foolishness" => Command::Gesture(Gesture::Submit(Scenario::Preset(Preset::Foolishness))),
        "paradox" => Command::Gesture(Gesture::Submit(Scenario::Preset(Preset::Paradox))),
        "run" => Command::Gesture(Gesture::Submit(Scenario::custom(rest))),
        "status" => Command::Status,
        "agents" => Command::Agents,
        "log" => Command::Log,
        "trips" => Command::Traversals,
        "json" => Command::Snapshot,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{}' (try help)", other)),
    };
    Some(command)
}

fn spawn_reader(tx: mpsc::UnboundedSender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if let Some(command) = parse_line(&line) {
                if tx.send(command).is_err() {
                    break;
                }
            }
        }
        log::debug!("Console input closed");
    });
}

fn print_help() {
    println!("{}", "Commands:".bold());
    for (usage, about) in HELP {
        println!("  {:<16} {}", usage.cyan(), about.dimmed());
    }
}

fn print_status(session: &Session) {
    let arena = session.arena();
    println!("{}", "Realm activity:".bold());
    for (realm, level) in arena.activity().iter() {
        println!(
            "  {:<28} {} {:>3}",
            render::realm_label(realm),
            render::gauge(level).color(realm.config().accent),
            level
        );
    }
    println!("  {} {}", "Jingjie index:".bold(), arena.jingjie_index().to_string().magenta());
    println!();
    match arena.selected_agent() {
        Some(agent) => render::print_agent(agent),
        None => match arena.selected_id() {
            Some(id) => println!("{} No agent named '{}'", "✗".red(), id),
            None => println!("{}", "No agent selected".dimmed()),
        },
    }
    if session.console().is_running() {
        println!("{}", "Experiment in progress...".yellow());
    }
}

fn print_log(session: &Session) {
    let logs = session.console().logs();
    if logs.is_empty() {
        println!("{}", "No experiments yet".dimmed());
    }
    for entry in logs {
        render::print_log_entry(entry);
    }
}

fn print_traversals(session: &Session) {
    let records = session.arena().traversal_records();
    if records.is_empty() {
        println!("{}", "No traversals yet".dimmed());
    }
    for record in records {
        render::print_traversal(record);
    }
}

fn render_update(session: &Session, update: &Update) {
    let arena = session.arena();
    match update {
        Update::Selected { agent_id, .. } => match arena.selected_agent() {
            Some(agent) => println!(
                "{} Selected {} in {}",
                "●".green(),
                agent.name.bold(),
                render::realm_label(agent.current_realm)
            ),
            None => println!("{} No agent named '{}'", "✗".red(), agent_id),
        },
        Update::TargetSelection => {
            println!("{} Choose a destination with {}:", "?".cyan(), "realm <realm>".cyan());
            let current = arena.selected_agent().map(|a| a.current_realm);
            for realm in RealmId::ALL.into_iter().filter(|r| Some(*r) != current) {
                println!("    {} {}", realm.as_str().cyan(), render::realm_label(realm));
            }
        }
        Update::TraversalRejected => println!("{} Select an idle agent first", "✗".red()),
        Update::TraversalCancelled => println!("{} Traversal cancelled", "·".dimmed()),
        Update::RealmIgnored => println!("{} Not choosing a destination (use traverse)", "·".dimmed()),
        Update::TraversalCommitted { agent_id, from, to, .. } => println!(
            "{} {} departs {} for {}",
            "→".blue(),
            agent_id.bold(),
            render::realm_label(*from),
            render::realm_label(*to)
        ),
        Update::TraversalNarrated { record_id } => {
            if let Some(narrative) = arena.traversal_record(*record_id).and_then(|r| r.narrative.as_deref()) {
                render::print_wrapped(narrative, 4);
            }
        }
        Update::TraversalCompleted { agent_id, .. } => {
            if let Some(agent) = arena.agent(agent_id) {
                println!(
                    "{} {} arrived in {}",
                    "✓".green(),
                    agent.name.bold(),
                    render::realm_label(agent.current_realm)
                );
            }
        }
        Update::ExperimentStarted(id) => {
            println!("{} Experiment {} started, analyzing...", "→".blue(), id.to_string().dimmed())
        }
        Update::ExperimentRejected(rejection) => println!("{} {}", "✗".red(), rejection),
        Update::ExperimentResolved(id) => {
            if let Some(entry) = session.console().log(id) {
                render::print_log_entry(entry);
            }
        }
        Update::ActivityTick => log::trace!("Activity: {:?}", arena.activity()),
    }
}

fn drive(session: &mut Session, event: Event<Command>) -> ControlFlow<()> {
    match event {
        Event::Update(update) => render_update(session, &update),
        Event::Input(Command::Gesture(gesture)) => {
            log::debug!("Gesture: {:?}", gesture);
            let update = session.handle(gesture);
            render_update(session, &update);
        }
        Event::Input(Command::Status) => print_status(session),
        Event::Input(Command::Agents) => {
            for agent in session.arena().agents() {
                render::print_agent_line(agent);
            }
        }
        Event::Input(Command::Log) => print_log(session),
        Event::Input(Command::Traversals) => print_traversals(session),
        Event::Input(Command::Snapshot) => match serde_json::to_string_pretty(&session.arena().snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("Failed to serialize arena: {}", e),
        },
        Event::Input(Command::Help) => print_help(),
        Event::Input(Command::Invalid(message)) => println!("{} {}", "✗".red(), message),
        Event::Input(Command::Quit) => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

pub async fn run(config: &Config) -> Result<()> {
    let mut session = Session::from_config(config);

    println!("{}", "Jingjie control console".bold());
    if !session.narrator().has_credentials() {
        println!(
            "{} No API key in ${}; narratives will use fallbacks",
            "!".yellow(),
            config.narrative.api_key_env
        );
    }
    println!("Type {} for commands.", "help".cyan());
    println!();

    let (tx, rx) = mpsc::unbounded_channel();
    spawn_reader(tx);

    session.run(rx, drive).await;

    // let in-flight runs land before leaving
    if session.in_flight() > 0 {
        println!("{}", "Waiting for in-flight work...".dimmed());
        for update in session.settle().await {
            render_update(&session, &update);
        }
    }

    log::info!(
        "Console closed after {} experiment(s) and {} traversal(s)",
        session.console().logs().len(),
        session.arena().traversal_records().len()
    );
    Ok(())
}
