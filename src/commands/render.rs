//! Text rendering shared by the commands

use colored::*;
use terminal_size::{Width, terminal_size};

use crate::agent::{Agent, Stats, Trait};
use crate::arena::TraversalRecord;
use crate::console::{ExperimentLog, LogStatus};
use crate::realm::RealmId;

const DEFAULT_WIDTH: usize = 80;
const BAR_WIDTH: usize = 20;

/// Terminal width, or 80 when stdout is not a terminal
pub fn terminal_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(DEFAULT_WIDTH)
}

/// Greedy word wrap with a fixed indent on every line
pub fn wrap(text: &str, indent: usize, width: usize) -> Vec<String> {
    let room = width.saturating_sub(indent).max(20);
    let pad = " ".repeat(indent);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > room {
            lines.push(format!("{}{}", pad, line));
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(format!("{}{}", pad, line));
    }
    lines
}

pub fn print_wrapped(text: &str, indent: usize) {
    for line in wrap(text, indent, terminal_width()) {
        println!("{}", line);
    }
}

pub fn realm_label(realm: RealmId) -> ColoredString {
    let config = realm.config();
    config.name.color(config.accent)
}

/// `██████░░░░` style gauge for a 0..=100 value
pub fn gauge(value: i32) -> String {
    let filled = (value.clamp(0, 100) as usize * BAR_WIDTH) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn print_stats(stats: &Stats, indent: usize) {
    let pad = " ".repeat(indent);
    for t in Trait::ALL {
        let value = stats.get(t);
        println!("{}{} {} {:>3}", pad, t.abbrev().bold(), gauge(value).cyan(), value);
    }
}

pub fn print_agent_line(agent: &Agent) {
    let status = if agent.is_traversing() {
        agent.status.to_string().yellow()
    } else {
        agent.status.to_string().dimmed()
    };
    println!(
        "  {} {} ({}) {} [{}] jingjie {}",
        "●".color(agent.current_realm.config().accent),
        agent.name.bold(),
        agent.id.dimmed(),
        realm_label(agent.current_realm),
        status,
        agent.jingjie_index().to_string().magenta()
    );
}

pub fn print_agent(agent: &Agent) {
    println!("{} {}", "Agent:".bold(), agent.name.green().bold());
    println!("  {} {}", "Id:".bold(), agent.id);
    println!("  {} {}", "Realm:".bold(), realm_label(agent.current_realm));
    println!("  {} {}", "Status:".bold(), agent.status);
    println!("  {} {}", "Jingjie index:".bold(), agent.jingjie_index().to_string().magenta());
    println!();
    print_wrapped(&agent.description, 2);
    println!();
    println!("{}", "Historical context:".bold());
    print_wrapped(&agent.historical_context, 2);
    println!();
    println!("{}", "Telemetry:".bold());
    print_stats(&agent.stats, 2);
}

pub fn print_log_entry(entry: &ExperimentLog) {
    let marker = match entry.status {
        LogStatus::Pending => "…".yellow(),
        LogStatus::Resolved => "✓".green(),
    };
    println!(
        "{} {} {} {}",
        marker,
        entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
        entry.agent_id.bold(),
        format!("#{}", entry.id).dimmed()
    );
    println!("  {} {}", "Scenario:".bold(), entry.scenario);
    println!("  {}", "Outcome:".bold());
    print_wrapped(&entry.outcome, 4);
    println!("  {} {}", "Impact:".bold(), entry.impact.cyan());
}

pub fn print_traversal(record: &TraversalRecord) {
    let state = match record.completed_at {
        Some(at) => format!("arrived {}", at.format("%H:%M:%S")).green(),
        None => "in transit".yellow(),
    };
    println!(
        "{} #{} {} {} → {} ({})",
        "⇢".cyan(),
        record.id,
        record.agent_id.bold(),
        realm_label(record.from),
        realm_label(record.to),
        state
    );
    if let Some(ref narrative) = record.narrative {
        print_wrapped(narrative, 4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog and keeps running far away";
        let lines = wrap(text, 2, 30);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.starts_with("  "));
            assert!(line.chars().count() <= 30);
        }
        let joined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        assert_eq!(joined.join(" "), text);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap("", 4, 80).is_empty());
    }

    #[test]
    fn test_gauge_bounds() {
        assert_eq!(gauge(0).chars().filter(|c| *c == '█').count(), 0);
        assert_eq!(gauge(100).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(gauge(150).chars().count(), BAR_WIDTH);
        assert_eq!(gauge(50).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }
}
