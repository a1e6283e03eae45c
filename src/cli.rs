use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::console::Preset;
use crate::realm::RealmId;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "jingjie",
    about = "Jingjie - four realms, wandering sages and AI-narrated experiments",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/jingjie/logs/jingjie.log\n\nSet GOOGLE_API_KEY (or ~/.config/jingjie/.env) to enable generated narratives."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to jingjie.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show realms with their activity and occupants
    Realms {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// List agents
    Agents {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show one agent's telemetry
    Agent {
        /// Agent id
        id: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Run one experiment against an agent
    Experiment {
        /// Agent id
        agent: String,

        /// Built-in scenario
        #[arg(long, value_enum, conflicts_with = "scenario")]
        preset: Option<Preset>,

        /// Free-text scenario
        #[arg(required_unless_present = "preset")]
        scenario: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Move an agent to another realm and wait for it to arrive
    Traverse {
        /// Agent id
        agent: String,

        /// Destination realm
        realm: RealmId,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Interactive control console
    Console,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., timing.traversal_delay_ms)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
}

impl clap::ValueEnum for RealmId {
    fn value_variants<'a>() -> &'a [Self] {
        &RealmId::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()).help(self.config().theme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_experiment_preset() {
        let cli = Cli::try_parse_from(["jingjie", "experiment", "einstein", "--preset", "paradox"]).unwrap();
        match cli.command {
            Commands::Experiment { agent, preset, scenario, .. } => {
                assert_eq!(agent, "einstein");
                assert_eq!(preset, Some(Preset::Paradox));
                assert!(scenario.is_none());
            }
            _ => panic!("expected experiment"),
        }
    }

    #[test]
    fn test_experiment_needs_scenario_or_preset() {
        assert!(Cli::try_parse_from(["jingjie", "experiment", "einstein"]).is_err());
    }

    #[test]
    fn test_parse_traverse_realm() {
        let cli = Cli::try_parse_from(["jingjie", "traverse", "zhu_xi", "goose_lake"]).unwrap();
        match cli.command {
            Commands::Traverse { realm, .. } => assert_eq!(realm, RealmId::GooseLake),
            _ => panic!("expected traverse"),
        }
    }
}
