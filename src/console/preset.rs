//! Built-in and free-text scenarios

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Inject "foolishness": integrity with no personal benefit
    Foolishness,
    /// Confront a logical paradox of the current realm
    Paradox,
}

impl Preset {
    pub fn scenario(&self) -> &'static str {
        match self {
            Preset::Foolishness => "Force a decision that provides no personal benefit but upholds moral integrity.",
            Preset::Paradox => "Confront a logical paradox specific to this realm.",
        }
    }

    fn log_prefix(&self) -> Option<&'static str> {
        match self {
            Preset::Foolishness => Some("[FOOLISHNESS PROTOCOL]"),
            Preset::Paradox => None,
        }
    }
}

/// What gets submitted to the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    Preset(Preset),
    Custom(String),
}

impl Scenario {
    pub fn custom(text: impl Into<String>) -> Self {
        Scenario::Custom(text.into())
    }

    /// Text sent to the narrative service
    pub fn prompt_text(&self) -> &str {
        match self {
            Scenario::Preset(preset) => preset.scenario(),
            Scenario::Custom(text) => text.trim(),
        }
    }

    /// Text recorded in the experiment log
    pub fn log_text(&self) -> String {
        match self {
            Scenario::Preset(preset) => match preset.log_prefix() {
                Some(prefix) => format!("{} {}", prefix, preset.scenario()),
                None => preset.scenario().to_string(),
            },
            Scenario::Custom(text) => text.trim().to_string(),
        }
    }
}
