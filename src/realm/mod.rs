//! The four realms
//!
//! Realms are a closed set: each `RealmId` maps to fixed metadata. The only
//! mutable thing about a realm is its activity level, which lives in
//! [`RealmActivity`] and is owned by the arena.

pub mod activity;

use serde::{Deserialize, Serialize};

pub use activity::{RandomSource, RealmActivity, SystemRandom};

/// Realm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RealmId {
    /// Wei-Jin metaphysics and art
    Lanting,
    /// Modern physics and logic
    Solvay,
    /// Neo-Confucian moral philosophy
    GooseLake,
    /// Future poetry and fusion
    Dongshan,
}

/// Immutable realm metadata
#[derive(Debug, Clone, Serialize)]
pub struct RealmConfig {
    pub id: RealmId,
    pub name: &'static str,
    pub description: &'static str,
    pub theme: &'static str,
    /// Color name understood by `colored`
    pub accent: &'static str,
    pub icon: &'static str,
}

const LANTING: RealmConfig = RealmConfig {
    id: RealmId::Lanting,
    name: "兰亭雅集 (Lanting)",
    description: "Wei-Jin Metaphysics & Art. Flowing cups, calligraphy, free spirit.",
    theme: "Art/Metaphysics",
    accent: "green",
    icon: "Feather",
};

const SOLVAY: RealmConfig = RealmConfig {
    id: RealmId::Solvay,
    name: "索尔维会议 (Solvay)",
    description: "Modern Physics & Logic. Quantum debates, relativity, scientific rigor.",
    theme: "Science/Physics",
    accent: "cyan",
    icon: "Atom",
};

const GOOSE_LAKE: RealmConfig = RealmConfig {
    id: RealmId::GooseLake,
    name: "鹅湖之会 (Goose Lake)",
    description: "Neo-Confucianism Debate. Mind vs. Principle, moral philosophy.",
    theme: "Philosophy/Ethics",
    accent: "yellow",
    icon: "Scroll",
};

const DONGSHAN: RealmConfig = RealmConfig {
    id: RealmId::Dongshan,
    name: "东山岛海滩 (Dongshan)",
    description: "Future Poetry & Fusion. Cross-cultural dialogue, futuristic aesthetics.",
    theme: "Future/Poetry",
    accent: "blue",
    icon: "Waves",
};

impl RealmId {
    /// All realms in display order
    pub const ALL: [RealmId; 4] = [RealmId::Lanting, RealmId::Solvay, RealmId::GooseLake, RealmId::Dongshan];

    /// Static metadata for this realm
    pub fn config(&self) -> &'static RealmConfig {
        match self {
            RealmId::Lanting => &LANTING,
            RealmId::Solvay => &SOLVAY,
            RealmId::GooseLake => &GOOSE_LAKE,
            RealmId::Dongshan => &DONGSHAN,
        }
    }

    /// Identifier as used in prompts, config and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            RealmId::Lanting => "lanting",
            RealmId::Solvay => "solvay",
            RealmId::GooseLake => "goose_lake",
            RealmId::Dongshan => "dongshan",
        }
    }

    /// Activity level a realm starts the session with
    pub fn initial_activity(&self) -> i32 {
        match self {
            RealmId::Lanting => 45,
            RealmId::Solvay => 62,
            RealmId::GooseLake => 78,
            RealmId::Dongshan => 30,
        }
    }
}

impl std::fmt::Display for RealmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RealmId {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "lanting" => Ok(RealmId::Lanting),
            "solvay" => Ok(RealmId::Solvay),
            "goose_lake" | "gooselake" => Ok(RealmId::GooseLake),
            "dongshan" => Ok(RealmId::Dongshan),
            _ => eyre::bail!("Unknown realm: {}. Supported: lanting, solvay, goose_lake, dongshan", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_from_str() {
        assert_eq!("lanting".parse::<RealmId>().unwrap(), RealmId::Lanting);
        assert_eq!("Goose-Lake".parse::<RealmId>().unwrap(), RealmId::GooseLake);
        assert_eq!("SOLVAY".parse::<RealmId>().unwrap(), RealmId::Solvay);
        assert!("athens".parse::<RealmId>().is_err());
    }

    #[test]
    fn test_config_matches_id() {
        for realm in RealmId::ALL {
            assert_eq!(realm.config().id, realm);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RealmId::GooseLake).unwrap();
        assert_eq!(json, "\"goose_lake\"");
        let parsed: RealmId = serde_json::from_str("\"dongshan\"").unwrap();
        assert_eq!(parsed, RealmId::Dongshan);
    }

    #[test]
    fn test_display_matches_serde() {
        for realm in RealmId::ALL {
            let json = serde_json::to_string(&realm).unwrap();
            assert_eq!(json.trim_matches('"'), realm.to_string());
        }
    }
}
