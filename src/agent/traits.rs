//! Agent traits and their bounded scores
//!
//! Every agent carries four integer traits. Scores are clamped to
//! `[MIN_SCORE, MAX_SCORE]` whenever they change, so no caller can push a
//! score out of range.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// The four traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Philosophy,
    Art,
    Science,
    Ethics,
}

impl Trait {
    pub const ALL: [Trait; 4] = [Trait::Philosophy, Trait::Art, Trait::Science, Trait::Ethics];

    /// Capitalized name used in impact summaries
    pub fn label(&self) -> &'static str {
        match self {
            Trait::Philosophy => "Philosophy",
            Trait::Art => "Art",
            Trait::Science => "Science",
            Trait::Ethics => "Ethics",
        }
    }

    /// Three-letter tag for compact displays
    pub fn abbrev(&self) -> &'static str {
        match self {
            Trait::Philosophy => "PHI",
            Trait::Art => "ART",
            Trait::Science => "SCI",
            Trait::Ethics => "ETH",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Trait scores of one agent
///
/// Fields are private; every construction path, deserialization included,
/// goes through [`Stats::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatsWire")]
pub struct Stats {
    philosophy: i32,
    art: i32,
    science: i32,
    ethics: i32,
}

#[derive(Deserialize)]
struct StatsWire {
    philosophy: i32,
    art: i32,
    science: i32,
    ethics: i32,
}

impl From<StatsWire> for Stats {
    fn from(wire: StatsWire) -> Self {
        Stats::new(wire.philosophy, wire.art, wire.science, wire.ethics)
    }
}

impl Stats {
    /// Build a score set, clamping every value
    pub fn new(philosophy: i32, art: i32, science: i32, ethics: i32) -> Self {
        Self {
            philosophy: clamp_score(philosophy as i64),
            art: clamp_score(art as i64),
            science: clamp_score(science as i64),
            ethics: clamp_score(ethics as i64),
        }
    }

    pub fn philosophy(&self) -> i32 {
        self.philosophy
    }

    pub fn art(&self) -> i32 {
        self.art
    }

    pub fn science(&self) -> i32 {
        self.science
    }

    pub fn ethics(&self) -> i32 {
        self.ethics
    }

    pub fn get(&self, t: Trait) -> i32 {
        match t {
            Trait::Philosophy => self.philosophy,
            Trait::Art => self.art,
            Trait::Science => self.science,
            Trait::Ethics => self.ethics,
        }
    }

    fn slot(&mut self, t: Trait) -> &mut i32 {
        match t {
            Trait::Philosophy => &mut self.philosophy,
            Trait::Art => &mut self.art,
            Trait::Science => &mut self.science,
            Trait::Ethics => &mut self.ethics,
        }
    }

    /// Add `delta` to one trait and clamp the result
    pub fn adjust(&mut self, t: Trait, delta: i32) {
        let slot = self.slot(t);
        *slot = clamp_score(*slot as i64 + delta as i64);
    }

    /// Apply every non-zero entry of a delta map
    pub fn apply(&mut self, delta: &StatDelta) {
        for (t, change) in delta.nonzero() {
            self.adjust(t, change);
        }
    }

    /// Rounded mean of the four traits (halves round up)
    pub fn jingjie_index(&self) -> i32 {
        let sum: i32 = Trait::ALL.iter().map(|t| self.get(*t)).sum();
        (sum + 2).div_euclid(4)
    }
}

fn clamp_score(value: i64) -> i32 {
    value.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as i32
}

/// Sparse set of trait changes
///
/// Absent traits mean "no change". Deserializes from the `statChanges`
/// object returned by the narrative service; fractional numbers are rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatDelta {
    changes: BTreeMap<Trait, i32>,
}

impl StatDelta {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(mut self, t: Trait, change: i32) -> Self {
        self.changes.insert(t, change);
        self
    }

    #[cfg(test)]
    pub fn get(&self, t: Trait) -> Option<i32> {
        self.changes.get(&t).copied()
    }

    /// Entries with a non-zero change, in trait order
    pub fn nonzero(&self) -> impl Iterator<Item = (Trait, i32)> + '_ {
        self.changes.iter().filter(|(_, v)| **v != 0).map(|(t, v)| (*t, *v))
    }

    /// True when applying this delta changes nothing
    pub fn is_noop(&self) -> bool {
        self.nonzero().next().is_none()
    }

    /// Human readable summary, e.g. `Ethics +5, Science -3`
    pub fn impact_summary(&self) -> String {
        let parts: Vec<String> = self
            .nonzero()
            .map(|(t, v)| format!("{} {}{}", t.label(), if v > 0 { "+" } else { "" }, v))
            .collect();

        if parts.is_empty() {
            NO_MEASURABLE_CHANGE.to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub const NO_MEASURABLE_CHANGE: &str = "No measurable change";

#[derive(Deserialize)]
struct StatDeltaWire {
    philosophy: Option<f64>,
    art: Option<f64>,
    science: Option<f64>,
    ethics: Option<f64>,
}

impl<'de> Deserialize<'de> for StatDelta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = StatDeltaWire::deserialize(deserializer)?;
        let mut delta = StatDelta::new();
        for (t, value) in [
            (Trait::Philosophy, wire.philosophy),
            (Trait::Art, wire.art),
            (Trait::Science, wire.science),
            (Trait::Ethics, wire.ethics),
        ] {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                let rounded = v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
                delta.changes.insert(t, rounded);
            }
        }
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_display() {
        assert_eq!(Trait::Art.to_string(), "art");
        assert_eq!(Trait::Philosophy.label(), "Philosophy");
    }

    #[test]
    fn test_adjust_clamps_high() {
        let mut stats = Stats::new(95, 50, 50, 50);
        stats.adjust(Trait::Philosophy, 50);
        assert_eq!(stats.philosophy(), 100);
    }

    #[test]
    fn test_adjust_clamps_low() {
        let mut stats = Stats::new(5, 50, 50, 50);
        stats.adjust(Trait::Philosophy, -50);
        assert_eq!(stats.philosophy(), 0);
    }

    #[test]
    fn test_adjust_extreme_delta() {
        let mut stats = Stats::new(50, 50, 50, 50);
        stats.adjust(Trait::Art, i32::MAX);
        stats.adjust(Trait::Science, i32::MIN);
        assert_eq!(stats.art(), 100);
        assert_eq!(stats.science(), 0);
    }

    #[test]
    fn test_new_clamps() {
        let stats = Stats::new(-10, 120, 50, 100);
        assert_eq!(stats, Stats::new(0, 100, 50, 100));
    }

    #[test]
    fn test_deserialize_clamps_out_of_range() {
        let stats: Stats =
            serde_json::from_str(r#"{"philosophy": 500, "art": -40, "science": 70, "ethics": 100}"#).unwrap();
        assert_eq!(stats, Stats::new(100, 0, 70, 100));
        assert_eq!(stats.philosophy(), 100);
        assert_eq!(stats.art(), 0);
    }

    #[test]
    fn test_agent_deserialize_clamps_stats() {
        let json = r#"{
            "id": "rogue",
            "name": "Rogue",
            "avatar": "",
            "current_realm": "solvay",
            "stats": {"philosophy": 101, "art": 999, "science": -1, "ethics": 50},
            "status": "idle",
            "description": "",
            "historical_context": ""
        }"#;
        let agent: crate::agent::Agent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.stats, Stats::new(100, 100, 0, 50));
    }

    #[test]
    fn test_apply_skips_zero_and_absent() {
        let mut stats = Stats::new(60, 95, 10, 50);
        let delta = StatDelta::new().with(Trait::Ethics, 5).with(Trait::Art, 0);
        stats.apply(&delta);
        assert_eq!(stats, Stats::new(60, 95, 10, 55));
    }

    #[test]
    fn test_jingjie_index() {
        assert_eq!(Stats::new(60, 95, 10, 50).jingjie_index(), 54);
        assert_eq!(Stats::new(0, 0, 0, 0).jingjie_index(), 0);
        assert_eq!(Stats::new(100, 100, 100, 100).jingjie_index(), 100);
        // 2.5 rounds up
        assert_eq!(Stats::new(1, 2, 3, 4).jingjie_index(), 3);
    }

    #[test]
    fn test_impact_summary() {
        let delta = StatDelta::new().with(Trait::Science, -3).with(Trait::Ethics, 5);
        assert_eq!(delta.impact_summary(), "Science -3, Ethics +5");
    }

    #[test]
    fn test_impact_summary_empty() {
        assert_eq!(StatDelta::new().impact_summary(), NO_MEASURABLE_CHANGE);
        let zeros = StatDelta::new().with(Trait::Art, 0);
        assert_eq!(zeros.impact_summary(), NO_MEASURABLE_CHANGE);
        assert!(zeros.is_noop());
    }

    #[test]
    fn test_delta_deserialize_sparse() {
        let delta: StatDelta = serde_json::from_str(r#"{"ethics": 5, "art": -2.6}"#).unwrap();
        assert_eq!(delta.get(Trait::Ethics), Some(5));
        assert_eq!(delta.get(Trait::Art), Some(-3));
        assert_eq!(delta.get(Trait::Science), None);
    }

    #[test]
    fn test_delta_deserialize_rejects_strings() {
        let result: Result<StatDelta, _> = serde_json::from_str(r#"{"ethics": "a lot"}"#);
        assert!(result.is_err());
    }
}
