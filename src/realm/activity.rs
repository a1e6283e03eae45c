//! Realm activity levels
//!
//! Cosmetic background simulation: every tick nudges each realm's activity
//! by a random amount. Nothing here is derived from agent behaviour.

use serde::Serialize;
use std::collections::BTreeMap;

use super::RealmId;

pub const MIN_ACTIVITY: i32 = 10;
pub const MAX_ACTIVITY: i32 = 100;

/// Smallest and largest change applied by a single tick (inclusive)
pub const TICK_MIN_DELTA: i32 = -5;
pub const TICK_MAX_DELTA: i32 = 4;

/// Source of randomness for activity ticks
pub trait RandomSource {
    /// Random integer in `min..=max`
    fn gen_range(&mut self, min: i32, max: i32) -> i32;
}

/// Thread-local RNG backed source
#[derive(Debug, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn gen_range(&mut self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Per-realm activity levels
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct RealmActivity {
    levels: BTreeMap<RealmId, i32>,
}

impl Default for RealmActivity {
    fn default() -> Self {
        Self {
            levels: RealmId::ALL.iter().map(|r| (*r, r.initial_activity())).collect(),
        }
    }
}

impl RealmActivity {
    pub fn level(&self, realm: RealmId) -> i32 {
        self.levels.get(&realm).copied().unwrap_or(MIN_ACTIVITY)
    }

    /// Set a level directly, clamped to the valid range
    #[cfg(test)]
    pub fn set(&mut self, realm: RealmId, level: i32) {
        self.levels.insert(realm, level.clamp(MIN_ACTIVITY, MAX_ACTIVITY));
    }

    /// Apply one random fluctuation to every realm
    pub fn tick(&mut self, rng: &mut dyn RandomSource) {
        for realm in RealmId::ALL {
            let change = rng.gen_range(TICK_MIN_DELTA, TICK_MAX_DELTA);
            let next = (self.level(realm) + change).clamp(MIN_ACTIVITY, MAX_ACTIVITY);
            self.levels.insert(realm, next);
        }
        log::trace!("Activity tick: {:?}", self.levels);
    }

    pub fn iter(&self) -> impl Iterator<Item = (RealmId, i32)> + '_ {
        self.levels.iter().map(|(r, l)| (*r, *l))
    }
}

/// Deterministic source for tests: yields the scripted values in a loop
#[cfg(test)]
pub struct ScriptedRandom {
    values: Vec<i32>,
    next: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values, next: 0 }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn gen_range(&mut self, min: i32, max: i32) -> i32 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_levels() {
        let activity = RealmActivity::default();
        assert_eq!(activity.level(RealmId::Lanting), 45);
        assert_eq!(activity.level(RealmId::Solvay), 62);
        assert_eq!(activity.level(RealmId::GooseLake), 78);
        assert_eq!(activity.level(RealmId::Dongshan), 30);
    }

    #[test]
    fn test_tick_applies_change() {
        let mut activity = RealmActivity::default();
        let mut rng = ScriptedRandom::new(vec![-5, 4, 0, -1]);
        activity.tick(&mut rng);
        assert_eq!(activity.level(RealmId::Lanting), 40);
        assert_eq!(activity.level(RealmId::Solvay), 66);
        assert_eq!(activity.level(RealmId::GooseLake), 78);
        assert_eq!(activity.level(RealmId::Dongshan), 29);
    }

    #[test]
    fn test_tick_stays_in_bounds_at_floor() {
        let mut activity = RealmActivity::default();
        for realm in RealmId::ALL {
            activity.set(realm, MIN_ACTIVITY);
        }
        let mut rng = ScriptedRandom::new(vec![-5]);
        for _ in 0..50 {
            activity.tick(&mut rng);
        }
        for (_, level) in activity.iter() {
            assert_eq!(level, MIN_ACTIVITY);
        }
    }

    #[test]
    fn test_tick_stays_in_bounds_at_ceiling() {
        let mut activity = RealmActivity::default();
        for realm in RealmId::ALL {
            activity.set(realm, MAX_ACTIVITY);
        }
        let mut rng = ScriptedRandom::new(vec![4]);
        for _ in 0..50 {
            activity.tick(&mut rng);
        }
        for (_, level) in activity.iter() {
            assert_eq!(level, MAX_ACTIVITY);
        }
    }

    #[test]
    fn test_system_random_within_range() {
        let mut activity = RealmActivity::default();
        let mut rng = SystemRandom;
        for _ in 0..500 {
            activity.tick(&mut rng);
            for (_, level) in activity.iter() {
                assert!((MIN_ACTIVITY..=MAX_ACTIVITY).contains(&level));
            }
        }
    }

    #[test]
    fn test_set_clamps() {
        let mut activity = RealmActivity::default();
        activity.set(RealmId::Solvay, 500);
        assert_eq!(activity.level(RealmId::Solvay), MAX_ACTIVITY);
        activity.set(RealmId::Solvay, -3);
        assert_eq!(activity.level(RealmId::Solvay), MIN_ACTIVITY);
    }
}
