//! The delta value every subsystem produces.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::factions::FactionId;
use crate::numbers::scale_positive;
use crate::regions::RegionKey;

/// Additive change to the game state. Outcomes compose by [`Outcome::merge`], never overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub support: BTreeMap<RegionKey, i32>,
    #[serde(default)]
    pub factions: BTreeMap<FactionId, i32>,
    #[serde(default)]
    pub clout: i32,
    #[serde(default)]
    pub funds: i32,
    #[serde(default)]
    pub risk: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_support(mut self, key: RegionKey, delta: i32) -> Self {
        *self.support.entry(key).or_insert(0) += delta;
        self
    }

    #[must_use]
    pub fn with_faction(mut self, faction: FactionId, delta: i32) -> Self {
        *self.factions.entry(faction).or_insert(0) += delta;
        self
    }

    #[must_use]
    pub const fn with_clout(mut self, delta: i32) -> Self {
        self.clout += delta;
        self
    }

    #[must_use]
    pub const fn with_funds(mut self, delta: i32) -> Self {
        self.funds += delta;
        self
    }

    #[must_use]
    pub const fn with_risk(mut self, delta: i32) -> Self {
        self.risk += delta;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sum `other` into `self` key by key; messages are joined with a space.
    pub fn merge(&mut self, other: &Self) {
        for (key, delta) in &other.support {
            *self.support.entry(key.clone()).or_insert(0) += delta;
        }
        for (faction, delta) in &other.factions {
            *self.factions.entry(*faction).or_insert(0) += delta;
        }
        self.clout += other.clout;
        self.funds += other.funds;
        self.risk += other.risk;
        self.message = match (self.message.take(), other.message.as_ref()) {
            (Some(mine), Some(theirs)) => Some(format!("{mine} {theirs}")),
            (Some(mine), None) => Some(mine),
            (None, theirs) => theirs.cloned(),
        };
    }

    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        self.merge(other);
        self
    }

    /// Scale every positive support, faction, clout and funds delta. Risk and penalties are left
    /// untouched.
    pub fn scale_positive(&mut self, factor: f64) {
        for delta in self.support.values_mut() {
            *delta = scale_positive(*delta, factor);
        }
        for delta in self.factions.values_mut() {
            *delta = scale_positive(*delta, factor);
        }
        self.clout = scale_positive(self.clout, factor);
        self.funds = scale_positive(self.funds, factor);
    }

    /// Broadcast support delta, the value factions react to.
    #[must_use]
    pub fn broadcast_support(&self) -> i32 {
        self.support.get(&RegionKey::All).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.support.values().all(|d| *d == 0)
            && self.factions.values().all(|d| *d == 0)
            && self.clout == 0
            && self.funds == 0
            && self.risk == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_and_joins() {
        let mut a = Outcome::new()
            .with_support(RegionKey::All, 2)
            .with_clout(3)
            .with_message("Rally held.");
        let b = Outcome::new()
            .with_support(RegionKey::All, 1)
            .with_support(RegionKey::code("OH"), 4)
            .with_risk(2)
            .with_message("Crowds cheered.");
        a.merge(&b);
        assert_eq!(a.support[&RegionKey::All], 3);
        assert_eq!(a.support[&RegionKey::code("OH")], 4);
        assert_eq!(a.clout, 3);
        assert_eq!(a.risk, 2);
        assert_eq!(a.message.as_deref(), Some("Rally held. Crowds cheered."));
    }

    #[test]
    fn scaling_skips_risk_and_negatives() {
        let mut outcome = Outcome::new()
            .with_support(RegionKey::All, 5)
            .with_faction(FactionId::Moderates, -4)
            .with_funds(10)
            .with_clout(-2)
            .with_risk(6);
        outcome.scale_positive(2.0);
        assert_eq!(outcome.support[&RegionKey::All], 10);
        assert_eq!(outcome.factions[&FactionId::Moderates], -4);
        assert_eq!(outcome.funds, 20);
        assert_eq!(outcome.clout, -2);
        assert_eq!(outcome.risk, 6);
    }

    #[test]
    fn empty_detection() {
        assert!(Outcome::new().with_message("quiet").is_empty());
        assert!(!Outcome::new().with_risk(-1).is_empty());
    }
}
