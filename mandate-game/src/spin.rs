//! Campaign slot machine: three reels, tag combos, locks and paid re-rolls.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::config::SpinCfg;
use crate::error::EngineError;
use crate::numbers::round_f64_to_i32;
use crate::outcome::Outcome;
use crate::rng::{RandomSource, RngStream};

const DEFAULT_REELS_DATA: &str = include_str!("../assets/reels.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeTag {
    Grassroots,
    Media,
    Money,
    Heartland,
    Coastal,
    Youth,
    Scandal,
    Outrage,
}

impl fmt::Display for ThemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Grassroots => "Grassroots",
            Self::Media => "Media",
            Self::Money => "Money",
            Self::Heartland => "Heartland",
            Self::Coastal => "Coastal",
            Self::Youth => "Youth",
            Self::Scandal => "Scandal",
            Self::Outrage => "Outrage",
        };
        f.write_str(label)
    }
}

pub type TagSet = SmallVec<[ThemeTag; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelItem {
    pub id: String,
    pub name: String,
    pub tags: TagSet,
    #[serde(default)]
    pub outcome: Outcome,
}

impl ReelItem {
    fn shares_tag(&self, other: &Self) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }
}

/// Hand-picked triple that always pays out as a jackpot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCombo {
    pub name: String,
    /// Item ids in reel order: action, modifier, target.
    pub items: [String; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReelSlot {
    Action,
    Modifier,
    Target,
}

impl ReelSlot {
    pub const ALL: [Self; 3] = [Self::Action, Self::Modifier, Self::Target];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Action => 0,
            Self::Modifier => 1,
            Self::Target => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboTier {
    #[default]
    None,
    Pair,
    DoublePair,
    Jackpot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub tier: ComboTier,
    pub multiplier: f64,
    pub name: String,
}

/// The current draw. Lives on the game state between `start_spin` and `resolve_spin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpinState {
    #[serde(default)]
    pub reels: [usize; 3],
    #[serde(default)]
    pub locks: [bool; 3],
    #[serde(default)]
    pub rerolls: u32,
    /// Re-rolls taken while at least one reel was locked; drives the re-roll price.
    #[serde(default)]
    pub locked_rerolls: u32,
}

impl SpinState {
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.locks.iter().filter(|locked| **locked).count()
    }

    #[must_use]
    pub fn any_locked(&self) -> bool {
        self.locks.iter().any(|locked| *locked)
    }

    #[must_use]
    pub const fn is_locked(&self, slot: ReelSlot) -> bool {
        self.locks[slot.index()]
    }
}

/// Clout price of the next re-roll.
#[must_use]
pub fn reroll_cost(locked_rerolls: u32, cfg: &SpinCfg) -> i32 {
    let growth = f64::from(locked_rerolls).mul_add(cfg.reroll_growth, 1.0);
    round_f64_to_i32(f64::from(cfg.reroll_base_cost) * growth)
}

/// Classify a draw. A named triple or a tag shared by all three reels is a jackpot; otherwise the
/// number of reel pairs sharing a tag decides the tier.
#[must_use]
pub fn calculate_combo_multiplier(items: [&ReelItem; 3], named: &[NamedCombo], cfg: &SpinCfg) -> Combo {
    let [first, second, third] = items;
    if let Some(combo) = named.iter().find(|combo| {
        combo.items[0] == first.id && combo.items[1] == second.id && combo.items[2] == third.id
    }) {
        return Combo {
            tier: ComboTier::Jackpot,
            multiplier: cfg.jackpot_multiplier,
            name: combo.name.clone(),
        };
    }
    if let Some(tag) = first
        .tags
        .iter()
        .find(|tag| second.tags.contains(*tag) && third.tags.contains(*tag))
    {
        return Combo {
            tier: ComboTier::Jackpot,
            multiplier: cfg.jackpot_multiplier,
            name: format!("Triple {tag}"),
        };
    }
    let pairs = [
        first.shares_tag(second),
        first.shares_tag(third),
        second.shares_tag(third),
    ]
    .into_iter()
    .filter(|shared| *shared)
    .count();
    match pairs {
        0 => Combo {
            tier: ComboTier::None,
            multiplier: 1.0,
            name: String::from("No combo"),
        },
        1 => Combo {
            tier: ComboTier::Pair,
            multiplier: cfg.pair_multiplier,
            name: String::from("Pair"),
        },
        _ => Combo {
            tier: ComboTier::DoublePair,
            multiplier: cfg.double_pair_multiplier,
            name: String::from("Double Pair"),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reels {
    pub action: Vec<ReelItem>,
    pub modifier: Vec<ReelItem>,
    pub target: Vec<ReelItem>,
    #[serde(default)]
    pub named_combos: Vec<NamedCombo>,
}

impl Reels {
    /// Bundled reel set.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled reel data fails to parse or validate.
    pub fn standard() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_REELS_DATA)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Json`] for malformed input and [`EngineError::InvalidConfig`] when
    /// a reel is empty or a named combo references a missing item.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let reels: Self = serde_json::from_str(json)?;
        reels.validate()?;
        Ok(reels)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (slot, reel) in ReelSlot::ALL.iter().zip(self.reels()) {
            if reel.is_empty() {
                return Err(EngineError::InvalidConfig(format!("{slot:?} reel is empty")));
            }
        }
        for combo in &self.named_combos {
            for (reel, id) in self.reels().into_iter().zip(&combo.items) {
                if !reel.iter().any(|item| &item.id == id) {
                    return Err(EngineError::InvalidConfig(format!(
                        "combo `{}` references unknown reel item `{id}`",
                        combo.name
                    )));
                }
            }
        }
        Ok(())
    }

    const fn reels(&self) -> [&Vec<ReelItem>; 3] {
        [&self.action, &self.modifier, &self.target]
    }

    /// Fresh draw with no locks.
    pub fn draw(&self, rng: &mut dyn RandomSource) -> SpinState {
        let [action, modifier, target] = self.reels();
        SpinState {
            reels: [
                rng.pick(RngStream::Spin, action.len()),
                rng.pick(RngStream::Spin, modifier.len()),
                rng.pick(RngStream::Spin, target.len()),
            ],
            ..SpinState::default()
        }
    }

    /// Redraw every unlocked reel and bump the re-roll counters.
    pub fn reroll(&self, spin: &mut SpinState, rng: &mut dyn RandomSource) {
        if spin.any_locked() {
            spin.locked_rerolls += 1;
        }
        spin.rerolls += 1;
        for (slot, reel) in self.reels().into_iter().enumerate() {
            if !spin.locks[slot] {
                spin.reels[slot] = rng.pick(RngStream::Spin, reel.len());
            }
        }
    }

    #[must_use]
    pub fn items(&self, spin: &SpinState) -> Option<[&ReelItem; 3]> {
        Some([
            self.action.get(spin.reels[0])?,
            self.modifier.get(spin.reels[1])?,
            self.target.get(spin.reels[2])?,
        ])
    }

    /// Merged reel outcome scaled by the combo multiplier.
    #[must_use]
    pub fn spin_outcome(&self, spin: &SpinState, cfg: &SpinCfg) -> Option<(Outcome, Combo)> {
        let items = self.items(spin)?;
        let combo = calculate_combo_multiplier(items, &self.named_combos, cfg);
        let mut outcome = items
            .iter()
            .fold(Outcome::new(), |acc, item| acc.merged(&item.outcome));
        if combo.multiplier > 1.0 {
            outcome.scale_positive(combo.multiplier);
        }
        let [action, modifier, target] = items;
        outcome.message = Some(format!(
            "{} + {} + {}: {}!",
            action.name, modifier.name, target.name, combo.name
        ));
        Some((outcome, combo))
    }
}
