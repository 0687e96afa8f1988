//! Faction mood, momentum and the incidents strong moods trigger.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::config::SentimentCfg;
use crate::constants::{INCIDENT_MOMENTUM_THRESHOLD, MAX_REACTIONS, MOMENTUM_LIMIT};
use crate::factions::{FactionId, GameMode};
use crate::numbers::{round_f64_to_i32, usize_to_f64};
use crate::outcome::Outcome;
use crate::regions::{REGION_CODES, RegionKey};
use crate::rng::{RandomSource, RngStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    Hostile,
    Wary,
    #[default]
    Neutral,
    Engaged,
    Enthusiastic,
}

impl MoodLevel {
    #[must_use]
    pub fn from_momentum(momentum: f64) -> Self {
        if momentum <= -60.0 {
            Self::Hostile
        } else if momentum <= -20.0 {
            Self::Wary
        } else if momentum >= 60.0 {
            Self::Enthusiastic
        } else if momentum >= 20.0 {
            Self::Engaged
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hostile => "hostile",
            Self::Wary => "wary",
            Self::Neutral => "neutral",
            Self::Engaged => "engaged",
            Self::Enthusiastic => "enthusiastic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactionMood {
    #[serde(default)]
    pub level: MoodLevel,
    #[serde(default)]
    pub momentum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub turn: u32,
    pub faction: FactionId,
    pub level: MoodLevel,
    pub modifier: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentState {
    #[serde(default)]
    pub factions: BTreeMap<FactionId, FactionMood>,
    #[serde(default)]
    pub global_momentum: f64,
    #[serde(default)]
    pub reactions: VecDeque<Reaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Risk,
    Clout,
    Funds,
    Support,
}

impl IncidentKind {
    pub const ALL: [Self; 4] = [Self::Risk, Self::Clout, Self::Funds, Self::Support];
}

/// A sabotage or bonus a faction pulled off this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub faction: FactionId,
    pub kind: IncidentKind,
    pub sabotage: bool,
    pub outcome: Outcome,
}

/// Faction delta derived from the broadcast support delta.
///
/// A modifier below -100% flips the sign; that is kept and reported.
#[must_use]
pub fn faction_delta(broadcast: i32, modifier: i32) -> i32 {
    let factor = 1.0 + f64::from(modifier) / 100.0;
    if factor < 0.0 && broadcast != 0 {
        log::warn!("faction modifier {modifier}% flips a {broadcast} support delta");
    }
    round_f64_to_i32(f64::from(broadcast) * factor)
}

/// Per-faction deltas for every faction in `mode`.
#[must_use]
pub fn faction_deltas(
    broadcast: i32,
    modifiers: &BTreeMap<FactionId, i32>,
    mode: GameMode,
) -> BTreeMap<FactionId, i32> {
    if broadcast == 0 {
        return BTreeMap::new();
    }
    mode.factions()
        .iter()
        .map(|faction| {
            let modifier = modifiers.get(faction).copied().unwrap_or(0);
            (*faction, faction_delta(broadcast, modifier))
        })
        .collect()
}

fn intensity(momentum: f64) -> f64 {
    ((momentum.abs() - INCIDENT_MOMENTUM_THRESHOLD) / (MOMENTUM_LIMIT - INCIDENT_MOMENTUM_THRESHOLD))
        .clamp(0.0, 1.0)
}

impl SentimentState {
    #[must_use]
    pub fn for_mode(mode: GameMode) -> Self {
        let mut state = Self::default();
        state.normalize(mode);
        state
    }

    /// Align faction entries with `mode` and re-derive levels from momentum.
    pub fn normalize(&mut self, mode: GameMode) {
        let factions = mode.factions();
        self.factions.retain(|faction, _| factions.contains(faction));
        for faction in factions {
            self.factions.entry(*faction).or_default();
        }
        for mood in self.factions.values_mut() {
            mood.momentum = mood.momentum.clamp(-MOMENTUM_LIMIT, MOMENTUM_LIMIT);
            mood.level = MoodLevel::from_momentum(mood.momentum);
        }
        while self.reactions.len() > MAX_REACTIONS {
            self.reactions.pop_front();
        }
        self.refresh_global();
    }

    #[must_use]
    pub fn mood(&self, faction: FactionId) -> FactionMood {
        self.factions.get(&faction).copied().unwrap_or_default()
    }

    /// Drift every faction toward zero momentum.
    pub fn decay(&mut self, turn: u32, cfg: &SentimentCfg) {
        let factions: Vec<FactionId> = self.factions.keys().copied().collect();
        for faction in factions {
            let momentum = self.mood(faction).momentum;
            let decayed = if momentum > 0.0 {
                (momentum - cfg.momentum_decay).max(0.0)
            } else {
                (momentum + cfg.momentum_decay).min(0.0)
            };
            self.set_momentum(turn, faction, decayed, 0);
        }
        self.refresh_global();
    }

    /// Move each faction's momentum by the action's modifier and log reactions.
    pub fn record_action(
        &mut self,
        turn: u32,
        action_name: &str,
        modifiers: &BTreeMap<FactionId, i32>,
        cfg: &SentimentCfg,
    ) {
        let factions: Vec<FactionId> = self.factions.keys().copied().collect();
        for faction in factions {
            let modifier = modifiers.get(&faction).copied().unwrap_or(0);
            if modifier == 0 {
                continue;
            }
            let momentum = f64::from(modifier).mul_add(cfg.momentum_gain_scale, self.mood(faction).momentum);
            let changed = self.set_momentum(turn, faction, momentum, modifier);
            if !changed && modifier.abs() >= cfg.reaction_threshold {
                let verb = if modifier > 0 { "cheer" } else { "bristle at" };
                self.push_reaction(Reaction {
                    turn,
                    faction,
                    level: self.mood(faction).level,
                    modifier,
                    text: format!("{faction} {verb} the {action_name}."),
                });
            }
        }
        self.refresh_global();
    }

    /// Returns true when the mood level changed (a reaction is recorded in that case).
    fn set_momentum(&mut self, turn: u32, faction: FactionId, momentum: f64, modifier: i32) -> bool {
        let momentum = momentum.clamp(-MOMENTUM_LIMIT, MOMENTUM_LIMIT);
        let level = MoodLevel::from_momentum(momentum);
        let previous = self.mood(faction).level;
        self.factions
            .insert(faction, FactionMood { level, momentum });
        if level == previous {
            return false;
        }
        log::debug!("{faction} mood {} -> {}", previous.label(), level.label());
        self.push_reaction(Reaction {
            turn,
            faction,
            level,
            modifier,
            text: format!("{faction} are now {}.", level.label()),
        });
        true
    }

    fn push_reaction(&mut self, reaction: Reaction) {
        self.reactions.push_back(reaction);
        while self.reactions.len() > MAX_REACTIONS {
            self.reactions.pop_front();
        }
    }

    fn refresh_global(&mut self) {
        self.global_momentum = if self.factions.is_empty() {
            0.0
        } else {
            let total: f64 = self.factions.values().map(|mood| mood.momentum).sum();
            total / usize_to_f64(self.factions.len())
        };
    }

    /// Multiplier applied to positive clout gains.
    #[must_use]
    pub fn clout_multiplier(&self, cfg: &SentimentCfg) -> f64 {
        self.global_momentum
            .mul_add(cfg.clout_momentum_scale, 1.0)
            .clamp(cfg.clout_multiplier_min, cfg.clout_multiplier_max)
    }

    /// Roll at most one sabotage from the most hostile faction and one bonus from the most
    /// enthusiastic.
    pub fn roll_incidents(&self, rng: &mut dyn RandomSource, cfg: &SentimentCfg) -> Vec<Incident> {
        let mut incidents = Vec::new();
        let hostile = self
            .factions
            .iter()
            .filter(|(_, mood)| mood.level == MoodLevel::Hostile)
            .min_by(|a, b| a.1.momentum.total_cmp(&b.1.momentum));
        if let Some((faction, mood)) = hostile
            && let Some(incident) = roll_incident(rng, cfg, *faction, mood.momentum, true)
        {
            incidents.push(incident);
        }
        let enthusiastic = self
            .factions
            .iter()
            .filter(|(_, mood)| mood.level == MoodLevel::Enthusiastic)
            .max_by(|a, b| a.1.momentum.total_cmp(&b.1.momentum));
        if let Some((faction, mood)) = enthusiastic
            && let Some(incident) = roll_incident(rng, cfg, *faction, mood.momentum, false)
        {
            incidents.push(incident);
        }
        incidents
    }
}

fn roll_incident(
    rng: &mut dyn RandomSource,
    cfg: &SentimentCfg,
    faction: FactionId,
    momentum: f64,
    sabotage: bool,
) -> Option<Incident> {
    let intensity = intensity(momentum);
    let chance = cfg.incident_intensity_scale.mul_add(intensity, cfg.incident_base_chance);
    if !rng.chance(RngStream::Faction, chance) {
        return None;
    }
    let kind = IncidentKind::ALL[rng.pick(RngStream::Faction, IncidentKind::ALL.len())];
    let scale = 1.0 + intensity;
    let magnitude = |base: i32| round_f64_to_i32(f64::from(base) * scale);
    let sign = if sabotage { -1 } else { 1 };
    let outcome = match kind {
        IncidentKind::Risk => Outcome::new()
            .with_risk(-sign * magnitude(cfg.incident_risk))
            .with_message(if sabotage {
                format!("{faction} leak a damaging memo.")
            } else {
                format!("{faction} vouch for the campaign and calm the press.")
            }),
        IncidentKind::Clout => Outcome::new()
            .with_clout(sign * magnitude(cfg.incident_clout))
            .with_message(if sabotage {
                format!("{faction} leaders snub the campaign.")
            } else {
                format!("{faction} leaders lend their credibility.")
            }),
        IncidentKind::Funds => Outcome::new()
            .with_funds(sign * magnitude(cfg.incident_funds))
            .with_message(if sabotage {
                format!("{faction} donors pull their pledges.")
            } else {
                format!("{faction} donors bundle a surprise check.")
            }),
        IncidentKind::Support => {
            let region = REGION_CODES[rng.pick(RngStream::Faction, REGION_CODES.len())];
            Outcome::new()
                .with_support(RegionKey::code(region), sign * magnitude(cfg.incident_support))
                .with_message(if sabotage {
                    format!("{faction} organize against the campaign in {region}.")
                } else {
                    format!("{faction} knock doors for the campaign in {region}.")
                })
        }
    };
    log::debug!("incident {kind:?} from {faction} (sabotage {sabotage}, intensity {intensity:.2})");
    Some(Incident {
        faction,
        kind,
        sabotage,
        outcome,
    })
}
