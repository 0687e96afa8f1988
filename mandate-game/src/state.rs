//! The root game-state aggregate.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actions::ActionId;
use crate::advisors::AdvisorKind;
use crate::config::EngineConfig;
use crate::constants::{NEWS_LOG_LIMIT, RISK_MAX, RISK_MIN, SUPPORT_MAX, SUPPORT_MIN};
use crate::events::{ActiveChain, PendingEvent};
use crate::factions::{FactionId, GameMode};
use crate::numbers::{gain_to_u64, usize_to_f64};
use crate::outcome::Outcome;
use crate::regions::REGION_CODES;
use crate::risk::RiskZone;
use crate::sentiment::SentimentState;
use crate::session::{ChallengeModifier, StartingBonuses};
use crate::spin::SpinState;
use crate::victory::{DefeatType, VictoryType};

/// Complete campaign snapshot. Replaced wholesale by every accepted intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub support: BTreeMap<String, i32>,
    #[serde(default)]
    pub faction_support: BTreeMap<FactionId, i32>,
    #[serde(default)]
    pub funds: i32,
    #[serde(default)]
    pub clout: i32,
    #[serde(default)]
    pub risk: i32,
    #[serde(default)]
    pub action_cooldowns: BTreeMap<ActionId, u32>,
    #[serde(default)]
    pub consecutive_action_uses: BTreeMap<ActionId, u32>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub sentiment: SentimentState,
    #[serde(default)]
    pub pending_event: Option<PendingEvent>,
    #[serde(default)]
    pub active_chain: Option<ActiveChain>,
    #[serde(default)]
    pub spin: Option<SpinState>,
    #[serde(default)]
    pub advisors: Vec<AdvisorKind>,
    /// Rule twist chosen at setup. Saved so a resumed campaign keeps it.
    #[serde(default)]
    pub challenge: Option<ChallengeModifier>,
    #[serde(default)]
    pub total_funds_earned: u64,
    #[serde(default)]
    pub total_clout_earned: u64,
    #[serde(default)]
    pub bankrupt_turns: u32,
    #[serde(default)]
    pub victory: bool,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub victory_type: Option<VictoryType>,
    #[serde(default)]
    pub defeat_type: Option<DefeatType>,
    #[serde(default)]
    pub news: Vec<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameMode::Standard, 0, &EngineConfig::default())
    }
}

impl GameState {
    /// Fresh campaign with every region and faction at the configured starting support.
    #[must_use]
    pub fn new(mode: GameMode, seed: u64, cfg: &EngineConfig) -> Self {
        let economy = &cfg.economy;
        let support = REGION_CODES
            .iter()
            .map(|code| ((*code).to_string(), economy.starting_support))
            .collect();
        let faction_support = mode
            .factions()
            .iter()
            .map(|faction| (*faction, economy.starting_faction_support))
            .collect();
        Self {
            mode,
            seed,
            turn: 0,
            support,
            faction_support,
            funds: economy.starting_funds,
            clout: economy.starting_clout,
            risk: 0,
            action_cooldowns: BTreeMap::new(),
            consecutive_action_uses: BTreeMap::new(),
            streak: 0,
            sentiment: SentimentState::for_mode(mode),
            pending_event: None,
            active_chain: None,
            spin: None,
            advisors: Vec::new(),
            challenge: None,
            total_funds_earned: 0,
            total_clout_earned: 0,
            bankrupt_turns: 0,
            victory: false,
            game_over: false,
            victory_type: None,
            defeat_type: None,
            news: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_advisors(mut self, advisors: Vec<AdvisorKind>) -> Self {
        self.advisors = advisors;
        self
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: Option<ChallengeModifier>) -> Self {
        self.challenge = challenge;
        self
    }

    /// Layer meta-progression bonuses onto a fresh state.
    #[must_use]
    pub fn with_starting_bonuses(mut self, bonuses: &StartingBonuses) -> Self {
        self.clout = (self.clout + bonuses.clout).max(0);
        self.funds = (self.funds + bonuses.funds).max(0);
        for value in self.support.values_mut() {
            *value = (*value + bonuses.region_support).clamp(SUPPORT_MIN, SUPPORT_MAX);
        }
        for (faction, bonus) in &bonuses.faction_support {
            if let Some(value) = self.faction_support.get_mut(faction) {
                *value = (*value + bonus).clamp(SUPPORT_MIN, SUPPORT_MAX);
            }
        }
        self
    }

    /// Repair a deserialized save: restore missing region and faction keys, drop unknown ones,
    /// re-clamp every bounded field and trim the logs.
    #[must_use]
    pub fn rehydrate(mut self, cfg: &EngineConfig) -> Self {
        let starting_support = cfg.economy.starting_support;
        self.support.retain(|code, _| REGION_CODES.contains(&code.as_str()));
        for code in REGION_CODES {
            self.support
                .entry(code.to_string())
                .or_insert(starting_support);
        }
        for value in self.support.values_mut() {
            *value = (*value).clamp(SUPPORT_MIN, SUPPORT_MAX);
        }

        let factions = self.mode.factions();
        self.faction_support
            .retain(|faction, _| factions.contains(faction));
        for faction in factions {
            self.faction_support
                .entry(*faction)
                .or_insert(cfg.economy.starting_faction_support);
        }
        for value in self.faction_support.values_mut() {
            *value = (*value).clamp(SUPPORT_MIN, SUPPORT_MAX);
        }

        self.funds = self.funds.max(0);
        self.clout = self.clout.max(0);
        self.risk = self.risk.clamp(RISK_MIN, RISK_MAX);
        self.action_cooldowns.retain(|_, turns| *turns > 0);
        self.sentiment.normalize(self.mode);
        self.trim_news();
        self
    }

    /// Apply an outcome with clamping. Region keys expand against the current turn; unknown
    /// region codes and factions outside the mode are ignored.
    pub fn apply_outcome(&mut self, outcome: &Outcome) {
        let mut region_deltas: BTreeMap<&'static str, i32> = BTreeMap::new();
        for (key, delta) in &outcome.support {
            for code in key.expand(self.turn) {
                *region_deltas.entry(code).or_insert(0) += delta;
            }
        }
        for (code, delta) in region_deltas {
            if let Some(value) = self.support.get_mut(code) {
                *value = (*value + delta).clamp(SUPPORT_MIN, SUPPORT_MAX);
            }
        }
        for (faction, delta) in &outcome.factions {
            if let Some(value) = self.faction_support.get_mut(faction) {
                *value = (*value + delta).clamp(SUPPORT_MIN, SUPPORT_MAX);
            }
        }

        self.funds = (self.funds + outcome.funds).max(0);
        self.clout = (self.clout + outcome.clout).max(0);
        self.risk = (self.risk + outcome.risk).clamp(RISK_MIN, RISK_MAX);
        self.total_funds_earned = self
            .total_funds_earned
            .saturating_add(gain_to_u64(outcome.funds));
        self.total_clout_earned = self
            .total_clout_earned
            .saturating_add(gain_to_u64(outcome.clout));
    }

    pub fn push_news(&mut self, line: impl Into<String>) {
        self.news.push(line.into());
        self.trim_news();
    }

    fn trim_news(&mut self) {
        if self.news.len() > NEWS_LOG_LIMIT {
            let excess = self.news.len() - NEWS_LOG_LIMIT;
            self.news.drain(..excess);
        }
    }

    #[must_use]
    pub fn average_support(&self) -> f64 {
        if self.support.is_empty() {
            return 0.0;
        }
        let total: i64 = self.support.values().map(|v| i64::from(*v)).sum();
        let total = i32::try_from(total).map_or(f64::MAX, f64::from);
        total / usize_to_f64(self.support.len())
    }

    #[must_use]
    pub fn regions_at_or_above(&self, threshold: i32) -> usize {
        self.support.values().filter(|v| **v >= threshold).count()
    }

    /// Region with the lowest support; ties break alphabetically.
    #[must_use]
    pub fn weakest_region(&self) -> Option<&str> {
        self.support
            .iter()
            .min_by_key(|(code, value)| (**value, code.as_str()))
            .map(|(code, _)| code.as_str())
    }

    #[must_use]
    pub const fn risk_zone(&self, cfg: &EngineConfig) -> RiskZone {
        RiskZone::from_risk(self.risk, &cfg.risk)
    }

    #[must_use]
    pub fn cooldown_remaining(&self, action: &str) -> u32 {
        self.action_cooldowns.get(action).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn prior_uses(&self, action: &str) -> u32 {
        self.consecutive_action_uses
            .get(action)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.game_over
    }
}
