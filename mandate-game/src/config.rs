//! Engine tuning configuration.
//!
//! Every balance number the turn core consults lives here so that hosts can ship alternate
//! tunings as JSON documents through [`crate::DataLoader::load_config`]. Missing fields fall back
//! to the defaults below.
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub economy: EconomyCfg,
    pub risk: RiskCfg,
    pub modifiers: ModifierCfg,
    pub sentiment: SentimentCfg,
    pub events: EventCfg,
    pub spin: SpinCfg,
    pub victory: VictoryCfg,
}

/// Starting pools and cost rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyCfg {
    pub starting_funds: i32,
    pub starting_clout: i32,
    pub starting_support: i32,
    pub starting_faction_support: i32,
    /// Cap on the summed advisor discount, in percent.
    pub max_discount_pct: i32,
}

impl Default for EconomyCfg {
    fn default() -> Self {
        Self {
            starting_funds: 100,
            starting_clout: 50,
            starting_support: 50,
            starting_faction_support: 50,
            max_discount_pct: 50,
        }
    }
}

/// Risk-zone bands and the cost multiplier each applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskCfg {
    pub caution_at: i32,
    pub danger_at: i32,
    pub critical_at: i32,
    pub safe_cost_multiplier: f64,
    pub caution_cost_multiplier: f64,
    pub danger_cost_multiplier: f64,
    pub critical_cost_multiplier: f64,
}

impl Default for RiskCfg {
    fn default() -> Self {
        Self {
            caution_at: 25,
            danger_at: 50,
            critical_at: 75,
            safe_cost_multiplier: 1.0,
            caution_cost_multiplier: 1.1,
            danger_cost_multiplier: 1.25,
            critical_cost_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierCfg {
    pub critical_base_chance: f64,
    pub critical_multiplier: f64,
    pub session_opener_multiplier: f64,
    pub diminishing_step: f64,
    pub diminishing_floor: f64,
}

impl Default for ModifierCfg {
    fn default() -> Self {
        Self {
            critical_base_chance: 0.10,
            critical_multiplier: 2.0,
            session_opener_multiplier: 1.5,
            diminishing_step: 0.25,
            diminishing_floor: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentCfg {
    /// Momentum points every faction drifts toward zero each turn.
    pub momentum_decay: f64,
    /// Momentum gained per point of an action's faction modifier.
    pub momentum_gain_scale: f64,
    /// Absolute faction modifier that always produces a reaction.
    pub reaction_threshold: i32,
    pub incident_base_chance: f64,
    pub incident_intensity_scale: f64,
    pub incident_risk: i32,
    pub incident_clout: i32,
    pub incident_funds: i32,
    pub incident_support: i32,
    pub clout_momentum_scale: f64,
    pub clout_multiplier_min: f64,
    pub clout_multiplier_max: f64,
}

impl Default for SentimentCfg {
    fn default() -> Self {
        Self {
            momentum_decay: 5.0,
            momentum_gain_scale: 0.25,
            reaction_threshold: 30,
            incident_base_chance: 0.10,
            incident_intensity_scale: 0.20,
            incident_risk: 4,
            incident_clout: 4,
            incident_funds: 10,
            incident_support: 3,
            clout_momentum_scale: 0.005,
            clout_multiplier_min: 0.5,
            clout_multiplier_max: 1.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCfg {
    pub event_chance: f64,
    /// Share of event rolls that try to open a chain first.
    pub chain_chance: f64,
    pub double_events_factor: f64,
}

impl Default for EventCfg {
    fn default() -> Self {
        Self {
            event_chance: 0.3,
            chain_chance: 0.2,
            double_events_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinCfg {
    pub reroll_base_cost: i32,
    pub reroll_growth: f64,
    pub max_locks: usize,
    pub pair_multiplier: f64,
    pub double_pair_multiplier: f64,
    pub jackpot_multiplier: f64,
}

impl Default for SpinCfg {
    fn default() -> Self {
        Self {
            reroll_base_cost: 5,
            reroll_growth: 0.5,
            max_locks: 2,
            pair_multiplier: 1.25,
            double_pair_multiplier: 1.5,
            jackpot_multiplier: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryCfg {
    pub mandate_average: f64,
    pub mandate_regions: usize,
    pub mandate_region_support: i32,
    pub faction_dominance: i32,
    pub economic_funds: u64,
    pub economic_clout: u64,
    pub speed_run_turns: u32,
    pub speed_run_average: f64,
    pub faction_abandonment: i32,
    pub bankruptcy_turns: u32,
    pub turn_limit: u32,
    pub risk_collapse: i32,
}

impl Default for VictoryCfg {
    fn default() -> Self {
        Self {
            mandate_average: 80.0,
            mandate_regions: 35,
            mandate_region_support: 60,
            faction_dominance: 95,
            economic_funds: 500,
            economic_clout: 200,
            speed_run_turns: 20,
            speed_run_average: 75.0,
            faction_abandonment: 0,
            bankruptcy_turns: 3,
            turn_limit: 50,
            risk_collapse: 100,
        }
    }
}

fn check(condition: bool, message: &str) -> Result<(), EngineError> {
    if condition {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(message.to_string()))
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl EngineConfig {
    /// Get default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Json`] for malformed input and [`EngineError::InvalidConfig`] when a
    /// value is out of range.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> Result<(), EngineError> {
        let economy = &self.economy;
        check(
            economy.starting_funds >= 0 && economy.starting_clout >= 0,
            "starting pools must be non-negative",
        )?;
        check(
            (0..=100).contains(&economy.starting_support)
                && (0..=100).contains(&economy.starting_faction_support),
            "starting support must be within 0..=100",
        )?;
        check(
            (0..=100).contains(&economy.max_discount_pct),
            "max_discount_pct must be within 0..=100",
        )?;

        let risk = &self.risk;
        check(
            0 < risk.caution_at && risk.caution_at < risk.danger_at && risk.danger_at < risk.critical_at,
            "risk zone thresholds must be strictly increasing",
        )?;
        check(
            risk.safe_cost_multiplier > 0.0
                && risk.safe_cost_multiplier <= risk.caution_cost_multiplier
                && risk.caution_cost_multiplier <= risk.danger_cost_multiplier
                && risk.danger_cost_multiplier <= risk.critical_cost_multiplier,
            "risk cost multipliers must be positive and non-decreasing",
        )?;

        let modifiers = &self.modifiers;
        check(
            is_probability(modifiers.critical_base_chance),
            "critical_base_chance must be a probability",
        )?;
        check(
            modifiers.critical_multiplier >= 1.0 && modifiers.session_opener_multiplier >= 1.0,
            "bonus multipliers must be at least 1",
        )?;
        check(
            modifiers.diminishing_step >= 0.0
                && modifiers.diminishing_floor > 0.0
                && modifiers.diminishing_floor <= 1.0,
            "diminishing returns need a non-negative step and a floor in (0, 1]",
        )?;

        let sentiment = &self.sentiment;
        check(
            sentiment.momentum_decay >= 0.0 && sentiment.momentum_gain_scale >= 0.0,
            "momentum decay and gain must be non-negative",
        )?;
        check(
            is_probability(sentiment.incident_base_chance)
                && is_probability(sentiment.incident_base_chance + sentiment.incident_intensity_scale),
            "incident chances must stay within 0..=1",
        )?;
        check(
            0.0 < sentiment.clout_multiplier_min
                && sentiment.clout_multiplier_min <= 1.0
                && sentiment.clout_multiplier_max >= 1.0,
            "clout multiplier bounds must bracket 1",
        )?;

        let events = &self.events;
        check(
            is_probability(events.event_chance) && is_probability(events.chain_chance),
            "event chances must be probabilities",
        )?;
        check(
            events.double_events_factor >= 1.0,
            "double_events_factor must be at least 1",
        )?;

        let spin = &self.spin;
        check(spin.reroll_base_cost >= 0, "reroll_base_cost must be non-negative")?;
        check(spin.reroll_growth >= 0.0, "reroll_growth must be non-negative")?;
        check(spin.max_locks < 3, "max_locks must leave at least one reel free")?;
        check(
            1.0 <= spin.pair_multiplier
                && spin.pair_multiplier <= spin.double_pair_multiplier
                && spin.double_pair_multiplier <= spin.jackpot_multiplier,
            "combo multipliers must be ordered pair <= double pair <= jackpot",
        )?;

        let victory = &self.victory;
        check(
            victory.mandate_regions <= crate::regions::REGION_CODES.len(),
            "mandate_regions exceeds the region count",
        )?;
        check(victory.turn_limit > 0, "turn_limit must be positive")?;
        check(
            victory.risk_collapse > 0 && victory.risk_collapse <= 100,
            "risk_collapse must be within 1..=100",
        )?;
        Ok(())
    }
}
