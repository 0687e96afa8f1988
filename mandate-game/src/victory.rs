//! Victory and defeat evaluation.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::VictoryCfg;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VictoryType {
    PopularMandate,
    FactionDominance,
    EconomicPower,
    SpeedRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefeatType {
    RiskCollapse,
    FactionAbandonment,
    Bankruptcy,
    TimeOut,
}

impl fmt::Display for VictoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PopularMandate => "Popular Mandate",
            Self::FactionDominance => "Faction Dominance",
            Self::EconomicPower => "Economic Power",
            Self::SpeedRun => "Speed Run",
        };
        f.write_str(label)
    }
}

impl fmt::Display for DefeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RiskCollapse => "Risk Collapse",
            Self::FactionAbandonment => "Faction Abandonment",
            Self::Bankruptcy => "Bankruptcy",
            Self::TimeOut => "Time Out",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Continue,
    Victory(VictoryType),
    Defeat(DefeatType),
}

impl Verdict {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

fn victory(state: &GameState, cfg: &VictoryCfg) -> Option<VictoryType> {
    let average = state.average_support();
    if average >= cfg.mandate_average
        && state.regions_at_or_above(cfg.mandate_region_support) >= cfg.mandate_regions
    {
        return Some(VictoryType::PopularMandate);
    }
    if state
        .faction_support
        .values()
        .any(|support| *support >= cfg.faction_dominance)
    {
        return Some(VictoryType::FactionDominance);
    }
    if state.total_funds_earned >= cfg.economic_funds
        && state.total_clout_earned >= cfg.economic_clout
    {
        return Some(VictoryType::EconomicPower);
    }
    if state.turn <= cfg.speed_run_turns && average >= cfg.speed_run_average {
        return Some(VictoryType::SpeedRun);
    }
    None
}

/// Judge a post-turn state. Risk collapse wins over every victory; any victory wins over the
/// remaining defeats.
#[must_use]
pub fn evaluate(state: &GameState, cfg: &VictoryCfg) -> Verdict {
    if state.risk >= cfg.risk_collapse {
        return Verdict::Defeat(DefeatType::RiskCollapse);
    }
    if let Some(kind) = victory(state, cfg) {
        return Verdict::Victory(kind);
    }
    if state
        .faction_support
        .values()
        .any(|support| *support <= cfg.faction_abandonment)
    {
        return Verdict::Defeat(DefeatType::FactionAbandonment);
    }
    if state.bankrupt_turns >= cfg.bankruptcy_turns {
        return Verdict::Defeat(DefeatType::Bankruptcy);
    }
    if state.turn >= cfg.turn_limit {
        return Verdict::Defeat(DefeatType::TimeOut);
    }
    Verdict::Continue
}

/// Stamp terminal flags onto the state and announce the result.
pub fn apply_verdict(state: &mut GameState, verdict: Verdict) {
    match verdict {
        Verdict::Continue => {}
        Verdict::Victory(kind) => {
            state.victory = true;
            state.game_over = true;
            state.victory_type = Some(kind);
            state.defeat_type = None;
            log::info!("victory on turn {}: {kind}", state.turn);
            state.push_news(format!("Victory: {kind}!"));
        }
        Verdict::Defeat(kind) => {
            state.victory = false;
            state.game_over = true;
            state.victory_type = None;
            state.defeat_type = Some(kind);
            log::info!("defeat on turn {}: {kind}", state.turn);
            state.push_news(format!("Defeat: {kind}."));
        }
    }
}
