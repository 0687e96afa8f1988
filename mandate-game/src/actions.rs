//! Action registry: the static catalog of campaign actions.
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::EngineError;
use crate::factions::FactionId;
use crate::outcome::Outcome;
use crate::regions::RegionKey;
use crate::risk::RiskZone;
use crate::state::GameState;

/// Identifier of an action, validated against the registry when an intent is resolved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionCost {
    pub funds: i32,
    pub clout: i32,
}

impl ActionCost {
    #[must_use]
    pub const fn funds(funds: i32) -> Self {
        Self { funds, clout: 0 }
    }

    #[must_use]
    pub const fn clout(clout: i32) -> Self {
        Self { funds: 0, clout }
    }

    #[must_use]
    pub const fn free() -> Self {
        Self { funds: 0, clout: 0 }
    }
}

/// Prerequisite an action checks against the pre-turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    MinTurn(u32),
    MinClout(i32),
    MinRisk(i32),
    MaxRisk(i32),
}

impl Requirement {
    #[must_use]
    pub const fn is_met(self, state: &GameState) -> bool {
        match self {
            Self::MinTurn(turn) => state.turn >= turn,
            Self::MinClout(clout) => state.clout >= clout,
            Self::MinRisk(risk) => state.risk >= risk,
            Self::MaxRisk(risk) => state.risk <= risk,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinTurn(turn) => write!(f, "available from turn {turn}"),
            Self::MinClout(clout) => write!(f, "needs at least {clout} clout"),
            Self::MinRisk(risk) => write!(f, "needs risk of at least {risk}"),
            Self::MaxRisk(risk) => write!(f, "needs risk of at most {risk}"),
        }
    }
}

pub type ActionEffect = fn(&GameState) -> Outcome;

#[derive(Debug, Clone)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: ActionCost,
    pub cooldown: u32,
    pub locked_from: Option<RiskZone>,
    pub requirement: Option<Requirement>,
    /// Percent adjustment each faction applies to the broadcast support delta.
    pub faction_modifiers: BTreeMap<FactionId, i32>,
    pub effect: ActionEffect,
}

impl ActionDefinition {
    /// Base outcome computed from the pre-deduction state.
    #[must_use]
    pub fn base_outcome(&self, state: &GameState) -> Outcome {
        (self.effect)(state)
    }
}

#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: Vec<ActionDefinition>,
}

impl ActionRegistry {
    /// Build a registry from custom definitions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when two definitions share an id.
    pub fn new(actions: Vec<ActionDefinition>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for action in &actions {
            if !seen.insert(action.id.as_str()) {
                return Err(EngineError::InvalidConfig(format!(
                    "duplicate action id `{}`",
                    action.id
                )));
            }
        }
        Ok(Self { actions })
    }

    /// The shipped campaign action set.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            actions: standard_actions(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|action| action.id.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn modifiers(table: [i32; 5]) -> BTreeMap<FactionId, i32> {
    FactionId::ALL
        .into_iter()
        .zip(table)
        .filter(|(_, pct)| *pct != 0)
        .collect()
}

fn rally(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 2)
        .with_clout(3)
        .with_risk(1)
        .with_message("The rally packs the fairgrounds.")
}

fn tv_ads(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 3)
        .with_message("Ads saturate the evening news.")
}

fn fundraiser(_: &GameState) -> Outcome {
    Outcome::new()
        .with_funds(40)
        .with_risk(2)
        .with_message("Donors open their checkbooks.")
}

fn town_hall(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::Midwest, 4)
        .with_clout(2)
        .with_risk(-3)
        .with_message("A calm town hall plays well in the heartland.")
}

fn canvass(state: &GameState) -> Outcome {
    let outcome = Outcome::new().with_message("Volunteers knock on doors.");
    match state.weakest_region() {
        Some(code) => outcome.with_support(RegionKey::code(code), 6),
        None => outcome,
    }
}

fn media_tour(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 2)
        .with_clout(5)
        .with_risk(4)
        .with_message("The media tour dominates the cycle.")
}

fn opposition_research(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 4)
        .with_risk(10)
        .with_message("Opposition research lands a hit.")
}

fn attack_ads(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 5)
        .with_risk(12)
        .with_message("Attack ads move numbers and tempers.")
}

fn damage_control(_: &GameState) -> Outcome {
    Outcome::new()
        .with_risk(-15)
        .with_clout(-2)
        .with_message("The war room contains the fallout.")
}

fn endorsements(_: &GameState) -> Outcome {
    Outcome::new()
        .with_support(RegionKey::All, 3)
        .with_support(RegionKey::Random, 3)
        .with_message("A wave of endorsements rolls in.")
}

fn regroup(_: &GameState) -> Outcome {
    Outcome::new()
        .with_risk(-5)
        .with_clout(2)
        .with_message("The staff takes a breath and regroups.")
}

fn standard_actions() -> Vec<ActionDefinition> {
    // Faction tables are ordered progressives, moderates, conservatives, libertarians, populists.
    vec![
        ActionDefinition {
            id: ActionId::from("rally"),
            name: "Rally",
            description: "Energize the base with a big public rally.",
            cost: ActionCost::funds(10),
            cooldown: 0,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([20, 0, -10, -10, 40]),
            effect: rally,
        },
        ActionDefinition {
            id: ActionId::from("tv_ads"),
            name: "TV Ads",
            description: "Buy a flight of national television spots.",
            cost: ActionCost::funds(30),
            cooldown: 1,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([0, 20, 10, -20, -10]),
            effect: tv_ads,
        },
        ActionDefinition {
            id: ActionId::from("fundraiser"),
            name: "Fundraiser",
            description: "Host a high-dollar dinner for donors.",
            cost: ActionCost::clout(5),
            cooldown: 0,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([-20, 10, 20, 10, -40]),
            effect: fundraiser,
        },
        ActionDefinition {
            id: ActionId::from("town_hall"),
            name: "Town Hall",
            description: "Take unscripted questions in the Midwest.",
            cost: ActionCost::funds(5),
            cooldown: 0,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([10, 30, 10, 0, 20]),
            effect: town_hall,
        },
        ActionDefinition {
            id: ActionId::from("canvass"),
            name: "Canvass",
            description: "Flood the weakest region with volunteers.",
            cost: ActionCost::funds(15),
            cooldown: 0,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([30, 0, 0, 0, 30]),
            effect: canvass,
        },
        ActionDefinition {
            id: ActionId::from("media_tour"),
            name: "Media Tour",
            description: "Hit every morning show and podcast in a week.",
            cost: ActionCost::clout(10),
            cooldown: 2,
            locked_from: None,
            requirement: None,
            faction_modifiers: modifiers([10, 10, -10, 20, 0]),
            effect: media_tour,
        },
        ActionDefinition {
            id: ActionId::from("opposition_research"),
            name: "Opposition Research",
            description: "Dig up something damaging on the other side.",
            cost: ActionCost {
                funds: 25,
                clout: 5,
            },
            cooldown: 3,
            locked_from: Some(RiskZone::Danger),
            requirement: None,
            faction_modifiers: modifiers([-30, -40, 30, 0, 50]),
            effect: opposition_research,
        },
        ActionDefinition {
            id: ActionId::from("attack_ads"),
            name: "Attack Ads",
            description: "Run negative ads against the opponent.",
            cost: ActionCost::funds(20),
            cooldown: 0,
            locked_from: Some(RiskZone::Critical),
            requirement: None,
            faction_modifiers: modifiers([-50, -60, 40, -20, 80]),
            effect: attack_ads,
        },
        ActionDefinition {
            id: ActionId::from("damage_control"),
            name: "Damage Control",
            description: "Spin the story before it spins you.",
            cost: ActionCost::funds(20),
            cooldown: 0,
            locked_from: None,
            requirement: Some(Requirement::MinRisk(10)),
            faction_modifiers: BTreeMap::new(),
            effect: damage_control,
        },
        ActionDefinition {
            id: ActionId::from("endorsements"),
            name: "Endorsements",
            description: "Call in favors from party heavyweights.",
            cost: ActionCost::clout(20),
            cooldown: 4,
            locked_from: None,
            requirement: Some(Requirement::MinTurn(5)),
            faction_modifiers: modifiers([10, 40, 20, -30, -90]),
            effect: endorsements,
        },
        ActionDefinition {
            id: ActionId::from("regroup"),
            name: "Regroup",
            description: "Skip the spotlight for a turn and reset the team.",
            cost: ActionCost::free(),
            cooldown: 0,
            locked_from: None,
            requirement: None,
            faction_modifiers: BTreeMap::new(),
            effect: regroup,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_unique_ids() {
        let registry = ActionRegistry::standard();
        let rebuilt = ActionRegistry::new(registry.iter().cloned().collect()).unwrap();
        assert_eq!(rebuilt.len(), registry.len());
        assert!(registry.get("rally").is_some());
        assert!(registry.get("moonshot").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let rally = ActionRegistry::standard().get("rally").cloned().unwrap();
        let err = ActionRegistry::new(vec![rally.clone(), rally]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn canvass_targets_weakest_region() {
        let mut state = GameState::default();
        state.support.insert("VT".to_string(), 12);
        let outcome = ActionRegistry::standard()
            .get("canvass")
            .unwrap()
            .base_outcome(&state);
        assert_eq!(outcome.support.get(&RegionKey::code("VT")), Some(&6));
    }

    #[test]
    fn requirements_check_pre_turn_state() {
        let mut state = GameState::default();
        assert!(!Requirement::MinTurn(5).is_met(&state));
        assert!(!Requirement::MinRisk(10).is_met(&state));
        state.turn = 5;
        state.risk = 10;
        assert!(Requirement::MinTurn(5).is_met(&state));
        assert!(Requirement::MinRisk(10).is_met(&state));
        assert!(!Requirement::MaxRisk(9).is_met(&state));
    }
}
