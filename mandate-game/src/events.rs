//! Narrative events: the catalog, chain state machine and per-turn scheduling.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::config::EventCfg;
use crate::error::EngineError;
use crate::outcome::Outcome;
use crate::rng::{RandomSource, RngStream, pick_weighted};

const DEFAULT_EVENTS_DATA: &str = include_str!("../assets/events.json");

const fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    pub label: String,
    #[serde(default)]
    pub outcome: Outcome,
    /// Chain step this option leads to; `None` ends the chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// One-shot event. Without options it is narrative and its outcome applies immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub min_turn: u32,
    #[serde(default)]
    pub options: Vec<EventOption>,
    #[serde(default)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<EventOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_turn: u32,
    pub start: String,
    pub steps: Vec<ChainStep>,
}

impl ChainDefinition {
    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&ChainStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    #[serde(default)]
    pub events: Vec<EventDefinition>,
    #[serde(default)]
    pub chains: Vec<ChainDefinition>,
}

impl EventCatalog {
    /// Catalog with no events; the scheduler never fires.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bundled event set.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data fails to parse or validate.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_EVENTS_DATA)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Json`] for malformed input or [`EngineError::InvalidCatalog`] when
    /// validation fails.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check id uniqueness, chain entry points, step options and `next` references.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCatalog`] describing the first problem found.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidCatalog(msg));
        let mut event_ids = HashSet::new();
        for event in &self.events {
            if !event_ids.insert(event.id.as_str()) {
                return invalid(format!("duplicate event id `{}`", event.id));
            }
            if event.options.iter().any(|option| option.next.is_some()) {
                return invalid(format!("one-shot event `{}` has a chained option", event.id));
            }
        }
        let mut chain_ids = HashSet::new();
        for chain in &self.chains {
            if !chain_ids.insert(chain.id.as_str()) {
                return invalid(format!("duplicate chain id `{}`", chain.id));
            }
            let mut step_ids = HashSet::new();
            for step in &chain.steps {
                if !step_ids.insert(step.id.as_str()) {
                    return invalid(format!("chain `{}` repeats step `{}`", chain.id, step.id));
                }
                if step.options.is_empty() {
                    return invalid(format!(
                        "chain `{}` step `{}` has no options",
                        chain.id, step.id
                    ));
                }
            }
            if !step_ids.contains(chain.start.as_str()) {
                return invalid(format!(
                    "chain `{}` starts at missing step `{}`",
                    chain.id, chain.start
                ));
            }
            for step in &chain.steps {
                for option in &step.options {
                    if let Some(next) = &option.next
                        && !step_ids.contains(next.as_str())
                    {
                        return invalid(format!(
                            "chain `{}` step `{}` points at missing step `{next}`",
                            chain.id, step.id
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn event(&self, id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|event| event.id == id)
    }

    #[must_use]
    pub fn chain(&self, id: &str) -> Option<&ChainDefinition> {
        self.chains.iter().find(|chain| chain.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.chains.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventSource {
    OneShot { event_id: String },
    Chain { chain_id: String, step_id: String },
}

/// Decision awaiting the player; blocks every action intent while present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEvent {
    pub source: EventSource,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<EventOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChain {
    pub chain_id: String,
    pub step_id: String,
}

/// Session-scoped scheduling memory. Not persisted with the state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerContext {
    pub shown_events: BTreeSet<String>,
    pub completed_chains: BTreeSet<String>,
}

/// What the scheduler decided for the turn that just finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled {
    Nothing,
    Pending {
        event: PendingEvent,
        chain: Option<ActiveChain>,
    },
    Narrative {
        event_id: String,
        title: String,
        outcome: Outcome,
    },
    /// The active chain points at a step the catalog no longer has.
    ChainBroken { chain_id: String },
}

impl PendingEvent {
    fn from_step(chain_id: &str, step: &ChainStep) -> Self {
        Self {
            source: EventSource::Chain {
                chain_id: chain_id.to_string(),
                step_id: step.id.clone(),
            },
            title: step.title.clone(),
            description: step.description.clone(),
            options: step.options.clone(),
        }
    }
}

/// Decide whether an event follows the turn that just advanced `turn`.
pub fn schedule(
    turn: u32,
    active_chain: Option<&ActiveChain>,
    catalog: &EventCatalog,
    ctx: &mut SchedulerContext,
    rng: &mut dyn RandomSource,
    cfg: &EventCfg,
    double_events: bool,
) -> Scheduled {
    if let Some(active) = active_chain {
        let step = catalog
            .chain(&active.chain_id)
            .and_then(|chain| chain.step(&active.step_id));
        return match step {
            Some(step) => Scheduled::Pending {
                event: PendingEvent::from_step(&active.chain_id, step),
                chain: Some(active.clone()),
            },
            None => {
                debug_assert!(
                    false,
                    "chain `{}` lost step `{}`",
                    active.chain_id, active.step_id
                );
                log::error!(
                    "chain `{}` points at missing step `{}`; ending chain",
                    active.chain_id,
                    active.step_id
                );
                Scheduled::ChainBroken {
                    chain_id: active.chain_id.clone(),
                }
            }
        };
    }

    if turn == 1 {
        return pick_one_shot(turn, catalog, ctx, rng);
    }

    let factor = if double_events {
        cfg.double_events_factor
    } else {
        1.0
    };
    if !rng.chance(RngStream::Event, (cfg.event_chance * factor).min(1.0)) {
        return Scheduled::Nothing;
    }
    if rng.chance(RngStream::Event, cfg.chain_chance)
        && let Some(started) = start_chain(turn, catalog, ctx, rng)
    {
        return started;
    }
    pick_one_shot(turn, catalog, ctx, rng)
}

fn start_chain(
    turn: u32,
    catalog: &EventCatalog,
    ctx: &SchedulerContext,
    rng: &mut dyn RandomSource,
) -> Option<Scheduled> {
    let eligible: Vec<&ChainDefinition> = catalog
        .chains
        .iter()
        .filter(|chain| chain.min_turn <= turn && !ctx.completed_chains.contains(&chain.id))
        .collect();
    if eligible.is_empty() {
        return None;
    }
    let chain = eligible[rng.pick(RngStream::Event, eligible.len())];
    let step = chain.step(&chain.start)?;
    log::info!("chain `{}` opens on turn {turn}", chain.id);
    Some(Scheduled::Pending {
        event: PendingEvent::from_step(&chain.id, step),
        chain: Some(ActiveChain {
            chain_id: chain.id.clone(),
            step_id: step.id.clone(),
        }),
    })
}

fn pick_one_shot(
    turn: u32,
    catalog: &EventCatalog,
    ctx: &mut SchedulerContext,
    rng: &mut dyn RandomSource,
) -> Scheduled {
    let eligible: Vec<&EventDefinition> = catalog
        .events
        .iter()
        .filter(|event| event.min_turn <= turn)
        .collect();
    let unseen: Vec<&EventDefinition> = eligible
        .iter()
        .copied()
        .filter(|event| !ctx.shown_events.contains(&event.id))
        .collect();
    let pool = if unseen.iter().any(|event| event.weight > 0) {
        unseen
    } else {
        eligible
    };
    let weights: Vec<u32> = pool.iter().map(|event| event.weight).collect();
    let Some(idx) = pick_weighted(rng, RngStream::Event, &weights) else {
        return Scheduled::Nothing;
    };
    let event = pool[idx];
    ctx.shown_events.insert(event.id.clone());
    log::debug!("event `{}` scheduled on turn {turn}", event.id);
    if event.options.is_empty() {
        Scheduled::Narrative {
            event_id: event.id.clone(),
            title: event.title.clone(),
            outcome: event.outcome.clone(),
        }
    } else {
        Scheduled::Pending {
            event: PendingEvent {
                source: EventSource::OneShot {
                    event_id: event.id.clone(),
                },
                title: event.title.clone(),
                description: event.description.clone(),
                options: event.options.clone(),
            },
            chain: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;

    fn catalog() -> EventCatalog {
        EventCatalog::from_json(
            r#"{
                "events": [
                    {"id": "debate", "title": "Debate", "options": [{"label": "Attack"}, {"label": "Stay calm"}]},
                    {"id": "heat", "title": "Heat Wave", "weight": 3, "outcome": {"risk": 1}},
                    {"id": "late", "title": "Late Surprise", "min_turn": 30, "outcome": {"funds": 5}}
                ],
                "chains": [
                    {"id": "leak", "name": "The Leak", "start": "a", "steps": [
                        {"id": "a", "title": "Leak", "options": [{"label": "Deny", "next": "b"}, {"label": "Own it"}]},
                        {"id": "b", "title": "Fallout", "options": [{"label": "Resign staffer"}]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn builtin_catalog_validates() {
        let catalog = EventCatalog::builtin().unwrap();
        assert!(!catalog.events.is_empty());
        assert!(!catalog.chains.is_empty());
    }

    #[test]
    fn validation_catches_dangling_next() {
        let err = EventCatalog::from_json(
            r#"{"chains": [{"id": "c", "name": "C", "start": "a", "steps": [
                {"id": "a", "title": "A", "options": [{"label": "go", "next": "zz"}]}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalog(_)));
    }

    #[test]
    fn validation_catches_step_without_options() {
        let err = EventCatalog::from_json(
            r#"{"chains": [{"id": "c", "name": "C", "start": "a", "steps": [
                {"id": "a", "title": "A", "options": []}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalog(_)));
    }

    #[test]
    fn validation_catches_duplicate_ids() {
        let err = EventCatalog::from_json(
            r#"{"events": [{"id": "x", "title": "X"}, {"id": "x", "title": "Y"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalog(_)));
    }

    #[test]
    fn first_turn_always_schedules_a_one_shot() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        let mut rolls = ScriptedRolls::quiet();
        let decision = schedule(1, None, &catalog, &mut ctx, &mut rolls, &EventCfg::default(), false);
        assert!(matches!(
            decision,
            Scheduled::Pending { chain: None, .. } | Scheduled::Narrative { .. }
        ));
        assert_eq!(ctx.shown_events.len(), 1);
    }

    #[test]
    fn quiet_rolls_schedule_nothing_after_turn_one() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        let mut rolls = ScriptedRolls::quiet();
        let decision = schedule(4, None, &catalog, &mut ctx, &mut rolls, &EventCfg::default(), false);
        assert_eq!(decision, Scheduled::Nothing);
    }

    #[test]
    fn double_events_doubles_the_chance() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        let cfg = EventCfg::default();
        let mut rolls = ScriptedRolls::quiet().with_sequence(RngStream::Event, &[0.45]);
        assert_eq!(
            schedule(4, None, &catalog, &mut ctx, &mut rolls, &cfg, false),
            Scheduled::Nothing
        );
        let mut rolls = ScriptedRolls::quiet().with_sequence(RngStream::Event, &[0.45, 0.9, 0.0]);
        assert_ne!(
            schedule(4, None, &catalog, &mut ctx, &mut rolls, &cfg, true),
            Scheduled::Nothing
        );
    }

    #[test]
    fn unseen_events_are_preferred() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        ctx.shown_events.insert("heat".to_string());
        let mut rolls = ScriptedRolls::constant(0.99);
        let decision = schedule(1, None, &catalog, &mut ctx, &mut rolls, &EventCfg::default(), false);
        match decision {
            Scheduled::Pending { event, .. } => assert_eq!(
                event.source,
                EventSource::OneShot {
                    event_id: "debate".to_string()
                }
            ),
            other => panic!("expected debate, got {other:?}"),
        }
    }

    #[test]
    fn chain_starts_then_replays_active_step() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        let cfg = EventCfg::default();
        let mut rolls = ScriptedRolls::quiet().with_sequence(RngStream::Event, &[0.0, 0.0, 0.0]);
        let decision = schedule(6, None, &catalog, &mut ctx, &mut rolls, &cfg, false);
        let Scheduled::Pending {
            chain: Some(active), ..
        } = decision
        else {
            panic!("expected the chain to open");
        };
        assert_eq!(active.step_id, "a");

        let mut quiet = ScriptedRolls::quiet();
        let again = schedule(7, Some(&active), &catalog, &mut ctx, &mut quiet, &cfg, false);
        assert!(matches!(again, Scheduled::Pending { chain: Some(_), .. }));
    }

    #[test]
    fn completed_chain_falls_back_to_one_shot() {
        let catalog = catalog();
        let mut ctx = SchedulerContext::default();
        ctx.completed_chains.insert("leak".to_string());
        let mut rolls = ScriptedRolls::quiet().with_sequence(RngStream::Event, &[0.0, 0.0, 0.0]);
        let decision = schedule(6, None, &catalog, &mut ctx, &mut rolls, &EventCfg::default(), false);
        assert!(matches!(
            decision,
            Scheduled::Pending { chain: None, .. } | Scheduled::Narrative { .. }
        ));
    }
}
