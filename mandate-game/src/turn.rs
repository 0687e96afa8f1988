//! Turn resolution core.
//!
//! Every intent takes the current [`GameState`] by value and hands back a [`Resolution`] holding
//! either the successor state or the untouched state plus one news line explaining the
//! rejection. Nothing is mutated until every precondition has passed.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::actions::{ActionCost, ActionDefinition, ActionId, ActionRegistry, Requirement};
use crate::advisors::discount_pct;
use crate::config::EngineConfig;
use crate::constants::SPIN_ACTION_ID;
use crate::error::EngineError;
use crate::events::{ActiveChain, EventCatalog, EventSource, SchedulerContext, Scheduled, schedule};
use crate::factions::FactionId;
use crate::modifiers::{ModifierReport, PipelineInput, run_pipeline};
use crate::numbers::{round_f64_to_i32, scale_positive};
use crate::outcome::Outcome;
use crate::risk::RiskZone;
use crate::rng::RandomSource;
use crate::sentiment::{Incident, faction_deltas};
use crate::session::ChallengeModifier;
use crate::spin::{Combo, ReelSlot, Reels, SpinState, reroll_cost};
use crate::state::GameState;
use crate::victory::{Verdict, apply_verdict, evaluate};

/// Why an intent was refused. The state is returned unchanged apart from one news line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("An event is waiting for a decision")]
    EventPending,
    #[error("Unknown action `{0}`")]
    UnknownAction(String),
    #[error("{action} is on cooldown for {turns} more turn(s)")]
    OnCooldown { action: String, turns: u32 },
    #[error("{action} is locked while risk is in the {zone} zone")]
    LockedByRisk { action: String, zone: RiskZone },
    #[error("{0} is not allowed under the current challenge")]
    DisallowedByChallenge(String),
    #[error("{action} is {requirement}")]
    RequirementNotMet {
        action: String,
        requirement: Requirement,
    },
    #[error("{action} needs {needed} funds, only {available} on hand")]
    InsufficientFunds {
        action: String,
        needed: i32,
        available: i32,
    },
    #[error("{action} needs {needed} clout, only {available} on hand")]
    InsufficientClout {
        action: String,
        needed: i32,
        available: i32,
    },
    #[error("There is no event to respond to")]
    NoPendingEvent,
    #[error("Option {index} does not exist; the event has {available}")]
    InvalidOption { index: usize, available: usize },
    #[error("No spin is in progress")]
    NoActiveSpin,
    #[error("A spin is already in progress")]
    SpinAlreadyActive,
    #[error("At most {max} reels can be locked")]
    TooManyLocks { max: usize },
    #[error("The campaign is over")]
    GameFinished,
}

/// Successor (or unchanged) state plus the intent's result.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    pub state: GameState,
    pub result: Result<T, Rejection>,
}

impl<T> Resolution<T> {
    fn accepted(state: GameState, value: T) -> Self {
        Self {
            state,
            result: Ok(value),
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

pub(crate) fn reject<T>(mut state: GameState, rejection: Rejection) -> Resolution<T> {
    log::warn!("intent rejected: {rejection}");
    state.push_news(format!("{rejection}."));
    Resolution {
        state,
        result: Err(rejection),
    }
}

/// Session-scoped memory the turn core reads and updates. Reset on load and reset.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub scheduler: SchedulerContext,
    pub first_action_taken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNotice {
    pub title: String,
    pub narrative: bool,
}

/// Everything that happened during one accepted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub action: ActionId,
    pub turn: u32,
    pub cost: ActionCost,
    /// Final outcome applied before incidents and events.
    pub outcome: Outcome,
    pub modifiers: ModifierReport,
    pub combo: Option<Combo>,
    pub incidents: Vec<Incident>,
    pub event: Option<EventNotice>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReport {
    pub option: String,
    pub outcome: Outcome,
    /// Id of the chain that finished with this choice.
    pub chain_completed: Option<String>,
    pub verdict: Verdict,
}

struct Commit<'a> {
    id: ActionId,
    name: &'a str,
    cost: ActionCost,
    cooldown: u32,
    faction_modifiers: &'a BTreeMap<FactionId, i32>,
    base: Outcome,
    combo: Option<Combo>,
}

/// Owns the immutable rule set and resolves intents against a state.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    registry: ActionRegistry,
    catalog: EventCatalog,
    reels: Reels,
    config: EngineConfig,
    challenge: Option<ChallengeModifier>,
}

impl TurnEngine {
    #[must_use]
    pub const fn new(
        registry: ActionRegistry,
        catalog: EventCatalog,
        reels: Reels,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            catalog,
            reels,
            config,
            challenge: None,
        }
    }

    /// Standard actions, bundled events and reels, default tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data fails to validate.
    pub fn standard() -> Result<Self, EngineError> {
        Ok(Self::new(
            ActionRegistry::standard(),
            EventCatalog::builtin()?,
            Reels::standard()?,
            EngineConfig::default_config(),
        ))
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: Option<ChallengeModifier>) -> Self {
        self.challenge = challenge;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn reels(&self) -> &Reels {
        &self.reels
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn challenge(&self) -> Option<&ChallengeModifier> {
        self.challenge.as_ref()
    }

    fn disallows(&self, action: &str) -> bool {
        matches!(&self.challenge, Some(ChallengeModifier::DisallowAction(id)) if id.as_str() == action)
    }

    /// Cost after advisor discounts and the risk-zone multiplier.
    #[must_use]
    pub fn adjusted_cost(&self, state: &GameState, action: &ActionDefinition) -> ActionCost {
        let discount = discount_pct(
            &state.advisors,
            action.id.as_str(),
            self.config.economy.max_discount_pct,
        );
        let factor = (1.0 - f64::from(discount) / 100.0)
            * state.risk_zone(&self.config).cost_multiplier(&self.config.risk);
        ActionCost {
            funds: round_f64_to_i32(f64::from(action.cost.funds) * factor),
            clout: round_f64_to_i32(f64::from(action.cost.clout) * factor),
        }
    }

    /// Run the action preconditions in order without touching the state.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] that applies.
    pub fn check_action(&self, state: &GameState, id: &str) -> Result<(&ActionDefinition, ActionCost), Rejection> {
        if state.pending_event.is_some() {
            return Err(Rejection::EventPending);
        }
        let action = self
            .registry
            .get(id)
            .ok_or_else(|| Rejection::UnknownAction(id.to_string()))?;
        let name = action.name.to_string();
        if self.disallows(id) {
            return Err(Rejection::DisallowedByChallenge(name));
        }
        let turns = state.cooldown_remaining(id);
        if turns > 0 {
            return Err(Rejection::OnCooldown {
                action: name,
                turns,
            });
        }
        let zone = state.risk_zone(&self.config);
        if zone.locks(action.locked_from) {
            return Err(Rejection::LockedByRisk { action: name, zone });
        }
        if let Some(requirement) = action.requirement
            && !requirement.is_met(state)
        {
            return Err(Rejection::RequirementNotMet {
                action: name,
                requirement,
            });
        }
        let cost = self.adjusted_cost(state, action);
        if state.funds < cost.funds {
            return Err(Rejection::InsufficientFunds {
                action: name,
                needed: cost.funds,
                available: state.funds,
            });
        }
        if state.clout < cost.clout {
            return Err(Rejection::InsufficientClout {
                action: name,
                needed: cost.clout,
                available: state.clout,
            });
        }
        Ok((action, cost))
    }

    /// Actions that would currently pass every precondition.
    #[must_use]
    pub fn available_actions(&self, state: &GameState) -> Vec<&ActionDefinition> {
        self.registry
            .iter()
            .filter(|action| self.check_action(state, action.id.as_str()).is_ok())
            .collect()
    }

    /// Resolve one action intent.
    pub fn resolve_action(
        &self,
        state: GameState,
        ctx: &mut SessionContext,
        rng: &mut dyn RandomSource,
        id: &str,
    ) -> Resolution<TurnReport> {
        let (action, cost) = match self.check_action(&state, id) {
            Ok(checked) => checked,
            Err(rejection) => return reject(state, rejection),
        };
        let commit = Commit {
            id: action.id.clone(),
            name: action.name,
            cost,
            cooldown: action.cooldown,
            faction_modifiers: &action.faction_modifiers,
            base: action.base_outcome(&state),
            combo: None,
        };
        let (state, report) = self.commit_turn(state, ctx, rng, commit);
        Resolution::accepted(state, report)
    }

    fn commit_turn(
        &self,
        mut state: GameState,
        ctx: &mut SessionContext,
        rng: &mut dyn RandomSource,
        commit: Commit<'_>,
    ) -> (GameState, TurnReport) {
        let cfg = &self.config;
        let risk_before = state.risk;
        state.funds -= commit.cost.funds;
        state.clout -= commit.cost.clout;

        let prior_uses = state.prior_uses(commit.id.as_str());
        let input = PipelineInput {
            action: commit.id.as_str(),
            prior_uses,
            first_action: !ctx.first_action_taken,
            advisors: &state.advisors,
            challenge: self.challenge.as_ref(),
        };
        let (mut outcome, modifiers) = run_pipeline(commit.base, &input, rng, &cfg.modifiers);

        state.sentiment.decay(state.turn, &cfg.sentiment);
        state.sentiment.record_action(
            state.turn,
            commit.name,
            commit.faction_modifiers,
            &cfg.sentiment,
        );
        for (faction, delta) in faction_deltas(
            outcome.broadcast_support(),
            commit.faction_modifiers,
            state.mode,
        ) {
            *outcome.factions.entry(faction).or_insert(0) += delta;
        }
        outcome.clout = scale_positive(
            outcome.clout,
            state.sentiment.clout_multiplier(&cfg.sentiment),
        );

        state.apply_outcome(&outcome);
        let headline = match &outcome.message {
            Some(message) => format!("Turn {}: {} - {message}", state.turn + 1, commit.name),
            None => format!("Turn {}: {}", state.turn + 1, commit.name),
        };
        state.push_news(headline);

        let incidents = state.sentiment.roll_incidents(rng, &cfg.sentiment);
        for incident in &incidents {
            state.apply_outcome(&incident.outcome);
            if let Some(message) = &incident.outcome.message {
                state.push_news(message.clone());
            }
        }

        state.turn += 1;
        state.action_cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
        if commit.cooldown > 0 {
            state
                .action_cooldowns
                .insert(commit.id.clone(), commit.cooldown);
        }
        state.consecutive_action_uses.clear();
        state
            .consecutive_action_uses
            .insert(commit.id.clone(), prior_uses + 1);
        ctx.first_action_taken = true;

        // Counters see narrative event effects too.
        let event = self.run_scheduler(&mut state, ctx, rng);
        state.streak = if state.risk > risk_before {
            0
        } else {
            state.streak + 1
        };
        state.bankrupt_turns = if state.funds <= 0 {
            state.bankrupt_turns + 1
        } else {
            0
        };
        let verdict = evaluate(&state, &cfg.victory);
        apply_verdict(&mut state, verdict);
        log::debug!(
            "turn {} committed: {} (risk {} -> {}, funds {}, clout {})",
            state.turn,
            commit.id,
            risk_before,
            state.risk,
            state.funds,
            state.clout
        );

        let report = TurnReport {
            action: commit.id,
            turn: state.turn,
            cost: commit.cost,
            outcome,
            modifiers,
            combo: commit.combo,
            incidents,
            event,
            verdict,
        };
        (state, report)
    }

    fn run_scheduler(
        &self,
        state: &mut GameState,
        ctx: &mut SessionContext,
        rng: &mut dyn RandomSource,
    ) -> Option<EventNotice> {
        let double_events = matches!(self.challenge, Some(ChallengeModifier::DoubleEvents));
        let decision = schedule(
            state.turn,
            state.active_chain.as_ref(),
            &self.catalog,
            &mut ctx.scheduler,
            rng,
            &self.config.events,
            double_events,
        );
        match decision {
            Scheduled::Nothing => None,
            Scheduled::Pending { event, chain } => {
                state.push_news(format!("Breaking: {}", event.title));
                let notice = EventNotice {
                    title: event.title.clone(),
                    narrative: false,
                };
                state.pending_event = Some(event);
                if chain.is_some() {
                    state.active_chain = chain;
                }
                Some(notice)
            }
            Scheduled::Narrative {
                title, outcome, ..
            } => {
                state.apply_outcome(&outcome);
                match &outcome.message {
                    Some(message) => state.push_news(format!("{title}: {message}")),
                    None => state.push_news(title.clone()),
                }
                Some(EventNotice {
                    title,
                    narrative: true,
                })
            }
            Scheduled::ChainBroken { chain_id } => {
                state.active_chain = None;
                ctx.scheduler.completed_chains.insert(chain_id);
                None
            }
        }
    }

    /// Answer the pending event with option `index`. The turn does not advance.
    pub fn resolve_event(
        &self,
        mut state: GameState,
        ctx: &mut SessionContext,
        index: usize,
    ) -> Resolution<EventReport> {
        let Some(pending) = state.pending_event.as_ref() else {
            return reject(state, Rejection::NoPendingEvent);
        };
        let Some(option) = pending.options.get(index).cloned() else {
            let available = pending.options.len();
            return reject(state, Rejection::InvalidOption { index, available });
        };
        let Some(pending) = state.pending_event.take() else {
            return reject(state, Rejection::NoPendingEvent);
        };

        let risk_before = state.risk;
        state.apply_outcome(&option.outcome);
        if state.risk > risk_before {
            state.streak = 0;
        }
        match &option.outcome.message {
            Some(message) => state.push_news(format!("{}: {} - {message}", pending.title, option.label)),
            None => state.push_news(format!("{}: {}", pending.title, option.label)),
        }

        let mut chain_completed = None;
        if let EventSource::Chain { chain_id, .. } = pending.source {
            match option.next.clone() {
                Some(step_id) => {
                    log::info!("chain `{chain_id}` advances to `{step_id}`");
                    state.active_chain = Some(ActiveChain { chain_id, step_id });
                }
                None => {
                    log::info!("chain `{chain_id}` completed");
                    state.active_chain = None;
                    ctx.scheduler.completed_chains.insert(chain_id.clone());
                    chain_completed = Some(chain_id);
                }
            }
        }

        let verdict = evaluate(&state, &self.config.victory);
        apply_verdict(&mut state, verdict);
        Resolution::accepted(
            state,
            EventReport {
                option: option.label,
                outcome: option.outcome,
                chain_completed,
                verdict,
            },
        )
    }

    /// Draw three reels for free.
    pub fn start_spin(&self, mut state: GameState, rng: &mut dyn RandomSource) -> Resolution<SpinState> {
        if state.pending_event.is_some() {
            return reject(state, Rejection::EventPending);
        }
        if state.spin.is_some() {
            return reject(state, Rejection::SpinAlreadyActive);
        }
        if self.disallows(SPIN_ACTION_ID) {
            return reject(state, Rejection::DisallowedByChallenge(String::from("Spin")));
        }
        let spin = self.reels.draw(rng);
        state.spin = Some(spin);
        Resolution::accepted(state, spin)
    }

    /// Lock or unlock a reel. Returns the new lock state.
    pub fn toggle_lock(&self, mut state: GameState, slot: ReelSlot) -> Resolution<bool> {
        if state.pending_event.is_some() {
            return reject(state, Rejection::EventPending);
        }
        let Some(mut spin) = state.spin else {
            return reject(state, Rejection::NoActiveSpin);
        };
        let locked = !spin.is_locked(slot);
        let max = self.config.spin.max_locks;
        if locked && spin.locked_count() >= max {
            return reject(state, Rejection::TooManyLocks { max });
        }
        spin.locks[slot.index()] = locked;
        state.spin = Some(spin);
        Resolution::accepted(state, locked)
    }

    /// Redraw the unlocked reels for clout. Returns the price paid.
    pub fn reroll(&self, mut state: GameState, rng: &mut dyn RandomSource) -> Resolution<i32> {
        if state.pending_event.is_some() {
            return reject(state, Rejection::EventPending);
        }
        let Some(mut spin) = state.spin else {
            return reject(state, Rejection::NoActiveSpin);
        };
        let cost = reroll_cost(spin.locked_rerolls, &self.config.spin);
        if state.clout < cost {
            let available = state.clout;
            return reject(
                state,
                Rejection::InsufficientClout {
                    action: String::from("Re-roll"),
                    needed: cost,
                    available,
                },
            );
        }
        state.clout -= cost;
        self.reels.reroll(&mut spin, rng);
        state.spin = Some(spin);
        Resolution::accepted(state, cost)
    }

    /// Cash in the current draw as this turn's intent.
    pub fn resolve_spin(
        &self,
        mut state: GameState,
        ctx: &mut SessionContext,
        rng: &mut dyn RandomSource,
    ) -> Resolution<TurnReport> {
        if state.pending_event.is_some() {
            return reject(state, Rejection::EventPending);
        }
        let Some(spin) = state.spin else {
            return reject(state, Rejection::NoActiveSpin);
        };
        if self.disallows(SPIN_ACTION_ID) {
            return reject(state, Rejection::DisallowedByChallenge(String::from("Spin")));
        }
        let Some((base, combo)) = self.reels.spin_outcome(&spin, &self.config.spin) else {
            log::error!("spin indices {:?} fall outside the reels", spin.reels);
            state.spin = None;
            return reject(state, Rejection::NoActiveSpin);
        };
        state.spin = None;
        let no_modifiers = BTreeMap::new();
        let commit = Commit {
            id: ActionId::from(SPIN_ACTION_ID),
            name: "Spin",
            cost: ActionCost::free(),
            cooldown: 0,
            faction_modifiers: &no_modifiers,
            base,
            combo: Some(combo),
        };
        let (state, report) = self.commit_turn(state, ctx, rng, commit);
        Resolution::accepted(state, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionKey;
    use crate::rng::ScriptedRolls;

    fn engine() -> TurnEngine {
        TurnEngine::new(
            ActionRegistry::standard(),
            EventCatalog::empty(),
            Reels::standard().unwrap(),
            EngineConfig::default(),
        )
    }

    #[test]
    fn adjusted_cost_applies_discount_and_zone() {
        let engine = engine();
        let mut state = GameState::default();
        state.advisors = vec![crate::advisors::AdvisorKind::Fixer];
        state.risk = 60;
        let action = engine.registry().get("opposition_research").unwrap();
        // 25 funds and 5 clout, 25% off, x1.25 in danger
        assert_eq!(
            engine.adjusted_cost(&state, action),
            ActionCost {
                funds: 23,
                clout: 5
            }
        );
    }

    #[test]
    fn cooldown_blocks_then_expires() {
        let engine = engine();
        let mut ctx = SessionContext::default();
        let mut rolls = ScriptedRolls::quiet();
        let state = GameState::default();
        let first = engine.resolve_action(state, &mut ctx, &mut rolls, "tv_ads");
        assert!(first.is_accepted());
        let blocked = engine.resolve_action(first.state, &mut ctx, &mut rolls, "tv_ads");
        assert!(matches!(
            blocked.result,
            Err(Rejection::OnCooldown { turns: 1, .. })
        ));
        let skip = engine.resolve_action(blocked.state, &mut ctx, &mut rolls, "regroup");
        assert!(skip.is_accepted());
        let again = engine.resolve_action(skip.state, &mut ctx, &mut rolls, "tv_ads");
        assert!(again.is_accepted());
    }

    #[test]
    fn unknown_action_is_rejected_with_news() {
        let engine = engine();
        let mut ctx = SessionContext::default();
        let mut rolls = ScriptedRolls::quiet();
        let state = GameState::default();
        let resolution = engine.resolve_action(state.clone(), &mut ctx, &mut rolls, "moonshot");
        assert_eq!(
            resolution.result.unwrap_err(),
            Rejection::UnknownAction("moonshot".to_string())
        );
        assert_eq!(resolution.state.news.len(), state.news.len() + 1);
        assert_eq!(resolution.state.turn, 0);
    }

    #[test]
    fn faction_support_follows_broadcast_delta() {
        let engine = engine();
        let mut ctx = SessionContext::default();
        ctx.first_action_taken = true;
        let mut rolls = ScriptedRolls::quiet();
        let resolution = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "rally");
        let report = resolution.result.unwrap();
        // rally broadcasts +2; progressives +20% -> 2, conservatives -10% -> 2
        assert_eq!(report.outcome.support[&RegionKey::All], 2);
        assert_eq!(report.outcome.factions[&FactionId::Progressives], 2);
        assert_eq!(resolution.state.faction_support[&FactionId::Conservatives], 52);
    }

    #[test]
    fn spin_flow_charges_rerolls_and_resolves_as_turn() {
        let engine = engine();
        let mut ctx = SessionContext::default();
        let mut rolls = ScriptedRolls::quiet();
        let started = engine.start_spin(GameState::default(), &mut rolls);
        assert!(started.is_accepted());
        let again = engine.start_spin(started.state, &mut rolls);
        assert_eq!(again.result.unwrap_err(), Rejection::SpinAlreadyActive);

        let locked = engine.toggle_lock(again.state, ReelSlot::Action);
        assert_eq!(locked.result, Ok(true));
        let locked = engine.toggle_lock(locked.state, ReelSlot::Modifier);
        let too_many = engine.toggle_lock(locked.state, ReelSlot::Target);
        assert_eq!(too_many.result.unwrap_err(), Rejection::TooManyLocks { max: 2 });

        let first = engine.reroll(too_many.state, &mut rolls);
        assert_eq!(first.result, Ok(5));
        let second = engine.reroll(first.state, &mut rolls);
        assert_eq!(second.result, Ok(8));
        assert_eq!(second.state.clout, 37);

        let resolved = engine.resolve_spin(second.state, &mut ctx, &mut rolls);
        let report = resolved.result.unwrap();
        assert_eq!(report.action.as_str(), SPIN_ACTION_ID);
        assert!(report.combo.is_some());
        assert_eq!(resolved.state.turn, 1);
        assert!(resolved.state.spin.is_none());
    }

    #[test]
    fn reroll_without_clout_reports_balance() {
        let engine = engine();
        let mut rolls = ScriptedRolls::quiet();
        let started = engine.start_spin(GameState::default(), &mut rolls);
        let mut state = started.state;
        state.clout = 3;
        let refused = engine.reroll(state, &mut rolls);
        assert_eq!(
            refused.result.unwrap_err(),
            Rejection::InsufficientClout {
                action: "Re-roll".to_string(),
                needed: 5,
                available: 3,
            }
        );
        assert_eq!(refused.state.clout, 3);
        assert!(refused.state.spin.is_some());
    }

    #[test]
    fn locks_wait_for_pending_event() {
        let engine = engine();
        let mut rolls = ScriptedRolls::quiet();
        let mut state = engine.start_spin(GameState::default(), &mut rolls).state;
        state.pending_event = Some(crate::events::PendingEvent {
            source: EventSource::OneShot {
                event_id: "debate_night".to_string(),
            },
            title: "Debate Night".to_string(),
            description: String::new(),
            options: Vec::new(),
        });
        let refused = engine.toggle_lock(state, ReelSlot::Action);
        assert_eq!(refused.result.unwrap_err(), Rejection::EventPending);
        assert_eq!(refused.state.spin.map(|spin| spin.locked_count()), Some(0));
    }

    #[test]
    fn resolve_event_without_pending_is_rejected() {
        let engine = engine();
        let mut ctx = SessionContext::default();
        let resolution = engine.resolve_event(GameState::default(), &mut ctx, 0);
        assert_eq!(resolution.result.unwrap_err(), Rejection::NoPendingEvent);
    }
}
