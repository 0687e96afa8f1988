//! Session wrapper: binds a state to its rules, session context and random source.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actions::ActionId;
use crate::advisors::{AdvisorKind, AdvisorRoster, resolve_roster};
use crate::error::EngineError;
use crate::factions::{FactionId, GameMode};
use crate::rng::{RandomSource, RngBundle};
use crate::spin::{ReelSlot, SpinState};
use crate::state::GameState;
use crate::turn::{EventReport, Rejection, Resolution, SessionContext, TurnEngine, TurnReport, reject};

/// Meta-progression perks injected into a fresh campaign.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartingBonuses {
    #[serde(default)]
    pub clout: i32,
    #[serde(default)]
    pub funds: i32,
    /// Added to every region.
    #[serde(default)]
    pub region_support: i32,
    #[serde(default)]
    pub faction_support: BTreeMap<FactionId, i32>,
}

pub trait StartingBonusProvider {
    fn starting_bonuses(&self) -> StartingBonuses;
}

impl StartingBonusProvider for StartingBonuses {
    fn starting_bonuses(&self) -> StartingBonuses {
        self.clone()
    }
}

/// Optional rule twist for a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeModifier {
    DisallowAction(ActionId),
    DoubleRisk,
    DoubleEvents,
}

pub trait ChallengeProvider {
    fn active_challenge(&self) -> Option<ChallengeModifier>;
}

impl ChallengeProvider for Option<ChallengeModifier> {
    fn active_challenge(&self) -> Option<ChallengeModifier> {
        self.clone()
    }
}

/// Everything needed to (re)build a fresh campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    pub mode: GameMode,
    pub seed: u64,
    pub advisors: Vec<AdvisorKind>,
    pub bonuses: StartingBonuses,
    pub challenge: Option<ChallengeModifier>,
}

impl SessionSetup {
    #[must_use]
    pub fn new(mode: GameMode, seed: u64) -> Self {
        Self {
            mode,
            seed,
            advisors: Vec::new(),
            bonuses: StartingBonuses::default(),
            challenge: None,
        }
    }

    /// Resolve the roster's advisor names once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAdvisor`] for a name that is not an advisor.
    pub fn with_roster<R: AdvisorRoster + ?Sized>(mut self, roster: &R) -> Result<Self, EngineError> {
        self.advisors = resolve_roster(roster)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_bonuses<P: StartingBonusProvider + ?Sized>(mut self, provider: &P) -> Self {
        self.bonuses = provider.starting_bonuses();
        self
    }

    #[must_use]
    pub fn with_challenge<P: ChallengeProvider + ?Sized>(mut self, provider: &P) -> Self {
        self.challenge = provider.active_challenge();
        self
    }

    fn fresh_state(&self, engine: &TurnEngine) -> GameState {
        GameState::new(self.mode, self.seed, engine.config())
            .with_advisors(self.advisors.clone())
            .with_challenge(self.challenge.clone())
            .with_starting_bonuses(&self.bonuses)
    }
}

/// Single writer of one campaign's state.
pub struct GameSession {
    engine: TurnEngine,
    setup: SessionSetup,
    state: GameState,
    ctx: SessionContext,
    rng: Box<dyn RandomSource>,
}

impl GameSession {
    /// Fresh campaign with random streams derived from the setup seed.
    #[must_use]
    pub fn new(engine: TurnEngine, setup: SessionSetup) -> Self {
        let rng = Box::new(RngBundle::from_user_seed(setup.seed));
        Self::with_rng(engine, setup, rng)
    }

    /// Fresh campaign drawing from an injected random source.
    #[must_use]
    pub fn with_rng(engine: TurnEngine, setup: SessionSetup, rng: Box<dyn RandomSource>) -> Self {
        let engine = engine.with_challenge(setup.challenge.clone());
        let state = setup.fresh_state(&engine);
        log::info!(
            "campaign start: mode {:?}, seed {}, {} advisor(s)",
            setup.mode,
            setup.seed,
            setup.advisors.len()
        );
        Self {
            engine,
            setup,
            state,
            ctx: SessionContext::default(),
            rng,
        }
    }

    /// Resume a saved campaign. The state is rehydrated and session context starts empty.
    /// A challenge stored in the save takes precedence over the engine's.
    #[must_use]
    pub fn from_state(engine: TurnEngine, state: GameState, rng: Box<dyn RandomSource>) -> Self {
        let mut state = state.rehydrate(engine.config());
        let challenge = state
            .challenge
            .clone()
            .or_else(|| engine.challenge().cloned());
        let engine = engine.with_challenge(challenge.clone());
        state.challenge.clone_from(&challenge);
        let setup = SessionSetup {
            mode: state.mode,
            seed: state.seed,
            advisors: state.advisors.clone(),
            bonuses: StartingBonuses::default(),
            challenge,
        };
        Self {
            engine,
            setup,
            state,
            ctx: SessionContext::default(),
            rng,
        }
    }

    fn run<T>(
        &mut self,
        intent: impl FnOnce(&TurnEngine, GameState, &mut SessionContext, &mut dyn RandomSource) -> Resolution<T>,
    ) -> Result<T, Rejection> {
        let state = std::mem::take(&mut self.state);
        let resolution = if state.game_over {
            reject(state, Rejection::GameFinished)
        } else {
            intent(&self.engine, state, &mut self.ctx, self.rng.as_mut())
        };
        self.state = resolution.state;
        resolution.result
    }

    /// Spend the turn on a registry action.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] when the action cannot be taken; the state only gains a news line.
    pub fn take_action(&mut self, action: &str) -> Result<TurnReport, Rejection> {
        self.run(|engine, state, ctx, rng| engine.resolve_action(state, ctx, rng, action))
    }

    /// Answer the pending event.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::NoPendingEvent`] or [`Rejection::InvalidOption`].
    pub fn choose_option(&mut self, index: usize) -> Result<EventReport, Rejection> {
        self.run(|engine, state, ctx, _| engine.resolve_event(state, ctx, index))
    }

    /// # Errors
    ///
    /// Returns a [`Rejection`] when an event is pending or a spin is already running.
    pub fn start_spin(&mut self) -> Result<SpinState, Rejection> {
        self.run(|engine, state, _, rng| engine.start_spin(state, rng))
    }

    /// # Errors
    ///
    /// Returns a [`Rejection`] without an active spin or past the lock limit.
    pub fn toggle_lock(&mut self, slot: ReelSlot) -> Result<bool, Rejection> {
        self.run(|engine, state, _, _| engine.toggle_lock(state, slot))
    }

    /// # Errors
    ///
    /// Returns a [`Rejection`] without an active spin or enough clout.
    pub fn reroll(&mut self) -> Result<i32, Rejection> {
        self.run(|engine, state, _, rng| engine.reroll(state, rng))
    }

    /// # Errors
    ///
    /// Returns a [`Rejection`] without an active spin or while an event is pending.
    pub fn resolve_spin(&mut self) -> Result<TurnReport, Rejection> {
        self.run(|engine, state, ctx, rng| engine.resolve_spin(state, ctx, rng))
    }

    /// Discard the campaign and start over from defaults plus starting bonuses.
    pub fn reset(&mut self) {
        log::info!("campaign reset after turn {}", self.state.turn);
        self.state = self.setup.fresh_state(&self.engine);
        self.ctx = SessionContext::default();
    }

    /// Deterministically reseed the session and restart the campaign.
    pub fn reseed(&mut self, seed: u64) {
        self.setup.seed = seed;
        self.rng = Box::new(RngBundle::from_user_seed(seed));
        self.reset();
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }

    #[must_use]
    pub const fn setup(&self) -> &SessionSetup {
        &self.setup
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
