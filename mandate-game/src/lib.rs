//! Mandate Game Engine
//!
//! Platform-agnostic turn resolution for the Mandate political campaign game.
//! This crate provides all campaign mechanics without UI or platform-specific dependencies.

pub mod actions;
pub mod advisors;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod factions;
pub mod modifiers;
pub mod numbers;
pub mod outcome;
pub mod regions;
pub mod risk;
pub mod rng;
pub mod seed;
pub mod sentiment;
pub mod session;
pub mod spin;
pub mod state;
pub mod turn;
pub mod victory;

use anyhow::Context;

// Re-export commonly used types
pub use actions::{ActionCost, ActionDefinition, ActionId, ActionRegistry, Requirement};
pub use advisors::{AdvisorAbility, AdvisorKind, AdvisorRoster, CostDiscount, resolve_roster};
pub use config::{
    EconomyCfg, EngineConfig, EventCfg, ModifierCfg, RiskCfg, SentimentCfg, SpinCfg, VictoryCfg,
};
pub use error::EngineError;
pub use events::{
    ActiveChain, ChainDefinition, ChainStep, EventCatalog, EventDefinition, EventOption,
    EventSource, PendingEvent, SchedulerContext,
};
pub use factions::{FactionId, GameMode};
pub use modifiers::{BonusKind, ModifierReport};
pub use outcome::Outcome;
pub use regions::RegionKey;
pub use risk::RiskZone;
pub use rng::{RandomSource, RngBundle, RngStream, ScriptedRolls};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy, parse_share_code};
pub use sentiment::{FactionMood, Incident, IncidentKind, MoodLevel, Reaction, SentimentState};
pub use session::{
    ChallengeModifier, ChallengeProvider, GameSession, SessionSetup, StartingBonusProvider,
    StartingBonuses,
};
pub use spin::{Combo, ComboTier, ReelItem, ReelSlot, Reels, SpinState, ThemeTag};
pub use state::GameState;
pub use turn::{
    EventNotice, EventReport, Rejection, Resolution, SessionContext, TurnEngine, TurnReport,
};
pub use victory::{DefeatType, Verdict, VictoryType};

/// Name of the engine tuning document requested from [`DataLoader::load_config`].
pub const ENGINE_CONFIG_NAME: &str = "engine";

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the event and chain catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_event_catalog(&self) -> Result<EventCatalog, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for managing campaign instances
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
    L::Error: Into<anyhow::Error>,
    S::Error: Into<anyhow::Error>,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    fn load_config(&self) -> anyhow::Result<EngineConfig> {
        let config: EngineConfig = self
            .data_loader
            .load_config(ENGINE_CONFIG_NAME)
            .map_err(Into::into)
            .context("loading engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Assemble turn rules from loaded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or configuration cannot be loaded or fails validation.
    pub fn turn_engine(&self) -> anyhow::Result<TurnEngine> {
        let catalog = self
            .data_loader
            .load_event_catalog()
            .map_err(Into::into)
            .context("loading event catalog")?;
        catalog.validate()?;
        let config = self.load_config()?;
        Ok(TurnEngine::new(
            ActionRegistry::standard(),
            catalog,
            Reels::standard()?,
            config,
        ))
    }

    /// Create a new campaign state for the setup
    ///
    /// # Errors
    ///
    /// Returns an error if the engine data cannot be loaded.
    pub fn create_game(&self, setup: SessionSetup) -> anyhow::Result<GameState> {
        self.create_session(setup).map(GameSession::into_state)
    }

    /// Construct a new session encompassing rules, state and random streams.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine data cannot be loaded.
    pub fn create_session(&self, setup: SessionSetup) -> anyhow::Result<GameSession> {
        Ok(GameSession::new(self.turn_engine()?, setup))
    }

    /// Resume a saved campaign with fresh seed-derived random streams.
    ///
    /// # Errors
    ///
    /// Returns an error if the save or the engine data cannot be loaded.
    pub fn resume_session(&self, save_name: &str) -> anyhow::Result<Option<GameSession>> {
        let Some(state) = self.load_game(save_name)? else {
            return Ok(None);
        };
        let rng = Box::new(RngBundle::from_user_seed(state.seed));
        Ok(Some(GameSession::from_state(self.turn_engine()?, state, rng)))
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> anyhow::Result<()> {
        self.storage
            .save_game(save_name, game_state)
            .map_err(Into::into)
            .with_context(|| format!("saving {save_name}"))
    }

    /// Load a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded or rehydrated.
    pub fn load_game(&self, save_name: &str) -> anyhow::Result<Option<GameState>> {
        let loaded = self
            .storage
            .load_game(save_name)
            .map_err(Into::into)
            .with_context(|| format!("loading {save_name}"))?;
        let Some(game_state) = loaded else {
            return Ok(None);
        };
        let config = self.load_config()?;
        Ok(Some(game_state.rehydrate(&config)))
    }

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> anyhow::Result<()> {
        self.storage.delete_save(save_name).map_err(Into::into)
    }
}
