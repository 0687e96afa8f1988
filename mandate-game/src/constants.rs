//! Fixed limits and identifiers shared across the engine.
//!
//! Balance numbers live in [`crate::config::EngineConfig`]; what stays here are the structural
//! bounds the state shape depends on.

/// Most recent news lines retained on the state.
pub const NEWS_LOG_LIMIT: usize = 60;
/// Most recent faction reactions retained on the sentiment state.
pub const MAX_REACTIONS: usize = 10;

pub const SUPPORT_MIN: i32 = 0;
pub const SUPPORT_MAX: i32 = 100;
pub const RISK_MIN: i32 = 0;
pub const RISK_MAX: i32 = 100;
pub const MOMENTUM_LIMIT: f64 = 100.0;

/// Action id under which spin resolutions flow through the turn core.
pub const SPIN_ACTION_ID: &str = "spin";

/// Mood threshold past which faction incidents start to fire.
pub const INCIDENT_MOMENTUM_THRESHOLD: f64 = 60.0;
