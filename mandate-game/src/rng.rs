//! Random sources for turn resolution.
//!
//! Every random draw the engine makes goes through [`RandomSource`], tagged with the
//! [`RngStream`] it belongs to. Production sessions use [`RngBundle`], which derives one
//! independent stream per subsystem from the user seed so that, for example, an extra spin
//! draw never shifts critical-hit rolls. Tests and replays use [`ScriptedRolls`].

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::{HashMap, VecDeque};

use crate::numbers::unit_to_index;

/// Subsystem a random draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngStream {
    Critical,
    Event,
    Faction,
    Spin,
}

impl RngStream {
    pub const ALL: [Self; 4] = [Self::Critical, Self::Event, Self::Faction, Self::Spin];

    #[must_use]
    pub const fn domain_tag(self) -> &'static [u8] {
        match self {
            Self::Critical => b"critical",
            Self::Event => b"event",
            Self::Faction => b"faction",
            Self::Spin => b"spin",
        }
    }
}

/// Injected source of randomness for the turn engine.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)` from the given stream.
    fn roll(&mut self, stream: RngStream) -> f64;

    /// Uniform index in `0..len`; returns 0 for empty ranges.
    fn pick(&mut self, stream: RngStream, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        unit_to_index(self.roll(stream), len)
    }

    /// Bernoulli trial with probability `chance` (clamped to `[0, 1]`).
    fn chance(&mut self, stream: RngStream, chance: f64) -> bool {
        let chance = chance.clamp(0.0, 1.0);
        chance > 0.0 && self.roll(stream) < chance
    }
}

/// Pick an index proportional to `weights`; `None` when every weight is zero.
pub fn pick_weighted(
    rng: &mut dyn RandomSource,
    stream: RngStream,
    weights: &[u32],
) -> Option<usize> {
    let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    if total == 0 {
        return None;
    }
    let target = rng.roll(stream) * f64::from(u32::try_from(total).unwrap_or(u32::MAX));
    let mut cumulative = 0.0;
    for (idx, weight) in weights.iter().enumerate() {
        if *weight == 0 {
            continue;
        }
        cumulative += f64::from(*weight);
        if target < cumulative {
            return Some(idx);
        }
    }
    weights.iter().rposition(|w| *w > 0)
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = match Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) {
        Ok(mac) => mac,
        Err(_) => return user_seed ^ 0x9E37_79B9_7F4A_7C15,
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Per-subsystem RNG streams derived from a single user-visible seed.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    critical: CountingRng<SmallRng>,
    event: CountingRng<SmallRng>,
    faction: CountingRng<SmallRng>,
    spin: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            critical: CountingRng::new(derive_stream_seed(seed, RngStream::Critical.domain_tag())),
            event: CountingRng::new(derive_stream_seed(seed, RngStream::Event.domain_tag())),
            faction: CountingRng::new(derive_stream_seed(seed, RngStream::Faction.domain_tag())),
            spin: CountingRng::new(derive_stream_seed(seed, RngStream::Spin.domain_tag())),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws taken from a stream so far.
    #[must_use]
    pub const fn draws(&self, stream: RngStream) -> u64 {
        match stream {
            RngStream::Critical => self.critical.draws(),
            RngStream::Event => self.event.draws(),
            RngStream::Faction => self.faction.draws(),
            RngStream::Spin => self.spin.draws(),
        }
    }

    fn stream_mut(&mut self, stream: RngStream) -> &mut CountingRng<SmallRng> {
        match stream {
            RngStream::Critical => &mut self.critical,
            RngStream::Event => &mut self.event,
            RngStream::Faction => &mut self.faction,
            RngStream::Spin => &mut self.spin,
        }
    }
}

impl RandomSource for RngBundle {
    fn roll(&mut self, stream: RngStream) -> f64 {
        let value = self.stream_mut(stream).r#gen::<f64>();
        log::trace!("rng {stream:?} -> {value:.4}");
        value
    }
}

/// Deterministic source replaying queued values per stream.
///
/// When a stream's queue runs dry the stream's fallback (or the global fallback) is returned.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    queued: HashMap<RngStream, VecDeque<f64>>,
    fallback: HashMap<RngStream, f64>,
    default_roll: f64,
}

impl ScriptedRolls {
    /// Every draw returns `default_roll` unless overridden.
    #[must_use]
    pub fn constant(default_roll: f64) -> Self {
        Self {
            queued: HashMap::new(),
            fallback: HashMap::new(),
            default_roll,
        }
    }

    /// Nothing random ever fires: no criticals, no events past turn one, no incidents.
    #[must_use]
    pub fn quiet() -> Self {
        Self::constant(0.999)
    }

    /// Fix the value returned by a stream once its queue is empty.
    #[must_use]
    pub fn with_stream(mut self, stream: RngStream, value: f64) -> Self {
        self.fallback.insert(stream, value);
        self
    }

    /// Queue explicit draws for a stream.
    #[must_use]
    pub fn with_sequence(mut self, stream: RngStream, values: &[f64]) -> Self {
        self.queued
            .entry(stream)
            .or_default()
            .extend(values.iter().copied());
        self
    }

    /// Force every critical-hit roll to succeed.
    #[must_use]
    pub fn forcing_critical(self) -> Self {
        self.with_stream(RngStream::Critical, 0.0)
    }
}

impl RandomSource for ScriptedRolls {
    fn roll(&mut self, stream: RngStream) -> f64 {
        if let Some(value) = self.queued.get_mut(&stream).and_then(VecDeque::pop_front) {
            return value;
        }
        self.fallback
            .get(&stream)
            .copied()
            .unwrap_or(self.default_roll)
    }
}
