use std::fmt;

use clap::ValueEnum;
use mandate_game::{
    ActionDefinition, GameState, Outcome, PendingEvent, ReelSlot, RiskZone, TurnEngine,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// What the policy wants to do with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Action(String),
    Spin,
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub intent: Intent,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn action(id: impl Into<String>, rationale: Option<String>) -> Self {
        Self {
            intent: Intent::Action(id.into()),
            rationale,
        }
    }

    #[must_use]
    pub const fn spin(rationale: Option<String>) -> Self {
        Self {
            intent: Intent::Spin,
            rationale,
        }
    }
}

/// Reels to lock and how many paid re-rolls to try after a spin starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpinPlan {
    pub locks: Vec<ReelSlot>,
    pub rerolls: u32,
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Choose the intent for the coming turn.
    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision;

    /// Choose an option index for the pending event.
    fn pick_option(&mut self, state: &GameState, event: &PendingEvent) -> usize;

    fn plan_spin(&mut self, _state: &GameState) -> SpinPlan {
        SpinPlan::default()
    }
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum GameplayStrategy {
    Greedy,
    Cautious,
    Balanced,
    Spinner,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Greedy,
        Self::Cautious,
        Self::Balanced,
        Self::Spinner,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Greedy => "Greedy",
            Self::Cautious => "Cautious",
            Self::Balanced => "Balanced",
            Self::Spinner => "Spinner",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Spinner => Box::new(SpinnerPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct GreedyPolicy;
struct CautiousPolicy;
struct BalancedPolicy;
struct SpinnerPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Rough value of an outcome: support weighted by the regions it reaches.
fn reward(state: &GameState, outcome: &Outcome) -> i32 {
    let support: i32 = outcome
        .support
        .iter()
        .map(|(key, delta)| delta * i32::try_from(key.expand(state.turn).len()).unwrap_or(0))
        .sum();
    let factions: i32 = outcome.factions.values().sum();
    support / 5 + factions + outcome.clout * 2 + outcome.funds / 4
}

fn risk_penalty(state: &GameState, outcome: &Outcome) -> i32 {
    outcome.risk * (2 + state.risk / 20)
}

fn best_action<'a, F>(
    state: &GameState,
    engine: &'a TurnEngine,
    mut score: F,
) -> Option<(&'a ActionDefinition, i32)>
where
    F: FnMut(&ActionDefinition, &Outcome) -> i32,
{
    engine
        .available_actions(state)
        .into_iter()
        .map(|action| {
            let outcome = action.base_outcome(state);
            let cost = engine.adjusted_cost(state, action);
            (action, score(action, &outcome) - cost.funds / 4 - cost.clout)
        })
        .max_by_key(|(_, value)| *value)
}

fn decide<F>(state: &GameState, engine: &TurnEngine, score: F) -> PolicyDecision
where
    F: FnMut(&ActionDefinition, &Outcome) -> i32,
{
    match best_action(state, engine, score) {
        Some((action, value)) => {
            PolicyDecision::action(action.id.as_str(), Some(format!("score {value}")))
        }
        None => PolicyDecision::action("regroup", Some("nothing available".to_string())),
    }
}

fn best_option<F>(event: &PendingEvent, score: F) -> usize
where
    F: Fn(&Outcome) -> i32,
{
    event
        .options
        .iter()
        .enumerate()
        .max_by_key(|(idx, option)| (score(&option.outcome), std::cmp::Reverse(*idx)))
        .map_or(0, |(idx, _)| idx)
}

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision {
        decide(state, engine, |_, outcome| reward(state, outcome))
    }

    fn pick_option(&mut self, state: &GameState, event: &PendingEvent) -> usize {
        best_option(event, |outcome| reward(state, outcome))
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision {
        let zone = state.risk_zone(engine.config());
        if zone >= RiskZone::Caution
            && engine.check_action(state, "damage_control").is_ok()
        {
            return PolicyDecision::action("damage_control", Some(format!("risk zone {zone}")));
        }
        decide(state, engine, |_, outcome| {
            reward(state, outcome) - risk_penalty(state, outcome) * 3
        })
    }

    fn pick_option(&mut self, state: &GameState, event: &PendingEvent) -> usize {
        best_option(event, |outcome| {
            reward(state, outcome) / 4 - risk_penalty(state, outcome) * 3
        })
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision {
        decide(state, engine, |_, outcome| {
            reward(state, outcome) - risk_penalty(state, outcome)
        })
    }

    fn pick_option(&mut self, state: &GameState, event: &PendingEvent) -> usize {
        best_option(event, |outcome| {
            reward(state, outcome) - risk_penalty(state, outcome)
        })
    }
}

impl PlayerPolicy for SpinnerPolicy {
    fn name(&self) -> &'static str {
        "Spinner"
    }

    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision {
        if state.turn % 2 == 0 {
            return PolicyDecision::spin(Some("even turn".to_string()));
        }
        decide(state, engine, |_, outcome| {
            reward(state, outcome) - risk_penalty(state, outcome)
        })
    }

    fn pick_option(&mut self, state: &GameState, event: &PendingEvent) -> usize {
        best_option(event, |outcome| {
            reward(state, outcome) - risk_penalty(state, outcome)
        })
    }

    fn plan_spin(&mut self, state: &GameState) -> SpinPlan {
        if state.clout >= 30 {
            SpinPlan {
                locks: vec![ReelSlot::Action],
                rerolls: 1,
            }
        } else {
            SpinPlan::default()
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_intent(&mut self, state: &GameState, engine: &TurnEngine) -> PolicyDecision {
        if self.rng.gen_bool(0.1) {
            return PolicyDecision::spin(None);
        }
        let available = engine.available_actions(state);
        if available.is_empty() {
            return PolicyDecision::action("regroup", Some("nothing available".to_string()));
        }
        let pick = available[self.rng.gen_range(0..available.len())];
        PolicyDecision::action(pick.id.as_str(), None)
    }

    fn pick_option(&mut self, _state: &GameState, event: &PendingEvent) -> usize {
        if event.options.is_empty() {
            return 0;
        }
        self.rng.gen_range(0..event.options.len())
    }

    fn plan_spin(&mut self, _state: &GameState) -> SpinPlan {
        let rerolls = u32::from(self.rng.gen_bool(0.3));
        SpinPlan {
            locks: Vec::new(),
            rerolls,
        }
    }
}
