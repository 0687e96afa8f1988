use anyhow::{Result, bail};
use mandate_game::{
    ChallengeModifier, DefeatType, GameMode, GameSession, GameState, Rejection, SessionSetup,
    StartingBonuses, TurnEngine, VictoryType,
};
use serde::Serialize;
use std::collections::BTreeMap;

use super::invariants::{self, Violation};
use super::policy::{GameplayStrategy, Intent, PlayerPolicy};

/// Check run against a finished summary; an `Err` fails the iteration.
pub type Expectation = fn(&SimulationSummary) -> Result<()>;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: GameMode,
    pub strategy: GameplayStrategy,
    pub advisors: Vec<&'static str>,
    pub bonuses: StartingBonuses,
    pub challenge: Option<ChallengeModifier>,
    pub max_steps: usize,
    pub expectations: Vec<Expectation>,
}

impl SimulationPlan {
    /// Plan that expects a finished campaign with no invariant violations.
    #[must_use]
    pub fn new(mode: GameMode, strategy: GameplayStrategy) -> Self {
        Self {
            mode,
            strategy,
            advisors: Vec::new(),
            bonuses: StartingBonuses::default(),
            challenge: None,
            max_steps: 250,
            expectations: vec![expect_clean_run, expect_finished],
        }
    }

    #[must_use]
    pub fn with_advisors(mut self, advisors: &[&'static str]) -> Self {
        self.advisors = advisors.to_vec();
        self
    }

    #[must_use]
    pub fn with_bonuses(mut self, bonuses: StartingBonuses) -> Self {
        self.bonuses = bonuses;
        self
    }

    #[must_use]
    pub fn with_challenge(mut self, challenge: ChallengeModifier) -> Self {
        self.challenge = Some(challenge);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub turn: u32,
    pub policy: &'static str,
    pub choice: String,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub mode: GameMode,
    pub strategy: &'static str,
    pub turns: u32,
    pub steps: usize,
    pub finished: bool,
    pub victory: Option<VictoryType>,
    pub defeat: Option<DefeatType>,
    pub final_funds: i32,
    pub final_clout: i32,
    pub final_risk: i32,
    pub average_support: f64,
    pub events_seen: u32,
    pub spins: u32,
    pub rerolls: u32,
    pub rejections: u32,
    pub actions: BTreeMap<String, u32>,
    pub violations: Vec<String>,
    pub decisions: Vec<DecisionRecord>,
}

impl SimulationSummary {
    fn new(plan: &SimulationPlan, seed: u64) -> Self {
        Self {
            seed,
            mode: plan.mode,
            strategy: plan.strategy.label(),
            turns: 0,
            steps: 0,
            finished: false,
            victory: None,
            defeat: None,
            final_funds: 0,
            final_clout: 0,
            final_risk: 0,
            average_support: 0.0,
            events_seen: 0,
            spins: 0,
            rerolls: 0,
            rejections: 0,
            actions: BTreeMap::new(),
            violations: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Short label for the ending, e.g. `victory: Speed Run`.
    #[must_use]
    pub fn ending(&self) -> String {
        match (self.victory, self.defeat) {
            (Some(victory), _) => format!("victory: {victory}"),
            (None, Some(defeat)) => format!("defeat: {defeat}"),
            (None, None) => "unfinished".to_string(),
        }
    }

    fn note(&mut self, turn: u32, found: Vec<Violation>) {
        self.violations
            .extend(found.into_iter().map(|violation| format!("turn {turn}: {violation}")));
    }

    fn finish(&mut self, state: &GameState) {
        self.turns = state.turn;
        self.finished = state.game_over;
        self.victory = state.victory_type;
        self.defeat = state.defeat_type;
        self.final_funds = state.funds;
        self.final_clout = state.clout;
        self.final_risk = state.risk;
        self.average_support = state.average_support();
    }
}

pub fn expect_clean_run(summary: &SimulationSummary) -> Result<()> {
    if let Some(first) = summary.violations.first() {
        bail!(
            "{} invariant violation(s), first: {first}",
            summary.violations.len()
        );
    }
    Ok(())
}

pub fn expect_finished(summary: &SimulationSummary) -> Result<()> {
    if !summary.finished {
        bail!(
            "campaign still running at turn {} after {} steps",
            summary.turns,
            summary.steps
        );
    }
    Ok(())
}

pub fn expect_events(summary: &SimulationSummary) -> Result<()> {
    if summary.events_seen == 0 {
        bail!("no events fired in {} turns", summary.turns);
    }
    Ok(())
}

/// Drives one campaign for a plan and seed, checking invariants after every intent.
pub struct Simulation {
    session: GameSession,
    policy: Box<dyn PlayerPolicy + Send>,
    summary: SimulationSummary,
}

impl Simulation {
    /// # Errors
    ///
    /// Fails when the bundled data or the plan's advisor roster is invalid.
    pub fn new(plan: &SimulationPlan, seed: u64) -> Result<Self> {
        let engine = TurnEngine::standard()?;
        let setup = SessionSetup::new(plan.mode, seed)
            .with_roster(&plan.advisors)?
            .with_bonuses(&plan.bonuses)
            .with_challenge(&plan.challenge);
        Ok(Self {
            session: GameSession::new(engine, setup),
            policy: plan.strategy.create_policy(seed),
            summary: SimulationSummary::new(plan, seed),
        })
    }

    #[must_use]
    pub fn run(mut self, max_steps: usize) -> SimulationSummary {
        let initial = invariants::check_bounds(self.session.state());
        self.summary.note(0, initial);
        for _ in 0..max_steps {
            if self.session.state().game_over {
                break;
            }
            self.summary.steps += 1;
            self.step();
        }
        self.summary.finish(self.session.state());
        log::info!(
            "seed {} ({}) ended after {} turns: {}",
            self.summary.seed,
            self.summary.strategy,
            self.summary.turns,
            self.summary.ending()
        );
        self.summary
    }

    fn step(&mut self) {
        let exclusivity =
            invariants::check_exclusivity(self.session.engine(), self.session.state());
        self.summary.note(self.session.state().turn, exclusivity);

        if let Some(pending) = self.session.state().pending_event.clone() {
            let index = self.policy.pick_option(self.session.state(), &pending);
            let label = pending
                .options
                .get(index)
                .map_or_else(|| format!("option {index}"), |option| option.label.clone());
            self.record(format!("{}: {label}", pending.title), None);
            let before = self.session.state().clone();
            let result = self.session.choose_option(index);
            self.observe(&before, result.as_ref().err());
            return;
        }

        if self.session.state().spin.is_some() {
            self.finish_spin();
            return;
        }

        let decision = self
            .policy
            .pick_intent(self.session.state(), self.session.engine());
        match decision.intent {
            Intent::Action(id) => {
                self.record(id.clone(), decision.rationale);
                if !self.act(&id) && id != "regroup" {
                    self.act("regroup");
                }
            }
            Intent::Spin => {
                self.record("spin".to_string(), decision.rationale);
                let before = self.session.state().clone();
                let started = self.session.start_spin();
                self.observe(&before, started.as_ref().err());
                if started.is_ok() {
                    self.summary.spins += 1;
                    self.finish_spin();
                } else {
                    self.act("regroup");
                }
            }
        }
    }

    fn act(&mut self, id: &str) -> bool {
        let before = self.session.state().clone();
        let result = self.session.take_action(id);
        self.observe(&before, result.as_ref().err());
        match result {
            Ok(report) => {
                *self.summary.actions.entry(id.to_string()).or_insert(0) += 1;
                if report.event.is_some() {
                    self.summary.events_seen += 1;
                }
                true
            }
            Err(_) => false,
        }
    }

    fn finish_spin(&mut self) {
        let plan = self.policy.plan_spin(self.session.state());
        for slot in plan.locks {
            let before = self.session.state().clone();
            let result = self.session.toggle_lock(slot);
            self.observe(&before, result.as_ref().err());
        }
        for _ in 0..plan.rerolls {
            let before = self.session.state().clone();
            let result = self.session.reroll();
            self.observe(&before, result.as_ref().err());
            if result.is_ok() {
                self.summary.rerolls += 1;
            }
        }
        let before = self.session.state().clone();
        let result = self.session.resolve_spin();
        self.observe(&before, result.as_ref().err());
        if let Ok(report) = result
            && report.event.is_some()
        {
            self.summary.events_seen += 1;
        }
    }

    fn observe(&mut self, before: &GameState, rejection: Option<&Rejection>) {
        if let Some(rejection) = rejection {
            self.summary.rejections += 1;
            log::debug!("turn {}: rejected: {rejection}", before.turn);
        }
        let after = self.session.state();
        let mut found = invariants::check_transition(before, after, rejection.is_none());
        found.extend(invariants::check_bounds(after));
        let turn = after.turn;
        self.summary.note(turn, found);
    }

    fn record(&mut self, choice: String, rationale: Option<String>) {
        let turn = self.session.state().turn;
        log::debug!("turn {turn}: {} -> {choice}", self.policy.name());
        self.summary.decisions.push(DecisionRecord {
            turn,
            policy: self.policy.name(),
            choice,
            rationale,
        });
    }
}

/// Play one campaign for `plan` from `seed`.
///
/// # Errors
///
/// Fails when the session cannot be built.
pub fn run_plan(plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
    Ok(Simulation::new(plan, seed)?.run(plan.max_steps))
}

/// First failing expectation, if any.
#[must_use]
pub fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    plan.expectations
        .iter()
        .find_map(|expectation| expectation(summary).err())
        .map(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_finishes_cleanly() {
        for strategy in GameplayStrategy::ALL {
            for mode in [GameMode::Standard, GameMode::Expanded] {
                let plan = SimulationPlan::new(mode, strategy);
                let summary = run_plan(&plan, 1337).unwrap();
                assert_eq!(
                    evaluate_expectations(&plan, &summary),
                    None,
                    "{strategy} in {mode:?}: {:?}",
                    summary.violations
                );
                assert!(summary.turns > 0);
                assert!(!summary.decisions.is_empty());
            }
        }
    }

    #[test]
    fn runs_are_reproducible() {
        let plan = SimulationPlan::new(GameMode::Expanded, GameplayStrategy::Random)
            .with_advisors(&["pollster", "fixer"]);
        let first = run_plan(&plan, 99).unwrap();
        let second = run_plan(&plan, 99).unwrap();
        assert_eq!(first.turns, second.turns);
        assert_eq!(first.actions, second.actions);
        assert_eq!(first.ending(), second.ending());
        assert_eq!(first.final_funds, second.final_funds);
    }

    #[test]
    fn unknown_advisor_fails_setup() {
        let plan = SimulationPlan::new(GameMode::Standard, GameplayStrategy::Greedy)
            .with_advisors(&["astrologer"]);
        assert!(run_plan(&plan, 1).is_err());
    }

    #[test]
    fn expectations_report_the_first_failure() {
        let plan = SimulationPlan::new(GameMode::Standard, GameplayStrategy::Balanced)
            .with_expectation(|_| Err(anyhow::anyhow!("always fails")));
        let summary = run_plan(&plan, 5).unwrap();
        assert_eq!(
            evaluate_expectations(&plan, &summary).as_deref(),
            Some("always fails")
        );
    }
}
