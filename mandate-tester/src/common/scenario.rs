//! Named simulation scenarios selectable from the command line.
use anyhow::{Result, bail, ensure};
use mandate_game::{ChallengeModifier, FactionId, GameMode, StartingBonuses};
use std::collections::BTreeMap;

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, expect_events};

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(
        name: impl Into<String>,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            plan,
        }
    }
}

fn took_turns(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.turns > 0, "campaign should last at least one turn");
    Ok(())
}

fn never_ran_attack_ads(summary: &SimulationSummary) -> Result<()> {
    if let Some(count) = summary.actions.get("attack_ads") {
        bail!("attack_ads ran {count} time(s) under a challenge that forbids it");
    }
    Ok(())
}

fn spun_the_reels(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.spins > 0, "spinner strategy never spun");
    Ok(())
}

fn strategy_scenario(strategy: GameplayStrategy) -> TestScenario {
    let plan = SimulationPlan::new(GameMode::Standard, strategy).with_expectation(took_turns);
    let plan = if strategy == GameplayStrategy::Spinner {
        plan.with_expectation(spun_the_reels)
    } else {
        plan
    };
    TestScenario::simulation(
        strategy.label().to_lowercase(),
        "Full standard campaign under one strategy",
        plan,
    )
}

/// Every scenario the tester knows, in listing order.
#[must_use]
pub fn catalog() -> Vec<TestScenario> {
    let mut scenarios = vec![TestScenario::simulation(
        "smoke",
        "Balanced standard campaign",
        SimulationPlan::new(GameMode::Standard, GameplayStrategy::Balanced)
            .with_expectation(took_turns),
    )];
    scenarios.extend(GameplayStrategy::ALL.into_iter().map(strategy_scenario));
    scenarios.extend([
        TestScenario::simulation(
            "expanded",
            "Five-faction campaign with a staffed advisor team",
            SimulationPlan::new(GameMode::Expanded, GameplayStrategy::Balanced)
                .with_advisors(&["campaign-manager", "pollster", "finance-chair"]),
        ),
        TestScenario::simulation(
            "bonuses",
            "Standard campaign with unlocked starting bonuses",
            SimulationPlan::new(GameMode::Standard, GameplayStrategy::Greedy).with_bonuses(
                StartingBonuses {
                    clout: 10,
                    funds: 50,
                    region_support: 5,
                    faction_support: BTreeMap::from([(FactionId::Moderates, 5)]),
                },
            ),
        ),
        TestScenario::simulation(
            "double-risk",
            "Greedy play while every risk gain is doubled",
            SimulationPlan::new(GameMode::Standard, GameplayStrategy::Greedy)
                .with_challenge(ChallengeModifier::DoubleRisk),
        ),
        TestScenario::simulation(
            "double-events",
            "Random play with doubled event frequency",
            SimulationPlan::new(GameMode::Expanded, GameplayStrategy::Random)
                .with_challenge(ChallengeModifier::DoubleEvents)
                .with_expectation(expect_events),
        ),
        TestScenario::simulation(
            "no-attack-ads",
            "Greedy play with attack ads forbidden",
            SimulationPlan::new(GameMode::Standard, GameplayStrategy::Greedy)
                .with_challenge(ChallengeModifier::DisallowAction("attack_ads".into()))
                .with_expectation(never_ran_attack_ads),
        ),
    ]);
    scenarios
}

/// Resolve CLI scenario names; `all` selects the whole catalog.
pub fn select_scenarios(names: &[String]) -> Result<Vec<TestScenario>> {
    let catalog = catalog();
    if names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        return Ok(catalog);
    }
    let mut picked: Vec<TestScenario> = Vec::new();
    for name in names {
        let Some(scenario) = catalog
            .iter()
            .find(|scenario| scenario.name.eq_ignore_ascii_case(name))
        else {
            bail!("Unknown scenario: {name} (try --list-scenarios)");
        };
        if !picked.iter().any(|existing| existing.name == scenario.name) {
            picked.push(scenario.clone());
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let catalog = catalog();
        let mut names: Vec<_> = catalog.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
        assert!(names.contains(&"spinner"));
    }

    #[test]
    fn selection_is_case_insensitive_and_deduped() {
        let picked =
            select_scenarios(&["Smoke".to_string(), "smoke".to_string(), "greedy".to_string()])
                .unwrap();
        let names: Vec<_> = picked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["smoke", "greedy"]);
    }

    #[test]
    fn all_selects_everything() {
        assert_eq!(
            select_scenarios(&["all".to_string()]).unwrap().len(),
            catalog().len()
        );
        assert!(select_scenarios(&["nope".to_string()]).is_err());
    }
}
