use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::SeedInfo;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, evaluate_expectations, run_plan};

/// One campaign played during a scenario iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u64,
    pub share_code: String,
    pub turns: u32,
    pub ending: String,
    pub events_seen: u32,
    pub spins: u32,
    pub rejections: u32,
    pub average_support: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub share_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    pub records: Vec<RunRecord>,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `scenario` once per compatible seed. Share codes only run under their own mode.
    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .filter(|info| info.matches_mode(scenario.plan.mode))
            .map(|info| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (mode: {:?} seed: {})",
                        scenario.name.bright_white(),
                        scenario.plan.mode,
                        info.share_code_for_mode(scenario.plan.mode)
                    );
                }
                self.run_single_scenario(scenario, info, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        info: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let mut records = Vec::with_capacity(iterations);
        let mut failures = Vec::new();
        let mut durations = Vec::with_capacity(iterations);

        for i in 0..iterations {
            let seed = info
                .seed
                .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start = Instant::now();
            match run_iteration(&scenario.plan, seed) {
                Ok((summary, None)) => {
                    let duration = start.elapsed();
                    durations.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} {}",
                            i + 1,
                            iterations,
                            summary.turns,
                            summary.ending()
                        );
                    }
                    records.push(record(&summary, scenario, true));
                }
                Ok((summary, Some(err))) => {
                    let failure = format!(
                        "Iteration {} (seed {}, strategy {}, turns {}, {}): {err} | {}",
                        i + 1,
                        summary.seed,
                        summary.strategy,
                        summary.turns,
                        summary.ending(),
                        summarize_decision_path(&summary)
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            err.red()
                        );
                    }
                    failures.push(failure);
                    records.push(record(&summary, scenario, false));
                }
                Err(err) => {
                    log::error!("iteration {} of {} could not start: {err:#}", i + 1, scenario.name);
                    failures.push(format!("Iteration {} (seed {seed}): {err:#}", i + 1));
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed: info.seed,
            share_code: info.share_code_for_mode(scenario.plan.mode),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: records.iter().filter(|r| r.passed).count(),
            failures,
            average_duration,
            records,
        }
    }
}

fn run_iteration(
    plan: &SimulationPlan,
    seed: u64,
) -> anyhow::Result<(SimulationSummary, Option<String>)> {
    let summary = run_plan(plan, seed)?;
    let verdict = evaluate_expectations(plan, &summary);
    Ok((summary, verdict))
}

fn record(summary: &SimulationSummary, scenario: &TestScenario, passed: bool) -> RunRecord {
    RunRecord {
        seed: summary.seed,
        share_code: mandate_game::encode_friendly(scenario.plan.mode, summary.seed),
        turns: summary.turns,
        ending: summary.ending(),
        events_seen: summary.events_seen,
        spins: summary.spins,
        rejections: summary.rejections,
        average_support: summary.average_support,
        passed,
    }
}

fn summarize_decision_path(summary: &SimulationSummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }
    summary
        .decisions
        .iter()
        .rev()
        .take(3)
        .map(|entry| {
            format!(
                "turn {} {} -> {} [{}]",
                entry.turn,
                entry.policy,
                entry.choice,
                entry.rationale.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::scenario::select_scenarios;
    use mandate_game::GameMode;

    #[test]
    fn smoke_scenario_passes() {
        let scenario = select_scenarios(&["smoke".to_string()]).unwrap().remove(0);
        let results =
            LogicTester::new(false).run_scenario(&scenario, &[SeedInfo::from_numeric(1337)], 2);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.successful_iterations, 2);
        assert_eq!(result.records[1].seed, 1338);
        assert!(result.share_code.starts_with("ST-"));
    }

    #[test]
    fn share_codes_skip_other_modes() {
        let scenario = select_scenarios(&["expanded".to_string()]).unwrap().remove(0);
        assert_eq!(scenario.plan.mode, GameMode::Expanded);
        let seeds = [SeedInfo::from_share_code(
            7,
            GameMode::Standard,
            "ST-RALLY07".to_string(),
        )];
        assert!(
            LogicTester::new(false)
                .run_scenario(&scenario, &seeds, 1)
                .is_empty()
        );
    }
}
