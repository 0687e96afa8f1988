//! Modifier pipeline applied to every base outcome.
//!
//! Stages run in a fixed order and each rounds on its own:
//! diminishing returns, then critical hit or session opener, then advisor abilities, then
//! challenge risk scaling. The order is observable: a 3-point action used twice in a row with a
//! critical lands on 4, where doubling first would give 5.
use serde::{Deserialize, Serialize};

use crate::advisors::{AdvisorAbility, AdvisorKind, critical_bonus};
use crate::config::ModifierCfg;
use crate::numbers::{scale_i32, scale_positive};
use crate::outcome::Outcome;
use crate::rng::{RandomSource, RngStream};
use crate::session::ChallengeModifier;

/// Which bonus, if any, stage two applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    #[default]
    None,
    Critical,
    SessionOpener,
}

/// What the pipeline did to an outcome, for reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierReport {
    pub diminishing: f64,
    pub bonus: BonusKind,
    pub advisor_bonuses: usize,
    pub risk_doubled: bool,
}

impl Default for ModifierReport {
    fn default() -> Self {
        Self {
            diminishing: 1.0,
            bonus: BonusKind::None,
            advisor_bonuses: 0,
            risk_doubled: false,
        }
    }
}

/// Per-intent inputs to the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub action: &'a str,
    pub prior_uses: u32,
    pub first_action: bool,
    pub advisors: &'a [AdvisorKind],
    pub challenge: Option<&'a ChallengeModifier>,
}

#[must_use]
pub fn diminishing_multiplier(prior_uses: u32, cfg: &ModifierCfg) -> f64 {
    let raw = cfg.diminishing_step.mul_add(-f64::from(prior_uses), 1.0);
    raw.clamp(cfg.diminishing_floor, 1.0)
}

/// Stage one. Returns the multiplier used.
pub fn apply_diminishing_returns(outcome: &mut Outcome, prior_uses: u32, cfg: &ModifierCfg) -> f64 {
    let multiplier = diminishing_multiplier(prior_uses, cfg);
    if multiplier < 1.0 {
        outcome.scale_positive(multiplier);
    }
    multiplier
}

#[must_use]
pub fn critical_chance(advisors: &[AdvisorKind], cfg: &ModifierCfg) -> f64 {
    (cfg.critical_base_chance + critical_bonus(advisors)).clamp(0.0, 1.0)
}

/// Stage two: a critical hit, or failing that the once-per-session opener bonus.
pub fn apply_bonus(
    outcome: &mut Outcome,
    rng: &mut dyn RandomSource,
    first_action: bool,
    advisors: &[AdvisorKind],
    cfg: &ModifierCfg,
) -> BonusKind {
    if rng.chance(RngStream::Critical, critical_chance(advisors, cfg)) {
        outcome.scale_positive(cfg.critical_multiplier);
        BonusKind::Critical
    } else if first_action {
        outcome.scale_positive(cfg.session_opener_multiplier);
        BonusKind::SessionOpener
    } else {
        BonusKind::None
    }
}

fn boost(pct: i32) -> f64 {
    1.0 + f64::from(pct) / 100.0
}

/// Stage three. Returns how many abilities touched the outcome.
pub fn apply_advisor_bonuses(outcome: &mut Outcome, action: &str, advisors: &[AdvisorKind]) -> usize {
    let mut applied = 0;
    for ability in advisors.iter().flat_map(|advisor| advisor.abilities()) {
        match *ability {
            AdvisorAbility::ActionBonus { action: target, pct } if target == action => {
                outcome.scale_positive(boost(pct));
            }
            AdvisorAbility::CloutBonus(pct) => {
                outcome.clout = scale_positive(outcome.clout, boost(pct));
            }
            AdvisorAbility::FundsBonus(pct) => {
                outcome.funds = scale_positive(outcome.funds, boost(pct));
            }
            AdvisorAbility::SupportBonus(pct) => {
                for delta in outcome.support.values_mut() {
                    *delta = scale_positive(*delta, boost(pct));
                }
            }
            AdvisorAbility::RiskReduction(pct) => {
                if outcome.risk > 0 {
                    outcome.risk = scale_i32(outcome.risk, 1.0 - f64::from(pct) / 100.0).max(0);
                }
            }
            AdvisorAbility::ActionBonus { .. } | AdvisorAbility::CriticalChance(_) => continue,
        }
        applied += 1;
    }
    applied
}

/// Stage four. Returns whether risk was doubled.
pub fn apply_challenge_risk(outcome: &mut Outcome, challenge: Option<&ChallengeModifier>) -> bool {
    if matches!(challenge, Some(ChallengeModifier::DoubleRisk)) && outcome.risk > 0 {
        outcome.risk = outcome.risk.saturating_mul(2);
        true
    } else {
        false
    }
}

/// Run all four stages over `base`.
pub fn run_pipeline(
    mut outcome: Outcome,
    input: &PipelineInput<'_>,
    rng: &mut dyn RandomSource,
    cfg: &ModifierCfg,
) -> (Outcome, ModifierReport) {
    let diminishing = apply_diminishing_returns(&mut outcome, input.prior_uses, cfg);
    let bonus = apply_bonus(&mut outcome, rng, input.first_action, input.advisors, cfg);
    let advisor_bonuses = apply_advisor_bonuses(&mut outcome, input.action, input.advisors);
    let risk_doubled = apply_challenge_risk(&mut outcome, input.challenge);
    log::debug!(
        "pipeline {}: diminishing {diminishing:.2}, bonus {bonus:?}, advisors {advisor_bonuses}, risk doubled {risk_doubled}",
        input.action
    );
    (
        outcome,
        ModifierReport {
            diminishing,
            bonus,
            advisor_bonuses,
            risk_doubled,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionKey;
    use crate::rng::ScriptedRolls;

    fn input(prior_uses: u32) -> PipelineInput<'static> {
        PipelineInput {
            action: "rally",
            prior_uses,
            first_action: false,
            advisors: &[],
            challenge: None,
        }
    }

    #[test]
    fn diminishing_steps_down_to_floor() {
        let cfg = ModifierCfg::default();
        let multipliers: Vec<f64> = (0..6).map(|n| diminishing_multiplier(n, &cfg)).collect();
        assert!((multipliers[0] - 1.0).abs() < f64::EPSILON);
        assert!((multipliers[1] - 0.75).abs() < f64::EPSILON);
        assert!((multipliers[2] - 0.5).abs() < f64::EPSILON);
        assert!((multipliers[5] - 0.2).abs() < f64::EPSILON);
        assert!(multipliers.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn diminishing_runs_before_critical() {
        let cfg = ModifierCfg::default();
        let base = Outcome::new().with_support(RegionKey::All, 3);
        let mut rolls = ScriptedRolls::quiet().forcing_critical();
        let (outcome, report) = run_pipeline(base, &input(1), &mut rolls, &cfg);
        assert_eq!(outcome.support[&RegionKey::All], 4);
        assert_eq!(report.bonus, BonusKind::Critical);
    }

    #[test]
    fn session_opener_only_without_critical() {
        let cfg = ModifierCfg::default();
        let mut rolls = ScriptedRolls::quiet();
        let mut outcome = Outcome::new().with_funds(10).with_risk(4);
        let bonus = apply_bonus(&mut outcome, &mut rolls, true, &[], &cfg);
        assert_eq!(bonus, BonusKind::SessionOpener);
        assert_eq!(outcome.funds, 15);
        assert_eq!(outcome.risk, 4);
    }

    #[test]
    fn advisor_bonuses_and_risk_reduction() {
        let mut outcome = Outcome::new()
            .with_support(RegionKey::All, 4)
            .with_clout(10)
            .with_risk(8);
        let applied = apply_advisor_bonuses(
            &mut outcome,
            "rally",
            &[AdvisorKind::CampaignManager, AdvisorKind::PressSecretary],
        );
        // support 4 -> 5 -> 6, clout 10 -> 13 -> 16, risk 8 -> 6
        assert_eq!(outcome.support[&RegionKey::All], 6);
        assert_eq!(outcome.clout, 16);
        assert_eq!(outcome.risk, 6);
        assert_eq!(applied, 4);
    }

    #[test]
    fn double_risk_challenge_only_scales_increases() {
        let mut up = Outcome::new().with_risk(5);
        assert!(apply_challenge_risk(&mut up, Some(&ChallengeModifier::DoubleRisk)));
        assert_eq!(up.risk, 10);
        let mut down = Outcome::new().with_risk(-5);
        assert!(!apply_challenge_risk(&mut down, Some(&ChallengeModifier::DoubleRisk)));
        assert_eq!(down.risk, -5);
        assert!(!apply_challenge_risk(&mut up, Some(&ChallengeModifier::DoubleEvents)));
    }
}
