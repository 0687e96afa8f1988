//! Risk-zone classification.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RiskCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskZone {
    Safe,
    Caution,
    Danger,
    Critical,
}

impl RiskZone {
    #[must_use]
    pub const fn from_risk(risk: i32, cfg: &RiskCfg) -> Self {
        if risk >= cfg.critical_at {
            Self::Critical
        } else if risk >= cfg.danger_at {
            Self::Danger
        } else if risk >= cfg.caution_at {
            Self::Caution
        } else {
            Self::Safe
        }
    }

    #[must_use]
    pub const fn cost_multiplier(self, cfg: &RiskCfg) -> f64 {
        match self {
            Self::Safe => cfg.safe_cost_multiplier,
            Self::Caution => cfg.caution_cost_multiplier,
            Self::Danger => cfg.danger_cost_multiplier,
            Self::Critical => cfg.critical_cost_multiplier,
        }
    }

    /// Whether an action with `locked_from` is unavailable in this zone.
    #[must_use]
    pub fn locks(self, locked_from: Option<Self>) -> bool {
        locked_from.is_some_and(|zone| self >= zone)
    }
}

impl fmt::Display for RiskZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Danger => "danger",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_bands() {
        let cfg = RiskCfg::default();
        assert_eq!(RiskZone::from_risk(0, &cfg), RiskZone::Safe);
        assert_eq!(RiskZone::from_risk(24, &cfg), RiskZone::Safe);
        assert_eq!(RiskZone::from_risk(25, &cfg), RiskZone::Caution);
        assert_eq!(RiskZone::from_risk(50, &cfg), RiskZone::Danger);
        assert_eq!(RiskZone::from_risk(99, &cfg), RiskZone::Critical);
    }

    #[test]
    fn lockout_applies_at_and_above_zone() {
        assert!(!RiskZone::Caution.locks(Some(RiskZone::Danger)));
        assert!(RiskZone::Danger.locks(Some(RiskZone::Danger)));
        assert!(RiskZone::Critical.locks(Some(RiskZone::Danger)));
        assert!(!RiskZone::Critical.locks(None));
    }

    #[test]
    fn multipliers_grow_with_zone() {
        let cfg = RiskCfg::default();
        assert!(RiskZone::Safe.cost_multiplier(&cfg) < RiskZone::Critical.cost_multiplier(&cfg));
    }
}
