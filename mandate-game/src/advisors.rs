//! Advisor roster: discounts and ability bonuses.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorKind {
    CampaignManager,
    Pollster,
    FinanceChair,
    PressSecretary,
    FieldDirector,
    Fixer,
}

/// Passive effect an advisor contributes to the modifier pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvisorAbility {
    /// Boost every positive delta of one action by `pct` percent.
    ActionBonus { action: &'static str, pct: i32 },
    CloutBonus(i32),
    FundsBonus(i32),
    SupportBonus(i32),
    /// Shrink positive risk deltas by `pct` percent.
    RiskReduction(i32),
    /// Added to the base critical-hit chance.
    CriticalChance(f64),
}

/// Percent discount on a matching action's cost; `None` matches every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostDiscount {
    pub action: Option<&'static str>,
    pub pct: i32,
}

impl AdvisorKind {
    pub const ALL: [Self; 6] = [
        Self::CampaignManager,
        Self::Pollster,
        Self::FinanceChair,
        Self::PressSecretary,
        Self::FieldDirector,
        Self::Fixer,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::CampaignManager => "campaign-manager",
            Self::Pollster => "pollster",
            Self::FinanceChair => "finance-chair",
            Self::PressSecretary => "press-secretary",
            Self::FieldDirector => "field-director",
            Self::Fixer => "fixer",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CampaignManager => "Campaign Manager",
            Self::Pollster => "Pollster",
            Self::FinanceChair => "Finance Chair",
            Self::PressSecretary => "Press Secretary",
            Self::FieldDirector => "Field Director",
            Self::Fixer => "Fixer",
        }
    }

    #[must_use]
    pub const fn abilities(self) -> &'static [AdvisorAbility] {
        match self {
            Self::CampaignManager => &[
                AdvisorAbility::ActionBonus {
                    action: "rally",
                    pct: 25,
                },
                AdvisorAbility::SupportBonus(10),
            ],
            Self::Pollster => &[
                AdvisorAbility::CriticalChance(0.05),
                AdvisorAbility::ActionBonus {
                    action: "canvass",
                    pct: 50,
                },
            ],
            Self::FinanceChair => &[AdvisorAbility::FundsBonus(25)],
            Self::PressSecretary => &[
                AdvisorAbility::CloutBonus(20),
                AdvisorAbility::RiskReduction(25),
            ],
            Self::FieldDirector => &[
                AdvisorAbility::ActionBonus {
                    action: "town_hall",
                    pct: 50,
                },
                AdvisorAbility::ActionBonus {
                    action: "canvass",
                    pct: 25,
                },
            ],
            Self::Fixer => &[
                AdvisorAbility::RiskReduction(40),
                AdvisorAbility::CriticalChance(0.05),
            ],
        }
    }

    #[must_use]
    pub const fn discounts(self) -> &'static [CostDiscount] {
        match self {
            Self::CampaignManager => &[CostDiscount {
                action: Some("rally"),
                pct: 20,
            }],
            Self::Pollster => &[CostDiscount {
                action: Some("canvass"),
                pct: 25,
            }],
            Self::FinanceChair => &[CostDiscount {
                action: Some("tv_ads"),
                pct: 25,
            }],
            Self::PressSecretary => &[CostDiscount {
                action: Some("media_tour"),
                pct: 30,
            }],
            Self::FieldDirector => &[CostDiscount {
                action: None,
                pct: 10,
            }],
            Self::Fixer => &[
                CostDiscount {
                    action: Some("damage_control"),
                    pct: 50,
                },
                CostDiscount {
                    action: Some("opposition_research"),
                    pct: 25,
                },
            ],
        }
    }
}

impl fmt::Display for AdvisorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AdvisorKind {
    type Err = EngineError;

    /// Accepts the kebab id, the snake-case id or the display name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == needle)
            .ok_or_else(|| EngineError::UnknownAdvisor(s.trim().to_string()))
    }
}

/// Source of the advisor names a campaign starts with.
pub trait AdvisorRoster {
    fn advisor_names(&self) -> Vec<String>;
}

impl<T: AsRef<str>> AdvisorRoster for Vec<T> {
    fn advisor_names(&self) -> Vec<String> {
        self.iter().map(|name| name.as_ref().to_string()).collect()
    }
}

/// Resolve roster names once; duplicates collapse to a single advisor.
///
/// # Errors
///
/// Returns [`EngineError::UnknownAdvisor`] for the first name that is not an advisor.
pub fn resolve_roster<R: AdvisorRoster + ?Sized>(roster: &R) -> Result<Vec<AdvisorKind>, EngineError> {
    let mut resolved = Vec::new();
    for name in roster.advisor_names() {
        let kind = name.parse::<AdvisorKind>()?;
        if !resolved.contains(&kind) {
            resolved.push(kind);
        }
    }
    Ok(resolved)
}

/// Summed discount for `action`, capped at `cap` percent.
#[must_use]
pub fn discount_pct(advisors: &[AdvisorKind], action: &str, cap: i32) -> i32 {
    let total: i32 = advisors
        .iter()
        .flat_map(|advisor| advisor.discounts())
        .filter(|discount| discount.action.is_none_or(|id| id == action))
        .map(|discount| discount.pct)
        .sum();
    total.clamp(0, cap.max(0))
}

#[must_use]
pub fn critical_bonus(advisors: &[AdvisorKind]) -> f64 {
    advisors
        .iter()
        .flat_map(|advisor| advisor.abilities())
        .map(|ability| match ability {
            AdvisorAbility::CriticalChance(bonus) => *bonus,
            _ => 0.0,
        })
        .sum()
}
