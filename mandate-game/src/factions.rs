//! Factions and game modes.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionId {
    Progressives,
    Moderates,
    Conservatives,
    Libertarians,
    Populists,
}

impl FactionId {
    pub const ALL: [Self; 5] = [
        Self::Progressives,
        Self::Moderates,
        Self::Conservatives,
        Self::Libertarians,
        Self::Populists,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Progressives => "progressives",
            Self::Moderates => "moderates",
            Self::Conservatives => "conservatives",
            Self::Libertarians => "libertarians",
            Self::Populists => "populists",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Progressives => "Progressives",
            Self::Moderates => "Moderates",
            Self::Conservatives => "Conservatives",
            Self::Libertarians => "Libertarians",
            Self::Populists => "Populists",
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FactionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|faction| faction.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Selects how many factions compete for support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Standard,
    Expanded,
}

impl GameMode {
    #[must_use]
    pub const fn factions(self) -> &'static [FactionId] {
        match self {
            Self::Standard => &[
                FactionId::Progressives,
                FactionId::Moderates,
                FactionId::Conservatives,
            ],
            Self::Expanded => &FactionId::ALL,
        }
    }

    #[must_use]
    pub const fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Standard => "ST",
            Self::Expanded => "EX",
        }
    }
}
