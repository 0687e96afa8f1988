//! Region codes and the keys outcomes use to target them.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 50 states plus DC. Support always carries exactly these keys.
pub const REGION_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

pub const MIDWEST: [&str; 12] = [
    "IL", "IN", "IA", "KS", "MI", "MN", "MO", "NE", "ND", "OH", "SD", "WI",
];

pub const COASTAL: [&str; 12] = [
    "CA", "OR", "WA", "NY", "NJ", "MA", "CT", "RI", "MD", "DE", "VA", "FL",
];

/// Rotation used by the `random` key; the turn number selects the entry.
pub const BATTLEGROUND: [&str; 7] = ["PA", "MI", "WI", "AZ", "GA", "NV", "NC"];

#[must_use]
pub fn is_region_code(code: &str) -> bool {
    REGION_CODES.contains(&code)
}

/// Target of a support delta inside an outcome.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegionKey {
    /// Broadcast to every region; also the delta factions react to.
    All,
    /// One battleground region picked by turn rotation.
    Random,
    Midwest,
    Coastal,
    Code(String),
}

impl RegionKey {
    #[must_use]
    pub fn code(code: &str) -> Self {
        Self::Code(code.trim().to_ascii_uppercase())
    }

    /// Region codes this key touches on `turn`. Unknown codes expand to nothing.
    #[must_use]
    pub fn expand(&self, turn: u32) -> Vec<&'static str> {
        match self {
            Self::All => REGION_CODES.to_vec(),
            Self::Midwest => MIDWEST.to_vec(),
            Self::Coastal => COASTAL.to_vec(),
            Self::Random => {
                let idx = usize::try_from(turn).unwrap_or(0) % BATTLEGROUND.len();
                vec![BATTLEGROUND[idx]]
            }
            Self::Code(code) => REGION_CODES
                .iter()
                .copied()
                .filter(|known| *known == code.as_str())
                .collect(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "ALL",
            Self::Random => "random",
            Self::Midwest => "midwest",
            Self::Coastal => "coastal",
            Self::Code(code) => code.as_str(),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(String::from("empty region key"));
        }
        let key = match trimmed.to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "random" => Self::Random,
            "midwest" => Self::Midwest,
            "coastal" => Self::Coastal,
            _ => Self::code(trimmed),
        };
        Ok(key)
    }
}

impl TryFrom<String> for RegionKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionKey> for String {
    fn from(value: RegionKey) -> Self {
        value.as_str().to_string()
    }
}
