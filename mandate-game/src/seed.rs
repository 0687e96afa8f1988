//! Reversible share codes over a 64-word campaign vocabulary.
//! Code format: <MODE>-<WORD><NN>, e.g. ST-RALLY42, EX-SWING07

use sha2::{Digest, Sha256};

use crate::factions::GameMode;

const WORD_BITS: u16 = 6;
const WORD_MASK: u16 = (1 << WORD_BITS) - 1;
const NUMBER_MASK: u16 = 0x7F;

pub const WORD_LIST: [&str; 64] = [
    "RALLY", "SWING", "BALLOT", "CAUCUS", "DEBATE", "PODIUM", "STUMP", "SLOGAN", "BANNER",
    "BUTTON", "DONOR", "PAC", "PRIMARY", "DELEGATE", "MANDATE", "QUORUM", "LOBBY", "PUNDIT",
    "POLLSTER", "CANVASS", "DOORKNOCK", "YARDSIGN", "ROBOCALL", "TOWNHALL", "CONVOY", "BUSTOUR",
    "HUSTINGS", "GAFFE", "SPIN", "HEADLINE", "SOUNDBITE", "MOMENTUM", "TURNOUT", "PRECINCT",
    "COUNTY", "DISTRICT", "SENATE", "HOUSE", "CAPITOL", "GAVEL", "FILIBUSTER", "VETO", "CLOTURE",
    "RECOUNT", "RUNOFF", "LANDSLIDE", "UPSET", "SURGE", "BELLWETHER", "BASE", "COALITION",
    "CAMPAIGN", "ENDORSE", "WHISTLE", "CONFETTI", "BALLOON", "STICKER", "PLATFORM", "PLANK",
    "RIDER", "AMENDMENT", "TICKET", "RUNNINGMATE", "VICTORY",
];

const fn pack(word_index: u16, number: u8) -> u16 {
    (word_index & WORD_MASK) | ((number as u16 & NUMBER_MASK) << WORD_BITS)
}

fn unpack(seed: u64) -> (usize, u8) {
    let low = u16::try_from(seed & 0xFFFF).unwrap_or(0);
    let number = u8::try_from((low >> WORD_BITS) & NUMBER_MASK).unwrap_or(0);
    (usize::from(low & WORD_MASK), number)
}

fn mode_from_prefix(prefix: &str) -> Option<GameMode> {
    match prefix.trim().to_ascii_uppercase().as_str() {
        "ST" => Some(GameMode::Standard),
        "EX" => Some(GameMode::Expanded),
        _ => None,
    }
}

/// Upper 48 bits come from a mode-separated digest; the low 16 bits hold the code itself.
fn compose_seed(mode: GameMode, word_index: u16, number: u8) -> u64 {
    let packed = pack(word_index, number);
    let mut hasher = Sha256::new();
    hasher.update(b"MANDATE-");
    hasher.update(mode.code().as_bytes());
    hasher.update(packed.to_le_bytes());
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(head) & !0xFFFF) | u64::from(packed)
}

#[must_use]
pub fn encode_friendly(mode: GameMode, seed: u64) -> String {
    let (word_index, number) = unpack(seed);
    let word = WORD_LIST.get(word_index).copied().unwrap_or(WORD_LIST[0]);
    format!("{}-{word}{:02}", mode.code(), number % 100)
}

#[must_use]
pub fn decode_to_seed(code: &str) -> Option<(GameMode, u64)> {
    let (prefix, rest) = code.trim().split_once('-')?;
    let mode = mode_from_prefix(prefix)?;
    if rest.len() < 3 || !rest.is_ascii() {
        return None;
    }
    let (word_part, number_part) = rest.split_at(rest.len() - 2);
    if !number_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u8 = number_part.parse().ok()?;
    let word = word_part.to_ascii_uppercase();
    let index = WORD_LIST.iter().position(|candidate| *candidate == word)?;
    let index = u16::try_from(index).ok()?;
    Some((mode, compose_seed(mode, index, number)))
}

#[must_use]
pub fn generate_code_from_entropy(mode: GameMode, entropy: u64) -> String {
    let word_index = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let number = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_friendly(mode, compose_seed(mode, word_index, number))
}

/// Accept either a share code or a bare decimal seed (standard mode).
#[must_use]
pub fn parse_share_code(input: &str) -> Option<(GameMode, u64)> {
    let trimmed = input.trim();
    if let Ok(seed) = trimmed.parse::<u64>() {
        return Some((GameMode::Standard, seed));
    }
    decode_to_seed(trimmed)
}
