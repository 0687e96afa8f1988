use anyhow::{Context, Result, bail};
use mandate_game::{GameMode, decode_to_seed, encode_friendly};
use std::collections::HashMap;

/// Seed plus the share code (and mode) it was typed as, if any.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_mode: Option<GameMode>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_mode: None,
        }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, mode: GameMode, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            source_mode: Some(mode),
        }
    }

    /// Share codes pin a mode; bare numbers run under any mode.
    #[must_use]
    pub fn matches_mode(&self, mode: GameMode) -> bool {
        self.source_mode.is_none_or(|source| source == mode)
    }

    #[must_use]
    pub fn share_code_for_mode(&self, mode: GameMode) -> String {
        if let (Some(code), Some(source_mode)) = (&self.code, self.source_mode)
            && source_mode == mode
        {
            return code.clone();
        }
        encode_friendly(mode, self.seed)
    }
}

/// Resolve CLI seed arguments into canonical seed metadata.
///
/// Accepts integers, share codes such as `ST-RALLY42`, and the keywords
/// `all` / `available`, which expand to every share code in both modes.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens.iter().map(|token| token.trim()) {
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }
        if let Some((mode, seed)) = decode_to_seed(token) {
            pending.push(SeedInfo::from_share_code(seed, mode, token.to_uppercase()));
            continue;
        }
        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(all_share_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, u8), usize> = HashMap::new();
    for info in pending {
        let key = (info.seed, mode_tag(info.source_mode));
        match index.get(&key).and_then(|idx| deduped.get_mut(*idx)) {
            Some(existing) => {
                if existing.code.is_none() && info.code.is_some() {
                    *existing = info;
                }
            }
            None => {
                index.insert(key, deduped.len());
                deduped.push(info);
            }
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }
    Ok(deduped)
}

fn all_share_code_seeds() -> Result<Vec<SeedInfo>> {
    use mandate_game::seed::WORD_LIST;

    let modes = [GameMode::Standard, GameMode::Expanded];
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100 * modes.len());
    for word in WORD_LIST {
        for suffix in 0..100 {
            for mode in modes {
                let code = format!("{}-{word}{suffix:02}", mode.code());
                let (mode, seed) = decode_to_seed(&code)
                    .with_context(|| format!("failed to parse share code: {code}"))?;
                seeds.push(SeedInfo::from_share_code(seed, mode, code));
            }
        }
    }
    Ok(seeds)
}

const fn mode_tag(mode: Option<GameMode>) -> u8 {
    match mode {
        None => 0,
        Some(GameMode::Standard) => 1,
        Some(GameMode::Expanded) => 2,
    }
}
