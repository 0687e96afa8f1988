use mandate_game::{
    ChallengeModifier, DefeatType, EngineConfig, EngineError, EventCatalog, FactionId, GameMode,
    GameSession, GameState, Outcome, RegionKey, ScriptedRolls, SessionSetup, StartingBonuses,
    TurnEngine, VictoryType,
};
use serde_json::json;

#[test]
fn state_survives_a_json_round_trip() {
    let mut session = GameSession::with_rng(
        TurnEngine::standard().unwrap(),
        SessionSetup::new(GameMode::Expanded, 21),
        Box::new(ScriptedRolls::quiet()),
    );
    session.take_action("rally").unwrap();
    session.start_spin().unwrap();
    let state = session.into_state();

    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.turn, state.turn);
    assert_eq!(back.support, state.support);
    assert_eq!(back.faction_support, state.faction_support);
    assert_eq!(back.action_cooldowns, state.action_cooldowns);
    assert_eq!(back.consecutive_action_uses, state.consecutive_action_uses);
    assert_eq!(back.spin, state.spin);
    assert_eq!(back.news, state.news);
    assert_eq!(
        back.sentiment.reactions.len(),
        state.sentiment.reactions.len()
    );
}

#[test]
fn sparse_save_rehydrates_to_a_playable_state() {
    let sparse: GameState = serde_json::from_value(json!({
        "turn": 4,
        "risk": 140,
        "support": { "OH": 120, "ZZ": 40 },
        "faction_support": { "libertarians": 70 }
    }))
    .unwrap();
    let state = sparse.rehydrate(&EngineConfig::default());

    assert_eq!(state.turn, 4);
    assert_eq!(state.risk, 100);
    assert_eq!(state.support.len(), 51);
    assert_eq!(state.support["OH"], 100);
    assert!(!state.support.contains_key("ZZ"));
    assert_eq!(state.mode, GameMode::Standard);
    assert_eq!(
        state.faction_support.keys().copied().collect::<Vec<_>>(),
        GameMode::Standard.factions().to_vec()
    );
}

#[test]
fn outcome_keys_parse_from_data() {
    let outcome: Outcome = serde_json::from_value(json!({
        "support": { "ALL": 2, "midwest": 1, "oh": 3, "Random": -1 },
        "factions": { "populists": 4 },
        "risk": 2
    }))
    .unwrap();
    assert_eq!(outcome.support[&RegionKey::All], 2);
    assert_eq!(outcome.support[&RegionKey::Midwest], 1);
    assert_eq!(outcome.support[&RegionKey::code("OH")], 3);
    assert_eq!(outcome.support[&RegionKey::Random], -1);
    assert_eq!(outcome.factions[&FactionId::Populists], 4);
    assert_eq!(outcome.message, None);

    let written = serde_json::to_value(&outcome).unwrap();
    assert_eq!(written["support"]["ALL"], 2);
    assert_eq!(written["support"]["OH"], 3);
}

#[test]
fn terminal_types_use_screaming_names() {
    assert_eq!(
        serde_json::to_value(VictoryType::PopularMandate).unwrap(),
        json!("POPULAR_MANDATE")
    );
    assert_eq!(
        serde_json::to_value(DefeatType::FactionAbandonment).unwrap(),
        json!("FACTION_ABANDONMENT")
    );
}

#[test]
fn partial_config_keeps_defaults() {
    let cfg = EngineConfig::from_json(r#"{"victory": {"turn_limit": 30}}"#).unwrap();
    assert_eq!(cfg.victory.turn_limit, 30);
    assert_eq!(cfg.victory.bankruptcy_turns, 3);
    assert_eq!(cfg.economy, EngineConfig::default().economy);
}

#[test]
fn inconsistent_config_is_rejected() {
    let err = EngineConfig::from_json(r#"{"risk": {"caution_at": 60, "danger_at": 50}}"#)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
    let err = EngineConfig::from_json("{not json").unwrap_err();
    assert!(matches!(err, EngineError::Json(_)));
}

#[test]
fn bundled_catalog_validates() {
    let catalog = EventCatalog::builtin().unwrap();
    assert!(catalog.event("debate_night").is_some());
    let chain = catalog.chain("leaked_emails").unwrap();
    assert!(chain.step(&chain.start).is_some());
}

#[test]
fn dangling_chain_step_is_rejected() {
    let err = EventCatalog::from_json(
        r#"{
            "chains": [{
                "id": "broken",
                "name": "Broken",
                "start": "one",
                "steps": [{
                    "id": "one",
                    "title": "One",
                    "options": [{"label": "Onward", "next": "two"}]
                }]
            }]
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCatalog(_)));
}

#[test]
fn provider_shapes_parse() {
    let bonuses: StartingBonuses = serde_json::from_value(json!({
        "funds": 25,
        "faction_support": { "moderates": 5 }
    }))
    .unwrap();
    assert_eq!(bonuses.funds, 25);
    assert_eq!(bonuses.clout, 0);
    assert_eq!(bonuses.faction_support[&FactionId::Moderates], 5);

    let challenge: ChallengeModifier =
        serde_json::from_value(json!({ "disallow_action": "attack_ads" })).unwrap();
    assert_eq!(
        challenge,
        ChallengeModifier::DisallowAction("attack_ads".into())
    );
    let simple: ChallengeModifier = serde_json::from_value(json!("double_risk")).unwrap();
    assert_eq!(simple, ChallengeModifier::DoubleRisk);
}
