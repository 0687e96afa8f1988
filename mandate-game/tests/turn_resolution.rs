use std::collections::BTreeMap;

use mandate_game::rng::RngStream;
use mandate_game::{
    ActionCost, ActionDefinition, ActionId, ActionRegistry, ActiveChain, BonusKind, EngineConfig,
    EventCatalog, EventSource, GameState, Outcome, Reels, Rejection, Requirement, RiskZone,
    ScriptedRolls, SessionContext, TurnEngine,
};

fn windfall(_: &GameState) -> Outcome {
    Outcome::new().with_funds(50)
}

fn windfall_engine() -> TurnEngine {
    let registry = ActionRegistry::new(vec![ActionDefinition {
        id: ActionId::from("windfall"),
        name: "Windfall",
        description: "A donor wire arrives.",
        cost: ActionCost::funds(30),
        cooldown: 0,
        locked_from: None,
        requirement: None,
        faction_modifiers: BTreeMap::new(),
        effect: windfall,
    }])
    .unwrap();
    TurnEngine::new(
        registry,
        EventCatalog::empty(),
        Reels::standard().unwrap(),
        EngineConfig::default(),
    )
}

fn engine_with_events(json: &str) -> TurnEngine {
    TurnEngine::new(
        ActionRegistry::standard(),
        EventCatalog::from_json(json).unwrap(),
        Reels::standard().unwrap(),
        EngineConfig::default(),
    )
}

fn quiet_engine() -> TurnEngine {
    TurnEngine::new(
        ActionRegistry::standard(),
        EventCatalog::empty(),
        Reels::standard().unwrap(),
        EngineConfig::default(),
    )
}

#[test]
fn critical_windfall_pays_double_after_cost() {
    let engine = windfall_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet().forcing_critical();
    let state = GameState::default();
    assert_eq!(state.funds, 100);

    let resolution = engine.resolve_action(state, &mut ctx, &mut rolls, "windfall");
    let report = resolution.result.unwrap();
    assert_eq!(report.modifiers.bonus, BonusKind::Critical);
    assert_eq!(report.cost, ActionCost::funds(30));
    assert_eq!(resolution.state.funds, 170);
    assert_eq!(resolution.state.total_funds_earned, 100);
    assert_eq!(resolution.state.turn, 1);
}

#[test]
fn session_opener_applies_once() {
    let engine = windfall_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();

    let first = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "windfall");
    assert_eq!(
        first.result.as_ref().unwrap().modifiers.bonus,
        BonusKind::SessionOpener
    );
    // 100 - 30 + 75
    assert_eq!(first.state.funds, 145);

    let second = engine.resolve_action(first.state, &mut ctx, &mut rolls, "windfall");
    assert_eq!(second.result.unwrap().modifiers.bonus, BonusKind::None);
    // second use in a row: 50 * 0.75
    assert_eq!(second.state.funds, 145 - 30 + 38);
}

#[test]
fn pending_event_blocks_every_action() {
    let engine = TurnEngine::standard().unwrap();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet().with_stream(RngStream::Event, 0.0);

    let opened = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "regroup");
    let notice = opened.result.unwrap().event.expect("turn one always schedules");
    assert!(!notice.narrative);
    let mut state = opened.state;
    assert!(state.pending_event.is_some());

    let ids: Vec<String> = engine
        .registry()
        .iter()
        .map(|action| action.id.to_string())
        .collect();
    for id in ids {
        let before = state.clone();
        let blocked = engine.resolve_action(state, &mut ctx, &mut rolls, &id);
        assert_eq!(blocked.result.unwrap_err(), Rejection::EventPending);
        assert_eq!(blocked.state.funds, before.funds);
        assert_eq!(blocked.state.clout, before.clout);
        assert_eq!(blocked.state.support, before.support);
        assert_eq!(blocked.state.turn, before.turn);
        assert_eq!(blocked.state.news.len(), before.news.len() + 1);
        state = blocked.state;
    }

    let spin = engine.start_spin(state, &mut rolls);
    assert_eq!(spin.result.unwrap_err(), Rejection::EventPending);
    assert!(spin.state.spin.is_none());
}

#[test]
fn answering_an_event_clears_it_without_advancing() {
    let engine = TurnEngine::standard().unwrap();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet().with_stream(RngStream::Event, 0.0);

    let opened = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "regroup");
    let state = opened.state;
    let pending = state.pending_event.clone().unwrap();
    assert_eq!(pending.title, "Debate Night");

    let invalid = engine.resolve_event(state, &mut ctx, 5);
    assert_eq!(
        invalid.result.unwrap_err(),
        Rejection::InvalidOption {
            index: 5,
            available: 2
        }
    );
    let before = invalid.state.clone();

    let answered = engine.resolve_event(invalid.state, &mut ctx, 1);
    let report = answered.result.unwrap();
    assert_eq!(report.option, "Stay presidential");
    assert!(report.chain_completed.is_none());
    let state = answered.state;
    assert!(state.pending_event.is_none());
    assert_eq!(state.turn, before.turn);
    assert_eq!(state.clout, before.clout + 4);
    assert_eq!(state.support["OH"], before.support["OH"] + 1);

    let next = engine.resolve_action(state, &mut ctx, &mut rolls, "regroup");
    assert!(next.is_accepted());
}

#[test]
fn rejected_preconditions_leave_state_untouched() {
    let engine = quiet_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet().forcing_critical();

    let mut poor = GameState::default();
    poor.funds = 5;
    let resolution = engine.resolve_action(poor.clone(), &mut ctx, &mut rolls, "tv_ads");
    assert_eq!(
        resolution.result.unwrap_err(),
        Rejection::InsufficientFunds {
            action: "TV Ads".to_string(),
            needed: 30,
            available: 5
        }
    );
    assert_eq!(resolution.state.funds, poor.funds);
    assert_eq!(resolution.state.clout, poor.clout);
    assert_eq!(resolution.state.support, poor.support);
    assert_eq!(resolution.state.turn, 0);
    assert!(!ctx.first_action_taken);

    let mut hot = GameState::default();
    hot.risk = 80;
    let locked = engine.resolve_action(hot, &mut ctx, &mut rolls, "attack_ads");
    assert_eq!(
        locked.result.unwrap_err(),
        Rejection::LockedByRisk {
            action: "Attack Ads".to_string(),
            zone: RiskZone::Critical
        }
    );

    let calm = GameState::default();
    let early = engine.resolve_action(calm, &mut ctx, &mut rolls, "endorsements");
    assert_eq!(
        early.result.unwrap_err(),
        Rejection::RequirementNotMet {
            action: "Endorsements".to_string(),
            requirement: Requirement::MinTurn(5)
        }
    );
    let nothing_to_control = engine.resolve_action(early.state, &mut ctx, &mut rolls, "damage_control");
    assert!(matches!(
        nothing_to_control.result,
        Err(Rejection::RequirementNotMet {
            requirement: Requirement::MinRisk(10),
            ..
        })
    ));
    assert_eq!(nothing_to_control.state.turn, 0);
}

#[test]
fn streak_resets_when_risk_rises() {
    let engine = quiet_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();

    let rally = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "rally");
    assert_eq!(rally.state.risk, 1);
    assert_eq!(rally.state.streak, 0);
    let calm = engine.resolve_action(rally.state, &mut ctx, &mut rolls, "regroup");
    assert_eq!(calm.state.risk, 0);
    assert_eq!(calm.state.streak, 1);
    let calmer = engine.resolve_action(calm.state, &mut ctx, &mut rolls, "regroup");
    assert_eq!(calmer.state.streak, 2);
    let hot = engine.resolve_action(calmer.state, &mut ctx, &mut rolls, "fundraiser");
    assert_eq!(hot.state.streak, 0);
}

#[test]
fn turn_news_headline_names_the_action() {
    let engine = quiet_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();
    let resolution = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "rally");
    let headline = resolution.state.news.first().unwrap();
    assert!(headline.starts_with("Turn 1: Rally - "));
}

#[test]
fn spin_resolves_as_a_turn() {
    let engine = quiet_engine();
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();

    let started = engine.start_spin(GameState::default(), &mut rolls);
    assert!(started.is_accepted());
    let again = engine.start_spin(started.state, &mut rolls);
    assert_eq!(again.result.unwrap_err(), Rejection::SpinAlreadyActive);

    let resolved = engine.resolve_spin(again.state, &mut ctx, &mut rolls);
    let report = resolved.result.unwrap();
    assert!(report.combo.is_some());
    assert_eq!(report.action.as_str(), "spin");
    assert_eq!(resolved.state.turn, 1);
    assert!(resolved.state.spin.is_none());

    let none = engine.resolve_spin(resolved.state, &mut ctx, &mut rolls);
    assert_eq!(none.result.unwrap_err(), Rejection::NoActiveSpin);
}

#[test]
fn narrative_event_effects_reach_streak_and_bankruptcy() {
    let engine = engine_with_events(
        r#"{"events": [{"id": "audit", "title": "Surprise Audit", "outcome": {"risk": 5, "funds": -500}}]}"#,
    );
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();

    let resolution = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "regroup");
    let report = resolution.result.unwrap();
    assert!(report.event.expect("turn one always schedules").narrative);
    let state = resolution.state;
    assert_eq!(state.risk, 5);
    assert_eq!(state.streak, 0);
    assert_eq!(state.funds, 0);
    assert_eq!(state.bankrupt_turns, 1);
}

#[test]
fn risky_event_answer_breaks_the_streak() {
    let engine = engine_with_events(
        r#"{"events": [{"id": "scoop", "title": "Scoop", "options": [
            {"label": "Leak it", "outcome": {"risk": 3}},
            {"label": "Sit on it"}
        ]}]}"#,
    );
    let mut ctx = SessionContext::default();
    let mut rolls = ScriptedRolls::quiet();

    let opened = engine.resolve_action(GameState::default(), &mut ctx, &mut rolls, "regroup");
    let mut state = opened.state;
    assert!(state.pending_event.is_some());
    state.streak = 4;

    let calm = engine.resolve_event(state.clone(), &mut ctx, 1);
    assert_eq!(calm.state.streak, 4);
    let leaked = engine.resolve_event(state, &mut ctx, 0);
    assert!(leaked.is_accepted());
    assert_eq!(leaked.state.risk, 3);
    assert_eq!(leaked.state.streak, 0);
}

#[test]
fn chain_walks_from_first_step_to_completion() {
    let engine = engine_with_events(
        r#"{"chains": [{"id": "leak", "name": "The Leak", "start": "a", "steps": [
            {"id": "a", "title": "Leak", "options": [{"label": "Deny", "next": "b"}, {"label": "Own it"}]},
            {"id": "b", "title": "Fallout", "options": [{"label": "Resign staffer", "outcome": {"clout": 2}}]}
        ]}]}"#,
    );
    let mut ctx = SessionContext::default();
    let mut hot = ScriptedRolls::quiet().with_stream(RngStream::Event, 0.0);
    let mut quiet = ScriptedRolls::quiet();

    // turn one only draws one-shots, and there are none
    let first = engine.resolve_action(GameState::default(), &mut ctx, &mut hot, "regroup");
    assert!(first.result.unwrap().event.is_none());
    let second = engine.resolve_action(first.state, &mut ctx, &mut hot, "regroup");
    assert_eq!(second.result.unwrap().event.unwrap().title, "Leak");
    let state = second.state;
    assert_eq!(
        state.active_chain,
        Some(ActiveChain {
            chain_id: "leak".to_string(),
            step_id: "a".to_string()
        })
    );

    let denied = engine.resolve_event(state, &mut ctx, 0);
    assert!(denied.result.unwrap().chain_completed.is_none());
    assert_eq!(
        denied.state.active_chain.as_ref().map(|chain| chain.step_id.as_str()),
        Some("b")
    );
    assert!(denied.state.pending_event.is_none());

    let third = engine.resolve_action(denied.state, &mut ctx, &mut quiet, "regroup");
    assert_eq!(third.result.unwrap().event.unwrap().title, "Fallout");
    let pending = third.state.pending_event.clone().unwrap();
    assert_eq!(
        pending.source,
        EventSource::Chain {
            chain_id: "leak".to_string(),
            step_id: "b".to_string()
        }
    );

    let clout = third.state.clout;
    let finished = engine.resolve_event(third.state, &mut ctx, 0);
    let report = finished.result.unwrap();
    assert_eq!(report.chain_completed.as_deref(), Some("leak"));
    assert!(finished.state.active_chain.is_none());
    assert_eq!(finished.state.clout, clout + 2);
    assert!(ctx.scheduler.completed_chains.contains("leak"));
}
