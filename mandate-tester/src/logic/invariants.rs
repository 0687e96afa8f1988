//! State checks applied after every intent during automated play.
use mandate_game::constants::NEWS_LOG_LIMIT;
use mandate_game::{GameState, TurnEngine};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{field} is {value}, outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("{field} decreased from {before} to {after}")]
    CounterDecreased {
        field: &'static str,
        before: u64,
        after: u64,
    },
    #[error("turn moved from {before} to {after}")]
    TurnJump { before: u32, after: u32 },
    #[error("a rejected intent changed the state")]
    RejectedMutation,
    #[error("action {0} is available while an event is pending")]
    ExclusivityBroken(String),
    #[error("news log holds {0} lines")]
    NewsOverflow(usize),
    #[error("the state changed after the campaign ended")]
    ActedAfterEnd,
    #[error("risk rose from {before} to {after} but the streak is {streak}")]
    StreakKept { before: i32, after: i32, streak: u32 },
}

fn range(field: impl Into<String>, value: i32, min: i32, max: i32) -> Option<Violation> {
    (!(min..=max).contains(&value)).then(|| Violation::OutOfRange {
        field: field.into(),
        value: i64::from(value),
        min: i64::from(min),
        max: i64::from(max),
    })
}

/// Bounds every reachable state must respect.
#[must_use]
pub fn check_bounds(state: &GameState) -> Vec<Violation> {
    let mut found: Vec<Violation> = state
        .support
        .iter()
        .filter_map(|(code, value)| range(format!("support[{code}]"), *value, 0, 100))
        .collect();
    found.extend(
        state
            .faction_support
            .iter()
            .filter_map(|(faction, value)| range(format!("faction[{faction}]"), *value, 0, 100)),
    );
    found.extend(range("risk", state.risk, 0, 100));
    found.extend(range("funds", state.funds, 0, i32::MAX));
    found.extend(range("clout", state.clout, 0, i32::MAX));
    if state.news.len() > NEWS_LOG_LIMIT {
        found.push(Violation::NewsOverflow(state.news.len()));
    }
    found
}

/// Compare consecutive states. `accepted` is whether the intent between them succeeded.
#[must_use]
pub fn check_transition(before: &GameState, after: &GameState, accepted: bool) -> Vec<Violation> {
    let mut found = Vec::new();
    if !accepted {
        if !unchanged_apart_from_news(before, after) {
            found.push(Violation::RejectedMutation);
        }
        return found;
    }
    if before.game_over {
        found.push(Violation::ActedAfterEnd);
    }
    if after.turn != before.turn && after.turn != before.turn + 1 {
        found.push(Violation::TurnJump {
            before: before.turn,
            after: after.turn,
        });
    }
    if after.risk > before.risk && after.streak != 0 {
        found.push(Violation::StreakKept {
            before: before.risk,
            after: after.risk,
            streak: after.streak,
        });
    }
    for (field, old, new) in [
        (
            "total_funds_earned",
            before.total_funds_earned,
            after.total_funds_earned,
        ),
        (
            "total_clout_earned",
            before.total_clout_earned,
            after.total_clout_earned,
        ),
    ] {
        if new < old {
            found.push(Violation::CounterDecreased {
                field,
                before: old,
                after: new,
            });
        }
    }
    found
}

/// Rejections may only add a news line.
fn unchanged_apart_from_news(before: &GameState, after: &GameState) -> bool {
    let mut comparable = after.clone();
    comparable.news.clone_from(&before.news);
    comparable == *before
}

/// With a decision pending, no action may be offered.
#[must_use]
pub fn check_exclusivity(engine: &TurnEngine, state: &GameState) -> Vec<Violation> {
    if state.pending_event.is_none() {
        return Vec::new();
    }
    engine
        .available_actions(state)
        .into_iter()
        .map(|action| Violation::ExclusivityBroken(action.id.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandate_game::{EventSource, PendingEvent};

    #[test]
    fn fresh_state_is_clean() {
        let state = GameState::default();
        assert!(check_bounds(&state).is_empty());
        assert!(check_transition(&state, &state, false).is_empty());
    }

    #[test]
    fn flags_out_of_range_values() {
        let mut state = GameState::default();
        state.risk = 101;
        state.funds = -1;
        let found = check_bounds(&state);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].to_string(), "risk is 101, outside 0..=100");
    }

    #[test]
    fn rejection_news_is_not_a_mutation() {
        let before = GameState::default();
        let mut after = before.clone();
        after.push_news("Unknown action `nap`.");
        assert!(check_transition(&before, &after, false).is_empty());
    }

    #[test]
    fn flags_bad_transitions() {
        let before = GameState::default();
        let mut after = before.clone();
        after.turn = 3;
        after.total_funds_earned = 0;
        let mut earned = before.clone();
        earned.total_funds_earned = 10;

        assert_eq!(
            check_transition(&before, &after, false),
            vec![Violation::RejectedMutation]
        );
        assert_eq!(
            check_transition(&before, &after, true),
            vec![Violation::TurnJump { before: 0, after: 3 }]
        );
        assert!(matches!(
            check_transition(&earned, &before, true)[0],
            Violation::CounterDecreased {
                field: "total_funds_earned",
                ..
            }
        ));
    }

    #[test]
    fn rising_risk_must_reset_streak() {
        let mut before = GameState::default();
        before.streak = 3;
        let mut after = before.clone();
        after.risk = 5;
        after.streak = 4;
        assert_eq!(
            check_transition(&before, &after, true),
            vec![Violation::StreakKept {
                before: 0,
                after: 5,
                streak: 4
            }]
        );
        after.streak = 0;
        assert!(check_transition(&before, &after, true).is_empty());
    }

    #[test]
    fn pending_event_blocks_every_action() {
        let engine = TurnEngine::standard().unwrap();
        let mut state = GameState::default();
        assert!(check_exclusivity(&engine, &state).is_empty());
        state.pending_event = Some(PendingEvent {
            source: EventSource::OneShot {
                event_id: "debate_night".to_string(),
            },
            title: "Debate Night".to_string(),
            description: String::new(),
            options: Vec::new(),
        });
        assert!(check_exclusivity(&engine, &state).is_empty());
    }
}
