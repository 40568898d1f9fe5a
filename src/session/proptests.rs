//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::{Phase, QuickAction, SessionState, Speaker, Transcript, Turn};
use super::transition::transition;
use super::{Effect, Event};
use crate::intent;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_quick_action() -> impl Strategy<Value = QuickAction> {
    prop_oneof![
        Just(QuickAction::CreateAccount),
        Just(QuickAction::Courses),
        Just(QuickAction::TalkToAgent),
        Just(QuickAction::Assessment),
    ]
}

/// Any event the UI host can produce, including empty and junk text
fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[ -~]{0,40}".prop_map(|text| Event::Submit { text }),
        arb_quick_action().prop_map(|action| Event::SelectQuickAction { action }),
        Just(Event::Reset),
    ]
}

// ============================================================================
// Test Harness
// ============================================================================

/// Interpret transition effects the way the session runtime does, with the
/// rule responder inlined and the cosmetic delay elided.
fn drive(transcript: &mut Transcript, state: &mut SessionState, event: Event) {
    let mut queue = vec![event];

    while let Some(event) = queue.pop() {
        let Ok(result) = transition(state, event) else {
            return;
        };
        *state = result.new_state;

        for effect in result.effects {
            match effect {
                Effect::Append { speaker, text } => transcript.push(Turn { speaker, text }),
                Effect::SeedTranscript => transcript.reset(),
                Effect::RequestReply { input } => queue.push(Event::ReplyReady {
                    reply: intent::respond(Some(&input)).to_string(),
                }),
                Effect::RunCycle => queue.push(Event::Cycle),
                Effect::NotifyTurn
                | Effect::NotifyTyping
                | Effect::TypingPause
                | Effect::NotifyReset => {}
            }
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// User events from idle never produce a transition error.
    #[test]
    fn user_events_from_idle_never_error(event in arb_user_event()) {
        let state = SessionState::default();
        prop_assert!(transition(&state, event).is_ok());
    }

    /// A processing cycle consumes at most one input source and appends at
    /// most one User turn.
    #[test]
    fn one_input_source_per_cycle(
        pending in proptest::option::of(arb_quick_action()),
        text in "[ -~]{0,40}",
    ) {
        let state = SessionState { phase: Phase::Idle, pending };
        let result = transition(&state, Event::Submit { text }).unwrap();

        let appended: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Append { speaker: Speaker::User, text } => Some(text.clone()),
                _ => None,
            })
            .collect();

        prop_assert!(appended.len() <= 1);
        if let (Some(action), Some(consumed)) = (pending, appended.first()) {
            prop_assert_eq!(consumed.as_str(), action.phrase());
        }
    }

    /// After any event sequence the transcript starts with the seeded Bot
    /// greeting and continues in strict (User, Bot) pairs, so the length is
    /// always odd and at least 1. The session always comes back to idle.
    #[test]
    fn transcript_is_seed_plus_turn_pairs(events in proptest::collection::vec(arb_user_event(), 0..12)) {
        let mut transcript = Transcript::seeded();
        let mut state = SessionState::default();

        for event in events {
            drive(&mut transcript, &mut state, event);
        }

        prop_assert_eq!(state.phase, Phase::Idle);
        prop_assert!(transcript.len() >= 1);
        prop_assert_eq!(transcript.len() % 2, 1);

        let turns = transcript.turns();
        prop_assert_eq!(turns[0].speaker, Speaker::Bot);
        for pair in turns[1..].chunks(2) {
            prop_assert_eq!(pair[0].speaker, Speaker::User);
            prop_assert_eq!(pair[1].speaker, Speaker::Bot);
        }
    }

    /// A quick action grows the transcript by exactly one (User, Bot) pair,
    /// with the canonical phrase as the User turn.
    #[test]
    fn quick_action_appends_exactly_one_pair(action in arb_quick_action()) {
        let mut transcript = Transcript::seeded();
        let mut state = SessionState::default();

        drive(&mut transcript, &mut state, Event::SelectQuickAction { action });

        prop_assert_eq!(transcript.len(), 3);
        let turns = transcript.turns();
        prop_assert_eq!(&turns[1], &Turn::user(action.phrase()));
        prop_assert_eq!(
            turns[2].text.as_str(),
            intent::respond(Some(action.phrase()))
        );
        prop_assert_eq!(state.pending, None);
    }

    /// Reset always leaves exactly the seeded greeting, regardless of prior
    /// history.
    #[test]
    fn reset_always_reseeds(events in proptest::collection::vec(arb_user_event(), 0..8)) {
        let mut transcript = Transcript::seeded();
        let mut state = SessionState::default();

        for event in events {
            drive(&mut transcript, &mut state, event);
        }
        drive(&mut transcript, &mut state, Event::Reset);

        prop_assert_eq!(transcript.len(), 1);
        prop_assert_eq!(state, SessionState::default());
    }
}
