//! Pure state transition function

use super::{Effect, Event};
use crate::session::state::{Phase, QuickAction, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Session is busy processing a turn")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same state and event it always produces the same new state
/// and effects, with no I/O side effects. The transcript is mutated only
/// by the runtime interpreting the returned effects.
pub fn transition(
    state: &SessionState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // Reset applies from any phase: transcript replaced wholesale with
        // the seeded greeting, pending action cleared.
        (_, Event::Reset) => Ok(TransitionResult::new(SessionState::default())
            .with_effect(Effect::SeedTranscript)
            .with_effect(Effect::NotifyReset)),

        // Free text submission runs one processing cycle. A queued quick
        // action takes priority over the freshly typed text.
        (Phase::Idle, Event::Submit { text }) => Ok(process_cycle(state.pending, Some(text))),

        // A quick-action press queues the action and drives the next cycle.
        (Phase::Idle, Event::SelectQuickAction { action }) => {
            Ok(TransitionResult::new(SessionState {
                phase: Phase::Idle,
                pending: Some(action),
            })
            .with_effect(Effect::RunCycle))
        }

        (Phase::Idle, Event::Cycle) => Ok(process_cycle(state.pending, None)),

        (Phase::Processing, Event::ReplyReady { reply }) => Ok(finish_turn(reply)),

        // Responder failure degrades to a single diagnostic Bot turn that
        // carries the failure description; the session stays usable.
        (Phase::Processing, Event::ReplyFailed { error }) => Ok(finish_turn(format!(
            "⚠️ Something went wrong while composing a reply ({error}). Please try again."
        ))),

        // Input while a turn is in flight. Unreachable with the single
        // session actor, which runs every turn to completion before taking
        // the next event, but rejected explicitly all the same.
        (
            Phase::Processing,
            Event::Submit { .. } | Event::SelectQuickAction { .. } | Event::Cycle,
        ) => Err(TransitionError::Busy),

        (Phase::Idle, Event::ReplyReady { .. } | Event::ReplyFailed { .. }) => Err(
            TransitionError::InvalidTransition("no turn in flight".to_string()),
        ),
    }
}

/// One processing cycle: consume exactly one input source, a queued quick
/// action ahead of typed text. Empty or whitespace-only input is silently
/// ignored and the session stays idle with the transcript unchanged.
fn process_cycle(pending: Option<QuickAction>, typed: Option<String>) -> TransitionResult {
    if let Some(action) = pending {
        return begin_turn(action.phrase().to_string());
    }

    match typed {
        Some(text) if !text.trim().is_empty() => begin_turn(text),
        _ => TransitionResult::new(SessionState::default()),
    }
}

fn begin_turn(input: String) -> TransitionResult {
    TransitionResult::new(SessionState {
        phase: Phase::Processing,
        pending: None,
    })
    .with_effect(Effect::append_user(input.clone()))
    .with_effect(Effect::NotifyTurn)
    .with_effect(Effect::RequestReply { input })
}

fn finish_turn(reply: String) -> TransitionResult {
    TransitionResult::new(SessionState::default())
        .with_effect(Effect::NotifyTyping)
        .with_effect(Effect::append_bot(reply))
        .with_effect(Effect::TypingPause)
        .with_effect(Effect::NotifyTurn)
}
