//! Effects produced by state transitions

use crate::session::state::Speaker;

/// Effects to be executed after a state transition.
///
/// Transitions never touch the transcript or the renderer directly; the
/// runtime interprets these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript
    Append { speaker: Speaker, text: String },

    /// Replace the transcript wholesale with the seeded greeting
    SeedTranscript,

    /// Invoke the responder; feeds back `ReplyReady` or `ReplyFailed`
    RequestReply { input: String },

    /// Drive one processing cycle; feeds back `Cycle`
    RunCycle,

    /// Broadcast the most recently appended turn to renderers
    NotifyTurn,

    /// Broadcast the typing indicator to renderers
    NotifyTyping,

    /// Cosmetic pause before the reply is rendered. Purely presentational:
    /// the Bot turn is already in the transcript when this runs.
    TypingPause,

    /// Broadcast the freshly reset transcript to renderers
    NotifyReset,
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::Append {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn append_bot(text: impl Into<String>) -> Self {
        Effect::Append {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}
