//! Conversation session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! events go in, a new state plus a list of effects come out, and the
//! runtime interprets the effects. Rendering is fully decoupled from
//! state mutation — notify effects are explicit.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{Phase, QuickAction, SessionContext, SessionState, Speaker, Transcript, Turn};
pub use transition::transition;
