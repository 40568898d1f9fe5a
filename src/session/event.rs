//! Events that can occur in a session

use crate::responder::ResponderError;
use crate::session::state::QuickAction;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events (from the UI host)
    /// Free text submitted via the input box
    Submit { text: String },
    /// A quick-action button was pressed
    SelectQuickAction { action: QuickAction },
    /// Wipe the transcript back to the seeded greeting
    Reset,

    // Runtime-internal events
    /// Drive one processing cycle (consumes a queued quick action, if any)
    Cycle,
    /// The responder produced a reply for the turn in flight
    ReplyReady { reply: String },
    /// The responder failed; degrades to a diagnostic Bot turn
    ReplyFailed { error: ResponderError },
}
