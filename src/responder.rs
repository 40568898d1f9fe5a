//! Responder abstraction
//!
//! The seam between the conversation session and whatever computes
//! replies. The production implementation is the rule table in
//! [`crate::intent`]; tests swap in failing implementations to exercise
//! the session's protective boundary.

use crate::intent;
use std::borrow::Cow;
use thiserror::Error;

/// Failure while computing a reply.
///
/// The rule-table responder is total and never produces one of these, but
/// the session treats any responder defensively: an error becomes a single
/// diagnostic Bot turn and the session stays usable.
#[derive(Debug, Clone, Error)]
pub enum ResponderError {
    #[error("internal responder failure: {0}")]
    Internal(String),
}

impl ResponderError {
    #[allow(dead_code)] // Constructed by failing responders in tests
    pub fn internal(message: impl Into<String>) -> Self {
        ResponderError::Internal(message.into())
    }
}

/// Computes a reply for one user message
pub trait Responder: Send + Sync {
    /// Compute the reply for `raw` user text (`None` = missing input).
    ///
    /// Implementations must not block or perform I/O; a turn is processed
    /// synchronously to completion.
    fn respond(&self, raw: Option<&str>) -> Result<Cow<'static, str>, ResponderError>;
}

/// Production responder backed by the fixed rule table
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleResponder;

impl Responder for RuleResponder {
    fn respond(&self, raw: Option<&str>) -> Result<Cow<'static, str>, ResponderError> {
        Ok(Cow::Borrowed(intent::respond(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{FALLBACK_REPLY, GREETING_REPLY};

    #[test]
    fn rule_responder_never_fails() {
        let responder = RuleResponder;
        assert_eq!(responder.respond(Some("hello")).unwrap(), GREETING_REPLY);
        assert_eq!(responder.respond(None).unwrap(), FALLBACK_REPLY);
        assert_eq!(responder.respond(Some("")).unwrap(), FALLBACK_REPLY);
    }
}
