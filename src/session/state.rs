//! Session state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting turn seeded into every fresh transcript
pub const SEEDED_GREETING: &str =
    "👋 Hi, I'm the helpdesk bot! Ask me anything, or pick a quick action below.";

// ============================================================================
// Turns and Transcript
// ============================================================================

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

/// One entry in the transcript. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}

/// Ordered conversation history for one session.
///
/// Append-only between resets; a reset replaces it wholesale with the
/// seeded greeting, so the length is always at least 1. Growth is
/// unbounded — an accepted limitation, not an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// A fresh transcript holding only the seeded Bot greeting
    pub fn seeded() -> Self {
        Self {
            turns: vec![Turn::bot(SEEDED_GREETING)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Replace the whole history with the seeded greeting
    pub fn reset(&mut self) {
        *self = Self::seeded();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded()
    }
}

// ============================================================================
// Quick Actions
// ============================================================================

/// Predefined phrases triggerable via dedicated UI buttons.
///
/// Selecting one queues it as the pending input for the next processing
/// cycle, exactly as if the user had typed the canonical phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickAction {
    #[serde(rename = "create account")]
    CreateAccount,
    #[serde(rename = "courses")]
    Courses,
    #[serde(rename = "talk to agent")]
    TalkToAgent,
    #[serde(rename = "assessment")]
    Assessment,
}

impl QuickAction {
    #[allow(dead_code)] // Enumerated in tests
    pub const ALL: [QuickAction; 4] = [
        QuickAction::CreateAccount,
        QuickAction::Courses,
        QuickAction::TalkToAgent,
        QuickAction::Assessment,
    ];

    /// The canonical phrase this action stands for
    pub fn phrase(self) -> &'static str {
        match self {
            QuickAction::CreateAccount => "create account",
            QuickAction::Courses => "courses",
            QuickAction::TalkToAgent => "talk to agent",
            QuickAction::Assessment => "assessment",
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Processing phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for input
    #[default]
    Idle,
    /// A turn is being processed; resolves within the same event cycle
    Processing,
}

/// Pure state the transition function operates on.
///
/// The transcript itself is owned by the session runtime; transitions
/// mutate it only through effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// At most one queued quick action; consumed ahead of typed text
    pub pending: Option<QuickAction>,
}

/// Immutable per-session configuration
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: String,
    /// Human-friendly name used in log lines and the UI
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            slug: slug.into(),
            created_at: Utc::now(),
        }
    }
}
