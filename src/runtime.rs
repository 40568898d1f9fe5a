//! Runtime for executing sessions
//!
//! Each session runs as one task that owns the transcript and processes
//! events strictly one at a time, so every turn runs to completion before
//! the next input is looked at. Renderer notifications go out over a
//! broadcast channel; nothing here persists anything.

use crate::responder::Responder;
use crate::session::{
    transition, Effect, Event, SessionContext, SessionState, Transcript, Turn,
};
use chrono::{Local, Timelike};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session closed: {0}")]
    Closed(String),
}

/// Transcript shared between a session's runtime task and API handlers.
///
/// Only the runtime task writes; handlers take snapshots for the initial
/// page load and live off the broadcast channel afterwards.
#[derive(Debug, Clone)]
pub struct SharedTranscript {
    inner: Arc<RwLock<Transcript>>,
}

impl SharedTranscript {
    fn seeded() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Transcript::seeded())),
        }
    }

    pub async fn snapshot(&self) -> Transcript {
        self.inner.read().await.clone()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn push(&self, turn: Turn) {
        self.inner.write().await.push(turn);
    }

    async fn reset(&self) {
        self.inner.write().await.reset();
    }

    async fn last(&self) -> Option<Turn> {
        self.inner.read().await.last().cloned()
    }
}

/// Events sent to connected renderers
#[derive(Debug, Clone)]
pub enum Notification {
    /// Full snapshot for a freshly connected renderer
    Init {
        session: Value,
        transcript: Value,
        typing: bool,
    },
    /// A turn was appended
    Turn { turn: Value },
    /// The bot is "typing" (cosmetic; the reply follows)
    Typing,
    /// The transcript was reset to the seeded greeting
    Reset { transcript: Value },
    /// An event was rejected or something went wrong
    Error { message: String },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub context: Arc<SessionContext>,
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<Notification>,
    pub transcript: SharedTranscript,
    typing: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn is_typing(&self) -> bool {
        self.typing.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Session Runtime
// ============================================================================

struct SessionRuntime {
    context: Arc<SessionContext>,
    state: SessionState,
    responder: Arc<dyn Responder>,
    transcript: SharedTranscript,
    typing: Arc<AtomicBool>,
    typing_delay: Duration,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<Notification>,
}

impl SessionRuntime {
    async fn run(mut self) {
        tracing::info!(
            session_id = %self.context.session_id,
            slug = %self.context.slug,
            "Starting session runtime"
        );

        // Stops when the manager drops the handle and the channel closes.
        while let Some(event) = self.event_rx.recv().await {
            if let Err(message) = self.process_event(event).await {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    error = %message,
                    "Rejected event"
                );
                let _ = self.broadcast_tx.send(Notification::Error { message });
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    /// Process one event to completion, chaining runtime-generated events
    /// (reply results, driven cycles) within the same call.
    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        let mut events_to_process = vec![event];

        while let Some(current) = events_to_process.pop() {
            // Pure state transition
            let result = transition(&self.state, current).map_err(|e| e.to_string())?;
            self.state = result.new_state;

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect).await {
                    events_to_process.push(generated);
                }
            }
        }

        Ok(())
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Append { speaker, text } => {
                self.transcript.push(Turn { speaker, text }).await;
                None
            }

            Effect::SeedTranscript => {
                self.transcript.reset().await;
                None
            }

            Effect::RequestReply { input } => match self.responder.respond(Some(&input)) {
                Ok(reply) => Some(Event::ReplyReady {
                    reply: reply.into_owned(),
                }),
                Err(error) => {
                    tracing::error!(
                        session_id = %self.context.session_id,
                        error = %error,
                        "Responder failed"
                    );
                    Some(Event::ReplyFailed { error })
                }
            },

            Effect::RunCycle => Some(Event::Cycle),

            Effect::NotifyTurn => {
                self.typing.store(false, Ordering::Relaxed);
                if let Some(turn) = self.transcript.last().await {
                    let _ = self.broadcast_tx.send(Notification::Turn {
                        turn: serde_json::to_value(&turn).unwrap_or(Value::Null),
                    });
                }
                None
            }

            Effect::NotifyTyping => {
                self.typing.store(true, Ordering::Relaxed);
                let _ = self.broadcast_tx.send(Notification::Typing);
                None
            }

            Effect::TypingPause => {
                // The transcript is already updated; this only holds back
                // the renderer notification.
                if !self.typing_delay.is_zero() {
                    tokio::time::sleep(self.typing_delay).await;
                }
                None
            }

            Effect::NotifyReset => {
                self.typing.store(false, Ordering::Relaxed);
                let transcript = self.transcript.snapshot().await;
                let _ = self.broadcast_tx.send(Notification::Reset {
                    transcript: serde_json::to_value(&transcript).unwrap_or(Value::Null),
                });
                None
            }
        }
    }
}

// ============================================================================
// Session Manager
// ============================================================================

/// Manager for all live sessions
pub struct SessionManager {
    responder: Arc<dyn Responder>,
    typing_delay: Duration,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(responder: Arc<dyn Responder>, typing_delay: Duration) -> Self {
        Self {
            responder,
            typing_delay,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session with a seeded transcript and start its runtime task
    pub async fn create_session(&self) -> SessionHandle {
        let id = uuid::Uuid::new_v4().to_string();
        let context = Arc::new(SessionContext::new(&id, generate_slug()));
        let transcript = SharedTranscript::seeded();
        let typing = Arc::new(AtomicBool::new(false));

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = SessionRuntime {
            context: Arc::clone(&context),
            state: SessionState::default(),
            responder: Arc::clone(&self.responder),
            transcript: transcript.clone(),
            typing: Arc::clone(&typing),
            typing_delay: self.typing_delay,
            event_rx,
            broadcast_tx: broadcast_tx.clone(),
        };
        tokio::spawn(runtime.run());

        let handle = SessionHandle {
            context,
            event_tx,
            broadcast_tx,
            transcript,
            typing,
        };
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Send an event to a session
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), SessionError> {
        let handle = self.get(session_id).await?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Subscribe to a session's renderer notifications
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<Notification>, SessionError> {
        Ok(self.get(session_id).await?.broadcast_tx.subscribe())
    }

    /// Drop a session. All of its state is discarded; the runtime task
    /// stops once the last event sender is gone.
    pub async fn end_session(&self, session_id: &str) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(session_id) {
            Some(handle) => {
                tracing::info!(
                    session_id = %session_id,
                    slug = %handle.context.slug,
                    "Session ended"
                );
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Human-friendly session name for log lines and the page header
fn generate_slug() -> String {
    let now = Local::now();

    let time = match now.hour() {
        6..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    };

    let words = &[
        "maple", "cedar", "birch", "willow", "aspen", "juniper", "heron", "finch", "wren",
        "plover", "swallow", "osprey", "amber", "coral", "indigo", "sage", "slate", "pearl",
    ];

    let mut rng = rand::thread_rng();
    let first = words.choose(&mut rng).unwrap_or(&"blue");
    let second = words.choose(&mut rng).unwrap_or(&"desk");

    format!("{time}-{first}-{second}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent;
    use crate::responder::{ResponderError, RuleResponder};
    use crate::session::{QuickAction, Speaker};
    use std::borrow::Cow;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(RuleResponder), Duration::ZERO)
    }

    /// Await the next Turn notification, skipping typing indicators
    async fn next_turn(rx: &mut broadcast::Receiver<Notification>) -> Value {
        loop {
            match rx.recv().await.expect("broadcast closed") {
                Notification::Turn { turn } => return turn,
                Notification::Typing => continue,
                other => panic!("unexpected notification: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn submit_appends_a_user_bot_pair() {
        let manager = manager();
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();

        manager
            .send_event(
                &handle.context.session_id,
                Event::Submit {
                    text: "hello".to_string(),
                },
            )
            .await
            .unwrap();

        let user_turn = next_turn(&mut rx).await;
        assert_eq!(user_turn["speaker"], "user");
        assert_eq!(user_turn["text"], "hello");

        let bot_turn = next_turn(&mut rx).await;
        assert_eq!(bot_turn["speaker"], "bot");
        assert_eq!(bot_turn["text"], intent::GREETING_REPLY);

        assert_eq!(handle.transcript.len().await, 3);
    }

    #[tokio::test]
    async fn end_to_end_transcript_shape() {
        let manager = manager();
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();
        let id = handle.context.session_id.clone();

        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "hello".to_string(),
                },
            )
            .await
            .unwrap();
        next_turn(&mut rx).await;
        next_turn(&mut rx).await;

        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "courses".to_string(),
                },
            )
            .await
            .unwrap();
        next_turn(&mut rx).await;
        next_turn(&mut rx).await;

        let transcript = handle.transcript.snapshot().await;
        assert_eq!(transcript.len(), 5);
        let turns = transcript.turns();
        assert_eq!(turns[0].speaker, Speaker::Bot);
        assert_eq!(turns[1], Turn::user("hello"));
        assert_eq!(turns[2], Turn::bot(intent::GREETING_REPLY));
        assert_eq!(turns[3], Turn::user("courses"));
        assert_eq!(turns[4], Turn::bot(intent::COURSES_REPLY));
    }

    #[tokio::test]
    async fn quick_action_processes_like_typed_phrase() {
        let manager = manager();
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();

        manager
            .send_event(
                &handle.context.session_id,
                Event::SelectQuickAction {
                    action: QuickAction::Assessment,
                },
            )
            .await
            .unwrap();

        let user_turn = next_turn(&mut rx).await;
        assert_eq!(user_turn["text"], "assessment");

        let bot_turn = next_turn(&mut rx).await;
        let text = bot_turn["text"].as_str().unwrap();
        assert!(text.contains("https://learn.example.com/docs/assessment-requirements"));

        assert_eq!(handle.transcript.len().await, 3);
    }

    #[tokio::test]
    async fn empty_submit_appends_nothing() {
        let manager = manager();
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();
        let id = handle.context.session_id.clone();

        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "   ".to_string(),
                },
            )
            .await
            .unwrap();

        // The runtime handles events in order, so once the next submit's
        // notifications arrive the empty one has long been processed.
        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "hi".to_string(),
                },
            )
            .await
            .unwrap();
        next_turn(&mut rx).await;
        next_turn(&mut rx).await;

        assert_eq!(handle.transcript.len().await, 3);
    }

    #[tokio::test]
    async fn reset_reseeds_the_transcript() {
        let manager = manager();
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();
        let id = handle.context.session_id.clone();

        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "hello".to_string(),
                },
            )
            .await
            .unwrap();
        next_turn(&mut rx).await;
        next_turn(&mut rx).await;

        manager.send_event(&id, Event::Reset).await.unwrap();
        loop {
            if let Notification::Reset { transcript } = rx.recv().await.unwrap() {
                assert_eq!(transcript.as_array().unwrap().len(), 1);
                break;
            }
        }

        assert_eq!(handle.transcript.len().await, 1);
    }

    struct FailingResponder;

    impl Responder for FailingResponder {
        fn respond(&self, _raw: Option<&str>) -> Result<Cow<'static, str>, ResponderError> {
            Err(ResponderError::internal("synthetic failure"))
        }
    }

    #[tokio::test]
    async fn responder_failure_degrades_to_diagnostic_turn() {
        let manager = SessionManager::new(Arc::new(FailingResponder), Duration::ZERO);
        let handle = manager.create_session().await;
        let mut rx = handle.broadcast_tx.subscribe();
        let id = handle.context.session_id.clone();

        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "hello".to_string(),
                },
            )
            .await
            .unwrap();

        next_turn(&mut rx).await;
        let bot_turn = next_turn(&mut rx).await;
        let text = bot_turn["text"].as_str().unwrap();
        assert!(text.contains("synthetic failure"));

        // Still a well-formed pair, and the session accepts further input
        assert_eq!(handle.transcript.len().await, 3);
        manager
            .send_event(
                &id,
                Event::Submit {
                    text: "again".to_string(),
                },
            )
            .await
            .unwrap();
        next_turn(&mut rx).await;
        next_turn(&mut rx).await;
        assert_eq!(handle.transcript.len().await, 5);
    }

    #[tokio::test]
    async fn ended_sessions_are_gone() {
        let manager = manager();
        let handle = manager.create_session().await;
        let id = handle.context.session_id.clone();

        assert_eq!(manager.session_count().await, 1);
        manager.end_session(&id).await.unwrap();
        assert_eq!(manager.session_count().await, 0);

        let result = manager
            .send_event(
                &id,
                Event::Submit {
                    text: "hello".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }
}
