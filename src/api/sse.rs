//! Server-Sent Events support

use crate::runtime::Notification;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast notifications to an SSE stream
pub fn sse_stream(
    init_event: Notification,
    broadcast_rx: tokio::sync::broadcast::Receiver<Notification>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Start with the init snapshot, then follow the broadcasts
    let init = futures::stream::once(async move { Ok(notification_to_sse(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(notification) => Some(Ok(notification_to_sse(notification))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn notification_to_sse(notification: Notification) -> Event {
    let (event_type, data) = match notification {
        Notification::Init {
            session,
            transcript,
            typing,
        } => (
            "init",
            json!({
                "type": "init",
                "session": session,
                "transcript": transcript,
                "typing": typing
            }),
        ),
        Notification::Turn { turn } => (
            "turn",
            json!({
                "type": "turn",
                "turn": turn
            }),
        ),
        Notification::Typing => (
            "typing",
            json!({
                "type": "typing"
            }),
        ),
        Notification::Reset { transcript } => (
            "reset",
            json!({
                "type": "reset",
                "transcript": transcript
            }),
        ),
        Notification::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
