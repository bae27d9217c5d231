//! Server-Sent Events (SSE) utilities
//!
//! Streams [`ForumEvent`]s from the [`EventBus`] to connected clients.

use crate::events::{EventBus, ForumEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Interval between keep-alive comments
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Encode one bus event as an SSE frame named after its type
pub fn event_to_sse(event: &ForumEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}

/// Create an SSE stream of every event published on `bus`
///
/// The first frame is a `ConnectionStatus: connected` marker. Lagging clients
/// skip the events they missed; the stream ends when the bus closes.
pub fn create_event_sse_stream(
    bus: &EventBus,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    debug!("SSE: Sending {}", event.event_type());
                    if let Some(frame) = event_to_sse(&event) {
                        yield Ok(frame);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SSE: {} event bus closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
