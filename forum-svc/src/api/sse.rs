//! Server-Sent Events stream of forum bus events

use crate::AppState;
use axum::{extract::State, response::IntoResponse};

/// GET /api/events
///
/// Streams `NotificationRequested` and `CourseTeamChanged` events as they are
/// published, with periodic heartbeats.
pub async fn event_stream(State(state): State<AppState>) -> impl IntoResponse {
    forum_common::sse::create_event_sse_stream(&state.bus, "forum-svc")
}
