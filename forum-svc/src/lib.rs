//! forum-svc library - course team and discussion service
//!
//! Serves the course team, topic tree, learner listing and notification
//! endpoints over a SQLite course snapshot.

use axum::Router;
use forum_common::config::ServiceConfig;
use forum_common::discussion::audience::AudienceResolver;
use forum_common::discussion::notifications::DiscussionNotificationSender;
use forum_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pagination;

use db::SqliteStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Provider implementations over the SQLite pool
    pub store: Arc<SqliteStore>,
    /// Notification and course team events
    pub bus: EventBus,
    pub sender: DiscussionNotificationSender,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: &ServiceConfig) -> Self {
        let store = Arc::new(SqliteStore::new(db));
        let bus = EventBus::new(config.event_bus_capacity);
        let audience = AudienceResolver::new(store.clone(), store.clone(), store.clone());
        let sender =
            DiscussionNotificationSender::new(config.notification_config(), bus.clone(), audience);

        Self { store, bus, sender }
    }
}

/// Build application router
///
/// Everything except `/health` and `/api/events` needs an `X-User-Id` header.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let course_team = Router::new().route(
        "/api/contentstore/v1/course_team/:course_id",
        get(api::get_course_team).post(api::update_course_team),
    );

    let discussion = Router::new()
        .route(
            "/api/discussion/v3/courses/:course_id/topics",
            get(api::get_topics_v3),
        )
        .route(
            "/api/discussion/v1/courses/:course_id/usernames",
            get(api::get_usernames),
        )
        .route(
            "/api/discussion/v1/courses/:course_id/learner_stats",
            post(api::post_learner_stats),
        )
        .route(
            "/api/discussion/v1/courses/:course_id/notifications",
            post(api::post_activity),
        )
        .route(
            "/api/discussion/v1/courses/:course_id/privileges",
            get(api::get_privileges),
        );

    let public = Router::new()
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes());

    Router::new()
        .merge(course_team)
        .merge(discussion)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
