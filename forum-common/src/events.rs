//! Event types for the forum event system
//!
//! Provides the notification payload handed to the platform's notification
//! service, plus the EventBus every producer publishes through.

use crate::course_key::{CourseKey, UserId};
use crate::roles::{CourseRole, RoleAction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::debug;

/// Application that owns discussion notifications
pub const DISCUSSION_APP_NAME: &str = "discussion";

/// Kinds of user notification raised by discussion activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewResponse,
    NewComment,
    NewCommentOnResponse,
    NewDiscussionPost,
    NewQuestionPost,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewResponse => "new_response",
            NotificationType::NewComment => "new_comment",
            NotificationType::NewCommentOnResponse => "new_comment_on_response",
            NotificationType::NewDiscussionPost => "new_discussion_post",
            NotificationType::NewQuestionPost => "new_question_post",
        }
    }
}

/// Notification request for a set of users
///
/// Built once per dispatch and moved onto the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Recipients, ascending and unique
    pub user_ids: Vec<UserId>,
    pub notification_type: NotificationType,
    pub context: BTreeMap<String, String>,
    pub content_url: String,
    pub app_name: String,
    pub course_key: CourseKey,
}

/// Forum event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForumEvent {
    /// A user notification should be delivered
    NotificationRequested {
        notification: NotificationPayload,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A course team role was granted or revoked
    CourseTeamChanged {
        course_key: CourseKey,
        user_id: UserId,
        role: CourseRole,
        action: RoleAction,
        /// User who made the change
        changed_by: UserId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ForumEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            ForumEvent::NotificationRequested { .. } => "NotificationRequested",
            ForumEvent::CourseTeamChanged { .. } => "CourseTeamChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use forum_common::events::EventBus;
///
/// let event_bus = EventBus::new(100);
/// let rx = event_bus.subscribe();
/// assert_eq!(event_bus.subscriber_count(), 1);
/// # drop(rx);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ForumEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ForumEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ForumEvent,
    ) -> Result<usize, broadcast::error::SendError<ForumEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Delivery is fire-and-forget. A bus without listeners drops the event
    /// and logs it at debug level.
    pub fn emit_lossy(&self, event: ForumEvent) {
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            debug!("No subscribers for {} event, dropped", event.event_type());
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
