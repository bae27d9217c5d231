//! Discussion notification dispatcher
//!
//! Decides who hears about a new thread, response or comment and publishes a
//! [`NotificationPayload`] on the [`EventBus`]. Delivery is fire-and-forget.
//!
//! | Activity            | Recipient             | Type                      |
//! |---------------------|-----------------------|---------------------------|
//! | top-level response  | thread author         | `new_response`            |
//! | comment             | thread author         | `new_comment`             |
//! | comment             | response author       | `new_comment_on_response` |
//! | new thread          | resolved audience     | `new_{discussion,question}_post` |

use super::audience::{AudienceQuery, AudienceResolver, AudienceSet};
use crate::config::NotificationConfig;
use crate::course_key::UserId;
use crate::db::models::Course;
use crate::events::{
    EventBus, ForumEvent, NotificationPayload, NotificationType, DISCUSSION_APP_NAME,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info};

/// Thread types that raise new-post notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadType {
    Discussion,
    Question,
}

impl FromStr for ThreadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "discussion" => Ok(ThreadType::Discussion),
            "question" => Ok(ThreadType::Question),
            other => Err(Error::UnknownThreadType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
}

/// Thread as reported by the comment service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub id: String,
    pub title: String,
    pub author: UserRef,
    /// Discussion topic (commentable) id
    pub topic_id: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Raw thread type; validated only when a new-post notification is sent
    pub thread_type: String,
}

/// Response a comment was posted under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub id: String,
    pub author: UserRef,
}

/// Kind of discussion activity being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ThreadCreated,
    /// A response (no parent) or a comment (with parent response)
    ReplyCreated,
}

/// Everything the dispatcher needs about one piece of activity
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub course: Course,
    pub thread: ThreadInfo,
    /// Author of the new thread, response or comment
    pub creator: UserRef,
    pub parent_response: Option<ResponseInfo>,
}

impl NotificationContext {
    fn response_and_thread_have_same_creator(&self) -> bool {
        self.parent_response
            .as_ref()
            .is_some_and(|r| r.author.id == self.thread.author.id)
    }

    fn response_and_comment_have_same_creator(&self) -> bool {
        self.parent_response
            .as_ref()
            .is_some_and(|r| r.author.id == self.creator.id)
    }
}

/// Builds discussion notifications and publishes them on the event bus
#[derive(Clone)]
pub struct DiscussionNotificationSender {
    config: NotificationConfig,
    bus: EventBus,
    audience: AudienceResolver,
}

impl DiscussionNotificationSender {
    pub fn new(config: NotificationConfig, bus: EventBus, audience: AudienceResolver) -> Self {
        Self {
            config,
            bus,
            audience,
        }
    }

    /// Run every rule that applies to the activity
    ///
    /// Returns the notification types actually dispatched.
    pub async fn dispatch(
        &self,
        kind: ActivityKind,
        ctx: &NotificationContext,
    ) -> Result<Vec<NotificationType>> {
        let sent = match kind {
            ActivityKind::ThreadCreated => {
                vec![self.send_new_thread_created_notification(ctx).await?]
            }
            ActivityKind::ReplyCreated => vec![
                self.send_new_response_notification(ctx),
                self.send_new_comment_notification(ctx),
                self.send_new_comment_on_response_notification(ctx),
            ],
        };
        Ok(sent.into_iter().flatten().collect())
    }

    /// Notify the thread author of a top-level response by someone else
    pub fn send_new_response_notification(
        &self,
        ctx: &NotificationContext,
    ) -> Option<NotificationType> {
        if ctx.parent_response.is_some() || ctx.creator.id == ctx.thread.author.id {
            return None;
        }
        self.send_notification(
            ctx,
            AudienceSet::excluding([ctx.thread.author.id], ctx.creator.id),
            NotificationType::NewResponse,
            BTreeMap::new(),
        )
    }

    /// Notify the thread author of a comment on one of the thread's responses
    pub fn send_new_comment_notification(
        &self,
        ctx: &NotificationContext,
    ) -> Option<NotificationType> {
        let response = ctx.parent_response.as_ref()?;
        if ctx.creator.id == ctx.thread.author.id {
            return None;
        }

        let author_name = if ctx.response_and_thread_have_same_creator() {
            self.config.your_label.clone()
        } else if ctx.response_and_comment_have_same_creator() {
            self.config.their_label.clone()
        } else {
            format!("{}'s", response.author.username)
        };

        self.send_notification(
            ctx,
            AudienceSet::excluding([ctx.thread.author.id], ctx.creator.id),
            NotificationType::NewComment,
            BTreeMap::from([("author_name".to_string(), author_name)]),
        )
    }

    /// Notify the response author of a comment, unless the thread author
    /// already got `new_comment` for it
    pub fn send_new_comment_on_response_notification(
        &self,
        ctx: &NotificationContext,
    ) -> Option<NotificationType> {
        let response = ctx.parent_response.as_ref()?;
        if ctx.creator.id == response.author.id || ctx.response_and_thread_have_same_creator() {
            return None;
        }
        self.send_notification(
            ctx,
            AudienceSet::excluding([response.author.id], ctx.creator.id),
            NotificationType::NewCommentOnResponse,
            BTreeMap::new(),
        )
    }

    /// Notify the course (or team/cohort) of a new thread
    ///
    /// Fails with `UnknownThreadType` for anything but discussions and questions.
    pub async fn send_new_thread_created_notification(
        &self,
        ctx: &NotificationContext,
    ) -> Result<Option<NotificationType>> {
        let notification_type = match ctx.thread.thread_type.parse::<ThreadType>()? {
            ThreadType::Discussion => NotificationType::NewDiscussionPost,
            ThreadType::Question => NotificationType::NewQuestionPost,
        };

        let audience = self
            .audience
            .resolve(AudienceQuery {
                course: &ctx.course.key,
                topic_id: &ctx.thread.topic_id,
                group_id: ctx.thread.group_id,
                creator: ctx.creator.id,
            })
            .await?;
        debug!(
            "Thread {} audience resolved from {:?}",
            ctx.thread.id, audience.source
        );

        Ok(self.send_notification(
            ctx,
            audience.users,
            notification_type,
            BTreeMap::from([("username".to_string(), ctx.creator.username.clone())]),
        ))
    }

    fn send_notification(
        &self,
        ctx: &NotificationContext,
        recipients: AudienceSet,
        notification_type: NotificationType,
        extra_context: BTreeMap<String, String>,
    ) -> Option<NotificationType> {
        if recipients.is_empty() {
            debug!(
                "No recipients for {} on thread {}, skipping",
                notification_type.as_str(),
                ctx.thread.id
            );
            return None;
        }

        let mut context = BTreeMap::from([
            ("replier_name".to_string(), ctx.creator.username.clone()),
            ("post_title".to_string(), ctx.thread.title.clone()),
            ("course_name".to_string(), ctx.course.display_name.clone()),
        ]);
        context.extend(extra_context);

        let payload = NotificationPayload {
            user_ids: recipients.into_vec(),
            notification_type,
            context,
            content_url: format!(
                "{}/{}/posts/{}",
                self.config.discussions_mfe_url, ctx.course.key, ctx.thread.id
            ),
            app_name: DISCUSSION_APP_NAME.to_string(),
            course_key: ctx.course.key.clone(),
        };

        info!(
            "Dispatching {} for thread {} to {} users",
            notification_type.as_str(),
            ctx.thread.id,
            payload.user_ids.len()
        );
        self.bus.emit_lossy(ForumEvent::NotificationRequested {
            notification: payload,
            timestamp: chrono::Utc::now(),
        });
        Some(notification_type)
    }
}
