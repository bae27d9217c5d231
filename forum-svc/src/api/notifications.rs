//! Discussion activity notification endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use forum_common::discussion::notifications::{
    ActivityKind, NotificationContext, ResponseInfo, ThreadInfo, UserRef,
};
use forum_common::events::NotificationType;
use forum_common::providers::UserDirectory;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::parse_course;
use super::requester::Requester;
use crate::AppState;

/// New thread, response or comment written by the requesting user
///
/// A created thread must be authored by the requester.
#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub activity: ActivityKind,
    pub thread: ThreadInfo,
    /// Set when the new content is a comment under a response
    #[serde(default)]
    pub parent_response: Option<ResponseInfo>,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub dispatched: Vec<NotificationType>,
}

/// POST /api/discussion/v1/courses/:course_id/notifications
pub async fn post_activity(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(course_id): Path<String>,
    Json(request): Json<ActivityRequest>,
) -> ApiResult<Json<DispatchResponse>> {
    let key = parse_course(&course_id)?;
    let course = state
        .store
        .course(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {}", key)))?;

    if request.activity == ActivityKind::ThreadCreated && request.thread.author.id != user.id {
        return Err(ApiError::BadRequest(format!(
            "thread {} is authored by user {}, not the requester",
            request.thread.id, request.thread.author.id
        )));
    }

    let ctx = NotificationContext {
        course,
        thread: request.thread,
        creator: UserRef {
            id: user.id,
            username: user.username,
        },
        parent_response: request.parent_response,
    };

    let dispatched = state.sender.dispatch(request.activity, &ctx).await?;
    Ok(Json(DispatchResponse { dispatched }))
}
