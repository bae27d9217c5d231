//! Discussion privilege summary endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use forum_common::discussion::utils::{
    discussion_open_for_user, get_course_staff_users_list, get_course_ta_users_list,
    get_moderator_users_list,
};
use forum_common::providers::UserDirectory;
use forum_common::UserId;
use serde::Serialize;

use super::error::{ApiError, ApiResult};
use super::parse_course;
use super::requester::Requester;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PrivilegesResponse {
    /// Requester may post
    pub discussion_open: bool,
    pub course_staff: Vec<UserId>,
    pub moderators: Vec<UserId>,
    pub community_tas: Vec<UserId>,
}

/// GET /api/discussion/v1/courses/:course_id/privileges
pub async fn get_privileges(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(course_id): Path<String>,
) -> ApiResult<Json<PrivilegesResponse>> {
    let key = parse_course(&course_id)?;
    let course = state
        .store
        .course(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("course {}", key)))?;
    let roster = &*state.store;

    Ok(Json(PrivilegesResponse {
        discussion_open: discussion_open_for_user(roster, &course, user.id).await?,
        course_staff: get_course_staff_users_list(roster, &key).await?,
        moderators: get_moderator_users_list(roster, &key).await?,
        community_tas: get_course_ta_users_list(roster, &key).await?,
    }))
}
