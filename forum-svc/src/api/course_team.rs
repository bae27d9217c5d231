//! Course team endpoints
//!
//! - `GET  /api/contentstore/v1/course_team/:course_id`
//! - `POST /api/contentstore/v1/course_team/:course_id?level=&action=&email=`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use forum_common::course_team::{self, CourseTeamContext, RoleUpdate};

use super::error::ApiResult;
use super::parse_course;
use super::requester::Requester;
use crate::AppState;

pub async fn get_course_team(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(course_id): Path<String>,
) -> ApiResult<Json<CourseTeamContext>> {
    let course = parse_course(&course_id)?;
    let ctx = course_team::get_course_team(&*state.store, &*state.store, &user, &course).await?;
    Ok(Json(ctx))
}

pub async fn update_course_team(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(course_id): Path<String>,
    Query(update): Query<RoleUpdate>,
) -> ApiResult<StatusCode> {
    let course = parse_course(&course_id)?;
    course_team::update_course_team_role(&*state.store, &state.bus, &user, &course, &update)
        .await?;
    Ok(StatusCode::OK)
}
