//! Discussion topic tree endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use forum_common::discussion::topics::{build_topics_v3_structure, TopicNode};
use forum_common::providers::{CourseStructureProvider, UserDirectory};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::parse_course;
use super::requester::Requester;
use crate::AppState;

/// GET /api/discussion/v3/courses/:course_id/topics
pub async fn get_topics_v3(
    State(state): State<AppState>,
    Requester(_user): Requester,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Vec<TopicNode>>> {
    let course = parse_course(&course_id)?;
    if state.store.course(&course).await?.is_none() {
        return Err(ApiError::NotFound(format!("course {}", course)));
    }

    let blocks = state.store.course_blocks(&course).await?;
    let topics = state.store.discussion_topics(&course).await?;
    debug!(
        "Building topic tree for {} from {} blocks and {} topics",
        course,
        blocks.blocks.len(),
        topics.len()
    );

    Ok(Json(build_topics_v3_structure(&blocks, &topics)))
}
