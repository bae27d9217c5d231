//! Learner listing endpoints
//!
//! - `GET  /api/discussion/v1/courses/:course_id/usernames`
//! - `POST /api/discussion/v1/courses/:course_id/learner_stats`

use axum::{
    extract::{Path, Query, State},
    Json,
};
use forum_common::discussion::stats::{
    add_name_for_users_stats, add_stats_for_users_with_no_discussion_content,
    add_stats_for_users_with_null_values, FillMode, UserStats,
};
use forum_common::discussion::usernames::{
    get_usernames_for_course, get_usernames_from_search_string, UsernamePage,
};
use forum_common::providers::UserDirectory;
use forum_common::CourseKey;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::parse_course;
use super::requester::Requester;
use crate::pagination::PageParams;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Stats reported by the comment service for one roster page
#[derive(Debug, Deserialize)]
pub struct LearnerStatsRequest {
    #[serde(default)]
    pub stats: Vec<UserStats>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub mode: FillMode,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LearnerStatsResponse {
    pub results: Vec<UserStats>,
    pub count: usize,
    pub pages: usize,
}

async fn roster_page(
    directory: &dyn UserDirectory,
    course: &CourseKey,
    search: Option<&str>,
    paging: PageParams,
) -> forum_common::Result<UsernamePage> {
    let (page, page_size) = paging.resolve();
    match search.filter(|s| !s.is_empty()) {
        Some(search) => {
            get_usernames_from_search_string(directory, course, search, page, page_size).await
        }
        None => get_usernames_for_course(directory, course, page, page_size).await,
    }
}

pub async fn get_usernames(
    State(state): State<AppState>,
    Requester(_user): Requester,
    Path(course_id): Path<String>,
    Query(query): Query<UsernameQuery>,
) -> ApiResult<Json<UsernamePage>> {
    let course = parse_course(&course_id)?;
    let page = roster_page(
        &*state.store,
        &course,
        query.search.as_deref(),
        PageParams::new(query.page, query.page_size),
    )
    .await?;
    Ok(Json(page))
}

/// Merge reported stats with the roster page, then attach profile names
pub async fn post_learner_stats(
    State(state): State<AppState>,
    Requester(_user): Requester,
    Path(course_id): Path<String>,
    Json(request): Json<LearnerStatsRequest>,
) -> ApiResult<Json<LearnerStatsResponse>> {
    let course = parse_course(&course_id)?;
    let directory: &dyn UserDirectory = &*state.store;

    let roster = roster_page(
        directory,
        &course,
        request.search.as_deref(),
        PageParams::new(request.page, request.page_size),
    )
    .await?;
    let merged = match request.mode {
        FillMode::Zero => {
            add_stats_for_users_with_no_discussion_content(request.stats, &roster.usernames)
        }
        FillMode::Null => {
            add_stats_for_users_with_null_values(directory, request.stats, &roster.usernames)
                .await?
        }
    };
    let results = add_name_for_users_stats(directory, merged).await?;

    Ok(Json(LearnerStatsResponse {
        results,
        count: roster.count,
        pages: roster.pages,
    }))
}
