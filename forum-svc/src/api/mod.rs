//! HTTP API handlers for forum-svc

pub mod course_team;
pub mod error;
pub mod health;
pub mod learners;
pub mod notifications;
pub mod privileges;
pub mod requester;
pub mod sse;
pub mod topics;

pub use course_team::{get_course_team, update_course_team};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use learners::{get_usernames, post_learner_stats};
pub use notifications::post_activity;
pub use privileges::get_privileges;
pub use requester::Requester;
pub use sse::event_stream;
pub use topics::get_topics_v3;

use forum_common::CourseKey;

/// Parse a `course-v1:` path segment
pub(crate) fn parse_course(course_id: &str) -> ApiResult<CourseKey> {
    Ok(course_id.parse()?)
}
