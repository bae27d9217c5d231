//! Discussion access and staff listing helpers

use crate::course_key::{CourseKey, UserId};
use crate::db::models::Course;
use crate::providers::CourseRoster;
use crate::roles::{CourseRole, ForumRole};
use crate::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// True when the user holds a privileged forum role or a course staff or
/// instructor role
pub async fn has_discussion_privileges(
    roster: &dyn CourseRoster,
    course: &CourseKey,
    user: UserId,
) -> Result<bool> {
    if roster
        .users_with_forum_roles(course, &ForumRole::PRIVILEGED)
        .await?
        .contains(&user)
    {
        return Ok(true);
    }
    Ok(get_course_staff_users_list(roster, course)
        .await?
        .contains(&user))
}

/// Whether the user may post in the course forum
pub async fn discussion_open_for_user(
    roster: &dyn CourseRoster,
    course: &Course,
    user: UserId,
) -> Result<bool> {
    if course.forum_posts_allowed {
        return Ok(true);
    }
    has_discussion_privileges(roster, &course.key, user).await
}

/// Assign `value` to `attribute` on every thread object
pub fn set_attribute(threads: &mut [Map<String, Value>], attribute: &str, value: &Value) {
    for thread in threads.iter_mut() {
        thread.insert(attribute.to_string(), value.clone());
    }
}

/// Course staff and instructors, ascending and unique
pub async fn get_course_staff_users_list(
    roster: &dyn CourseRoster,
    course: &CourseKey,
) -> Result<Vec<UserId>> {
    let mut ids: BTreeSet<UserId> = roster
        .users_with_course_role(course, CourseRole::Staff)
        .await?;
    ids.extend(
        roster
            .users_with_course_role(course, CourseRole::Instructor)
            .await?,
    );
    Ok(ids.into_iter().collect())
}

/// Group moderators and community TAs
pub async fn get_course_ta_users_list(
    roster: &dyn CourseRoster,
    course: &CourseKey,
) -> Result<Vec<UserId>> {
    let ids = roster
        .users_with_forum_roles(course, &[ForumRole::GroupModerator, ForumRole::CommunityTa])
        .await?;
    Ok(ids.into_iter().collect())
}

/// Forum administrators and moderators
pub async fn get_moderator_users_list(
    roster: &dyn CourseRoster,
    course: &CourseKey,
) -> Result<Vec<UserId>> {
    let ids = roster
        .users_with_forum_roles(course, &[ForumRole::Administrator, ForumRole::Moderator])
        .await?;
    Ok(ids.into_iter().collect())
}
