//! Collaborator interfaces
//!
//! The discussion core never talks to storage directly. Course structure,
//! rosters, teams and discussion settings come through these traits; the
//! service implements them over its SQLite snapshot and tests implement them
//! in memory.
//!
//! Lookups of absent things return empty values (`Ok(None)`, an empty set, an
//! empty block listing), never errors.

use crate::course_key::{CourseKey, UserId};
use crate::db::models::{Course, DiscussionSettings, Team, User};
use crate::discussion::topics::{CourseBlocks, Topic};
use crate::roles::{CourseRole, ForumRole};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Course membership lookups
#[async_trait]
pub trait CourseRoster: Send + Sync {
    /// Users with an active enrollment in the course
    async fn active_enrollments(&self, course: &CourseKey) -> Result<BTreeSet<UserId>>;

    /// Users holding a course-level role
    async fn users_with_course_role(
        &self,
        course: &CourseKey,
        role: CourseRole,
    ) -> Result<BTreeSet<UserId>>;

    /// Users holding any of the given forum roles
    async fn users_with_forum_roles(
        &self,
        course: &CourseKey,
        roles: &[ForumRole],
    ) -> Result<BTreeSet<UserId>>;

    /// Members of one cohort group
    async fn cohort_members(&self, course: &CourseKey, group_id: i64) -> Result<BTreeSet<UserId>>;
}

/// Topic → team association
#[async_trait]
pub trait TeamLookup: Send + Sync {
    async fn team_for_topic(&self, topic_id: &str) -> Result<Option<Team>>;
}

/// Per-course discussion division settings
#[async_trait]
pub trait DiscussionSettingsStore: Send + Sync {
    /// Settings for the course; courses never configured get the defaults
    async fn discussion_settings(&self, course: &CourseKey) -> Result<DiscussionSettings>;
}

/// Course structure and forum topic listing
#[async_trait]
pub trait CourseStructureProvider: Send + Sync {
    async fn course_blocks(&self, course: &CourseKey) -> Result<CourseBlocks>;

    async fn discussion_topics(&self, course: &CourseKey) -> Result<Vec<Topic>>;
}

/// User accounts, profiles and courses
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Accounts for the given ids; unknown ids are skipped
    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> Result<Vec<User>>;

    /// Full name from the user's profile
    async fn profile_name(&self, username: &str) -> Result<Option<String>>;

    async fn course(&self, course: &CourseKey) -> Result<Option<Course>>;

    /// Usernames of users enrolled in the course, optionally filtered by a
    /// case-insensitive substring. Order is unspecified.
    async fn enrolled_usernames(&self, course: &CourseKey, search: Option<&str>)
        -> Result<Vec<String>>;

    /// Course roles the user holds
    async fn course_roles_for_user(&self, course: &CourseKey, user: UserId)
        -> Result<Vec<CourseRole>>;

    /// Grant a course role; granting twice is a no-op
    async fn add_course_role(&self, course: &CourseKey, user: UserId, role: CourseRole)
        -> Result<()>;

    /// Revoke a course role; revoking an absent role is a no-op
    async fn remove_course_role(&self, course: &CourseKey, user: UserId, role: CourseRole)
        -> Result<()>;
}
