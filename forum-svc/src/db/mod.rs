//! SQLite-backed collaborators
//!
//! [`SqliteStore`] reads the course snapshot tables created by
//! `forum_common::db::init_database` and implements every provider trait the
//! discussion core depends on.

use async_trait::async_trait;
use forum_common::db::models::{DiscussionSettings, Team};
use forum_common::providers::{CourseRoster, DiscussionSettingsStore, TeamLookup};
use forum_common::roles::{CourseRole, ForumRole};
use forum_common::{CourseKey, Result, UserId};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use tracing::warn;

mod structure;
mod users;

/// Provider implementations over one SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn id_set(ids: Vec<i64>) -> BTreeSet<UserId> {
    ids.into_iter().collect()
}

#[async_trait]
impl CourseRoster for SqliteStore {
    async fn active_enrollments(&self, course: &CourseKey) -> Result<BTreeSet<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM enrollments WHERE course_key = ? AND is_active = 1",
        )
        .bind(course.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(id_set(ids))
    }

    async fn users_with_course_role(
        &self,
        course: &CourseKey,
        role: CourseRole,
    ) -> Result<BTreeSet<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM course_roles WHERE course_key = ? AND role = ?",
        )
        .bind(course.to_string())
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(id_set(ids))
    }

    async fn users_with_forum_roles(
        &self,
        course: &CourseKey,
        roles: &[ForumRole],
    ) -> Result<BTreeSet<UserId>> {
        let mut users = BTreeSet::new();
        for role in roles {
            let ids: Vec<i64> = sqlx::query_scalar(
                "SELECT user_id FROM forum_roles WHERE course_key = ? AND role = ?",
            )
            .bind(course.to_string())
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;
            users.extend(ids);
        }
        Ok(users)
    }

    async fn cohort_members(&self, course: &CourseKey, group_id: i64) -> Result<BTreeSet<UserId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM cohort_memberships WHERE course_key = ? AND group_id = ?",
        )
        .bind(course.to_string())
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(id_set(ids))
    }
}

#[async_trait]
impl TeamLookup for SqliteStore {
    async fn team_for_topic(&self, topic_id: &str) -> Result<Option<Team>> {
        let team_id: Option<String> =
            sqlx::query_scalar("SELECT team_id FROM teams WHERE discussion_topic_id = ?")
                .bind(topic_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(team_id) = team_id else {
            return Ok(None);
        };

        let members: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM team_members WHERE team_id = ? ORDER BY joined_order, user_id",
        )
        .bind(&team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Team {
            team_id,
            topic_id: topic_id.to_string(),
            members,
        }))
    }
}

#[async_trait]
impl DiscussionSettingsStore for SqliteStore {
    async fn discussion_settings(&self, course: &CourseKey) -> Result<DiscussionSettings> {
        let row = sqlx::query(
            r#"
            SELECT cohorts_enabled, always_divide_inline_discussions, divided_discussions
            FROM discussion_settings
            WHERE course_key = ?
            "#,
        )
        .bind(course.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(DiscussionSettings::default());
        };

        let raw: String = row.get("divided_discussions");
        let divided_discussions = match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(
                    "Unreadable divided_discussions for {}: {}; treating as none",
                    course, e
                );
                Vec::new()
            }
        };

        Ok(DiscussionSettings {
            cohorts_enabled: row.get("cohorts_enabled"),
            always_divide_inline_discussions: row.get("always_divide_inline_discussions"),
            divided_discussions,
        })
    }
}
