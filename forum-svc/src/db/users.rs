//! Accounts, profiles, courses and course role writes

use super::SqliteStore;
use async_trait::async_trait;
use forum_common::db::models::{Course, User};
use forum_common::providers::UserDirectory;
use forum_common::roles::CourseRole;
use forum_common::{CourseKey, Result, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::warn;

const USER_COLUMNS: &str = "id, username, email, is_staff, is_active";

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        is_staff: row.get("is_staff"),
        is_active: row.get("is_active"),
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM users WHERE id IN ({}) ORDER BY id",
            USER_COLUMNS, placeholders
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn profile_name(&self, username: &str) -> Result<Option<String>> {
        let name = sqlx::query_scalar(
            r#"
            SELECT p.name
            FROM user_profiles p
            JOIN users u ON u.id = p.user_id
            WHERE u.username = ? OR u.email = ?
            "#,
        )
        .bind(username)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(name)
    }

    async fn course(&self, course: &CourseKey) -> Result<Option<Course>> {
        let row = sqlx::query(
            "SELECT display_name, forum_posts_allowed FROM courses WHERE course_key = ?",
        )
        .bind(course.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Course {
            key: course.clone(),
            display_name: row.get("display_name"),
            forum_posts_allowed: row.get("forum_posts_allowed"),
        }))
    }

    async fn enrolled_usernames(
        &self,
        course: &CourseKey,
        search: Option<&str>,
    ) -> Result<Vec<String>> {
        // instr() so '%' and '_' in the search match literally
        let usernames = sqlx::query_scalar(
            r#"
            SELECT u.username
            FROM users u
            JOIN enrollments e ON e.user_id = u.id
            WHERE e.course_key = ?
              AND (? IS NULL OR instr(lower(u.username), lower(?)) > 0)
            "#,
        )
        .bind(course.to_string())
        .bind(search)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;
        Ok(usernames)
    }

    async fn course_roles_for_user(
        &self,
        course: &CourseKey,
        user: UserId,
    ) -> Result<Vec<CourseRole>> {
        let raw: Vec<String> = sqlx::query_scalar(
            "SELECT role FROM course_roles WHERE course_key = ? AND user_id = ?",
        )
        .bind(course.to_string())
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(raw
            .iter()
            .filter_map(|r| match CourseRole::from_str(r) {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!("Skipping stored course role for user {}: {}", user, e);
                    None
                }
            })
            .collect())
    }

    async fn add_course_role(
        &self,
        course: &CourseKey,
        user: UserId,
        role: CourseRole,
    ) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO course_roles (user_id, course_key, role) VALUES (?, ?, ?)")
            .bind(user)
            .bind(course.to_string())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_course_role(
        &self,
        course: &CourseKey,
        user: UserId,
        role: CourseRole,
    ) -> Result<()> {
        sqlx::query("DELETE FROM course_roles WHERE user_id = ? AND course_key = ? AND role = ?")
            .bind(user)
            .bind(course.to_string())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
