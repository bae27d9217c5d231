//! Database initialization
//!
//! Creates the snapshot tables the service reads course rosters, roles,
//! teams, discussion settings and course structure from. All statements are
//! idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table on an already-open pool
///
/// Split out so tests can run against `sqlite::memory:` pools.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_user_profiles_table(pool).await?;
    create_courses_table(pool).await?;
    create_enrollments_table(pool).await?;
    create_course_roles_table(pool).await?;
    create_forum_roles_table(pool).await?;
    create_cohort_memberships_table(pool).await?;
    create_teams_tables(pool).await?;
    create_discussion_settings_table(pool).await?;
    create_course_blocks_table(pool).await?;
    create_discussion_topics_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            is_staff INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_user_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            course_key TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            forum_posts_allowed INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_enrollments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            course_key TEXT NOT NULL REFERENCES courses(course_key) ON DELETE CASCADE,
            is_active INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (user_id, course_key)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_course_roles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course_roles (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            course_key TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('beta', 'instructor', 'staff', 'limited_staff')),
            PRIMARY KEY (user_id, course_key, role)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_forum_roles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forum_roles (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            course_key TEXT NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY (user_id, course_key, role)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_cohort_memberships_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cohort_memberships (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            course_key TEXT NOT NULL,
            group_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, course_key)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_teams_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            team_id TEXT PRIMARY KEY,
            course_key TEXT NOT NULL,
            discussion_topic_id TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_members (
            team_id TEXT NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            joined_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (team_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_discussion_settings_table(pool: &SqlitePool) -> Result<()> {
    // divided_discussions holds a JSON array of topic ids
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discussion_settings (
            course_key TEXT PRIMARY KEY,
            cohorts_enabled INTEGER NOT NULL DEFAULT 0,
            always_divide_inline_discussions INTEGER NOT NULL DEFAULT 0,
            divided_discussions TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_course_blocks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course_blocks (
            course_key TEXT NOT NULL,
            block_id TEXT NOT NULL,
            block_type TEXT NOT NULL,
            display_name TEXT,
            children TEXT NOT NULL DEFAULT '[]',
            discussions_id TEXT,
            is_root INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (course_key, block_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_discussion_topics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discussion_topics (
            course_key TEXT NOT NULL,
            topic_id TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            usage_key TEXT,
            discussion_count INTEGER NOT NULL DEFAULT 0,
            question_count INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (course_key, topic_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
