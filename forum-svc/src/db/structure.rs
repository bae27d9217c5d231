//! Course structure and topic snapshot queries

use super::SqliteStore;
use async_trait::async_trait;
use forum_common::discussion::topics::{Block, BlockType, CourseBlocks, ThreadCounts, Topic};
use forum_common::providers::CourseStructureProvider;
use forum_common::{CourseKey, Result};
use sqlx::Row;
use tracing::warn;

fn parse_block_type(raw: &str) -> BlockType {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).unwrap_or(BlockType::Other)
}

#[async_trait]
impl CourseStructureProvider for SqliteStore {
    async fn course_blocks(&self, course: &CourseKey) -> Result<CourseBlocks> {
        let rows = sqlx::query(
            r#"
            SELECT block_id, block_type, display_name, children, discussions_id, is_root
            FROM course_blocks
            WHERE course_key = ?
            "#,
        )
        .bind(course.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut root = None;
        let mut blocks = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("block_id");
            let block_type: String = row.get("block_type");
            let children: String = row.get("children");
            let children = serde_json::from_str::<Vec<String>>(&children).unwrap_or_else(|e| {
                warn!("Block {} has unreadable children ({}), treating as leaf", id, e);
                Vec::new()
            });
            if row.get::<bool, _>("is_root") {
                root = Some(id.clone());
            }
            blocks.push(Block {
                id,
                block_type: parse_block_type(&block_type),
                display_name: row.get("display_name"),
                children,
                discussions_id: row.get("discussions_id"),
            });
        }

        Ok(CourseBlocks::new(root, blocks))
    }

    async fn discussion_topics(&self, course: &CourseKey) -> Result<Vec<Topic>> {
        let rows = sqlx::query(
            r#"
            SELECT topic_id, name, usage_key, discussion_count, question_count
            FROM discussion_topics
            WHERE course_key = ?
            ORDER BY sort_order, topic_id
            "#,
        )
        .bind(course.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Topic {
                id: row.get("topic_id"),
                name: row.get("name"),
                usage_key: row.get("usage_key"),
                thread_counts: ThreadCounts {
                    discussion: row.get::<i64, _>("discussion_count").max(0) as u64,
                    question: row.get::<i64, _>("question_count").max(0) as u64,
                },
            })
            .collect())
    }
}
