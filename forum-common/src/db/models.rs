//! Database models

use crate::course_key::{CourseKey, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Platform-wide staff flag (GlobalStaff)
    pub is_staff: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub key: CourseKey,
    pub display_name: String,
    pub forum_posts_allowed: bool,
}

/// A team bound to a discussion topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub topic_id: String,
    /// Member user ids in membership order
    pub members: Vec<UserId>,
}

/// Per-course discussion division settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionSettings {
    /// Cohorts are the course's division scheme
    pub cohorts_enabled: bool,
    /// Every inline (courseware) topic is divided
    pub always_divide_inline_discussions: bool,
    /// Topic ids explicitly configured as divided
    pub divided_discussions: Vec<String>,
}

impl DiscussionSettings {
    pub fn is_topic_divided(&self, topic_id: &str) -> bool {
        self.always_divide_inline_discussions
            || self.divided_discussions.iter().any(|t| t == topic_id)
    }
}
