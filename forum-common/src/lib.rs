//! # Forum Common Library
//!
//! Shared code for the forum service:
//! - Course keys, roles and Studio permissions
//! - Collaborator traits for rosters, teams, settings and course structure
//! - Discussion topic tree, notification audience and dispatcher
//! - Course team management
//! - Event types and the broadcast EventBus
//! - Configuration loading

pub mod config;
pub mod course_key;
pub mod course_team;
pub mod db;
pub mod discussion;
pub mod error;
pub mod events;
pub mod providers;
pub mod roles;
pub mod sse;

pub use course_key::{CourseKey, UserId};
pub use error::{Error, Result};
pub use events::{EventBus, ForumEvent};
