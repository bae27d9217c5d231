//! Course and forum roles, and the Studio permission bits derived from them

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission bits granted to a user for a course
pub type Permissions = u8;

pub const STUDIO_EDIT_ROLES: Permissions = 8;
pub const STUDIO_VIEW_USERS: Permissions = 4;
pub const STUDIO_EDIT_CONTENT: Permissions = 2;
pub const STUDIO_VIEW_CONTENT: Permissions = 1;

pub const ALL_PERMISSIONS: Permissions =
    STUDIO_EDIT_ROLES | STUDIO_VIEW_USERS | STUDIO_EDIT_CONTENT | STUDIO_VIEW_CONTENT;

/// Course-level access roles
///
/// The string form doubles as the `level` query parameter of the course team API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    Beta,
    Instructor,
    Staff,
    LimitedStaff,
}

impl CourseRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseRole::Beta => "beta",
            CourseRole::Instructor => "instructor",
            CourseRole::Staff => "staff",
            CourseRole::LimitedStaff => "limited_staff",
        }
    }
}

impl FromStr for CourseRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "beta" => Ok(CourseRole::Beta),
            "instructor" => Ok(CourseRole::Instructor),
            "staff" => Ok(CourseRole::Staff),
            "limited_staff" => Ok(CourseRole::LimitedStaff),
            other => Err(Error::InvalidInput(format!("unrecognized level '{}'", other))),
        }
    }
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discussion forum roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForumRole {
    Administrator,
    Moderator,
    #[serde(rename = "Group Moderator")]
    GroupModerator,
    #[serde(rename = "Community TA")]
    CommunityTa,
    Student,
}

impl ForumRole {
    /// Roles with discussion privileges (posting while the forum is closed)
    pub const PRIVILEGED: [ForumRole; 4] = [
        ForumRole::Administrator,
        ForumRole::Moderator,
        ForumRole::GroupModerator,
        ForumRole::CommunityTa,
    ];

    /// Roles notified of new posts in every cohort of a divided topic
    pub const COHORT_AUDIENCE: [ForumRole; 3] = [
        ForumRole::Administrator,
        ForumRole::Moderator,
        ForumRole::CommunityTa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForumRole::Administrator => "Administrator",
            ForumRole::Moderator => "Moderator",
            ForumRole::GroupModerator => "Group Moderator",
            ForumRole::CommunityTa => "Community TA",
            ForumRole::Student => "Student",
        }
    }
}

impl FromStr for ForumRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Administrator" => Ok(ForumRole::Administrator),
            "Moderator" => Ok(ForumRole::Moderator),
            "Group Moderator" => Ok(ForumRole::GroupModerator),
            "Community TA" => Ok(ForumRole::CommunityTa),
            "Student" => Ok(ForumRole::Student),
            other => Err(Error::InvalidInput(format!("unrecognized forum role '{}'", other))),
        }
    }
}

/// Grant or revoke action of the course team API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAction {
    Allow,
    Revoke,
}

impl FromStr for RoleAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allow" => Ok(RoleAction::Allow),
            "revoke" => Ok(RoleAction::Revoke),
            other => Err(Error::InvalidInput(format!("unrecognized action '{}'", other))),
        }
    }
}

/// Compute Studio permissions from the roles a user holds in one course
///
/// Global staff and instructors get everything. Limited staff may look but not
/// edit. Staff may edit content but not roles.
pub fn get_user_permissions(is_global_staff: bool, course_roles: &[CourseRole]) -> Permissions {
    if is_global_staff || course_roles.contains(&CourseRole::Instructor) {
        return ALL_PERMISSIONS;
    }
    if course_roles.contains(&CourseRole::LimitedStaff) {
        return STUDIO_VIEW_USERS | STUDIO_VIEW_CONTENT;
    }
    if course_roles.contains(&CourseRole::Staff) {
        return STUDIO_VIEW_USERS | STUDIO_EDIT_CONTENT | STUDIO_VIEW_CONTENT;
    }
    0
}
