//! Course team listing and role management

use crate::course_key::{CourseKey, UserId};
use crate::db::models::User;
use crate::events::{EventBus, ForumEvent};
use crate::providers::{CourseRoster, UserDirectory};
use crate::roles::{
    get_user_permissions, CourseRole, Permissions, RoleAction, STUDIO_EDIT_ROLES,
    STUDIO_VIEW_USERS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// One editor of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTeamMember {
    pub email: String,
    /// User id, rendered as a string
    pub id: String,
    pub role: CourseRole,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTeamContext {
    /// Requester is the only instructor and should hand over ownership
    /// before leaving
    pub show_transfer_ownership_hint: bool,
    pub users: Vec<CourseTeamMember>,
    /// Requester may change roles
    pub allow_actions: bool,
}

/// Raw `level`/`action`/`email` query values of a role change request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    pub level: Option<String>,
    pub action: Option<String>,
    pub email: Option<String>,
}

/// A role change that was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub user_id: UserId,
    pub role: CourseRole,
    pub action: RoleAction,
}

/// Studio permissions of `user` in `course`
pub async fn user_permissions(
    directory: &dyn UserDirectory,
    user: &User,
    course: &CourseKey,
) -> Result<Permissions> {
    let roles = directory.course_roles_for_user(course, user.id).await?;
    Ok(get_user_permissions(user.is_staff, &roles))
}

async fn ensure_course_exists(directory: &dyn UserDirectory, course: &CourseKey) -> Result<()> {
    match directory.course(course).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(format!("course {}", course))),
    }
}

/// Instructors, then staff who are not also instructors
pub async fn get_course_team(
    directory: &dyn UserDirectory,
    roster: &dyn CourseRoster,
    requester: &User,
    course: &CourseKey,
) -> Result<CourseTeamContext> {
    ensure_course_exists(directory, course).await?;

    let perms = user_permissions(directory, requester, course).await?;
    if perms & STUDIO_VIEW_USERS == 0 {
        return Err(Error::PermissionDenied(format!(
            "user {} cannot view the team of {}",
            requester.username, course
        )));
    }

    let instructors = roster
        .users_with_course_role(course, CourseRole::Instructor)
        .await?;
    let staff: BTreeSet<UserId> = roster
        .users_with_course_role(course, CourseRole::Staff)
        .await?
        .difference(&instructors)
        .copied()
        .collect();

    let mut users = members_with_role(directory, &instructors, CourseRole::Instructor).await?;
    users.extend(members_with_role(directory, &staff, CourseRole::Staff).await?);

    let sole_instructor = instructors.len() == 1 && instructors.contains(&requester.id);

    Ok(CourseTeamContext {
        show_transfer_ownership_hint: sole_instructor,
        users,
        allow_actions: perms & STUDIO_EDIT_ROLES != 0,
    })
}

async fn members_with_role(
    directory: &dyn UserDirectory,
    ids: &BTreeSet<UserId>,
    role: CourseRole,
) -> Result<Vec<CourseTeamMember>> {
    let mut accounts = directory.users_by_ids(ids).await?;
    accounts.sort_by_key(|u| u.id);
    Ok(accounts
        .into_iter()
        .map(|u| CourseTeamMember {
            email: u.email,
            id: u.id.to_string(),
            role,
            username: u.username,
        })
        .collect())
}

/// Grant or revoke a course role
///
/// Only global staff with `STUDIO_VIEW_USERS` on the course may change roles.
/// The applied change is published as [`ForumEvent::CourseTeamChanged`].
pub async fn update_course_team_role(
    directory: &dyn UserDirectory,
    bus: &EventBus,
    requester: &User,
    course: &CourseKey,
    update: &RoleUpdate,
) -> Result<RoleChange> {
    ensure_course_exists(directory, course).await?;

    let perms = user_permissions(directory, requester, course).await?;
    if !requester.is_staff || perms & STUDIO_VIEW_USERS == 0 {
        return Err(Error::PermissionDenied(format!(
            "user {} cannot change the team of {}",
            requester.username, course
        )));
    }

    let role: CourseRole = update.level.as_deref().unwrap_or_default().parse()?;

    let email = update.email.as_deref().unwrap_or_default();
    let user = directory
        .user_by_email(email)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user with email '{}'", email)))?;

    let action: RoleAction = update.action.as_deref().unwrap_or_default().parse()?;
    match action {
        RoleAction::Allow => directory.add_course_role(course, user.id, role).await?,
        RoleAction::Revoke => directory.remove_course_role(course, user.id, role).await?,
    }

    info!(
        "{} {:?} {} on {} for {}",
        requester.username, action, role, course, user.username
    );

    bus.emit_lossy(ForumEvent::CourseTeamChanged {
        course_key: course.clone(),
        user_id: user.id,
        role,
        action,
        changed_by: requester.id,
        timestamp: chrono::Utc::now(),
    });

    Ok(RoleChange {
        user_id: user.id,
        role,
        action,
    })
}
