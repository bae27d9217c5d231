//! In-memory collaborator implementations for unit tests

use crate::course_key::{CourseKey, UserId};
use crate::db::models::{Course, DiscussionSettings, Team, User};
use crate::discussion::topics::{CourseBlocks, Topic};
use crate::providers::{
    CourseRoster, CourseStructureProvider, DiscussionSettingsStore, TeamLookup, UserDirectory,
};
use crate::roles::{CourseRole, ForumRole};
use crate::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// Single-course directory; every lookup ignores the course key
#[derive(Default)]
pub struct MemoryDirectory {
    pub enrolled: BTreeSet<UserId>,
    pub cohorts: HashMap<i64, BTreeSet<UserId>>,
    pub forum_roles: HashMap<ForumRole, BTreeSet<UserId>>,
    pub course_roles: Mutex<HashMap<CourseRole, BTreeSet<UserId>>>,
    pub teams: Vec<Team>,
    pub settings: DiscussionSettings,
    pub users: Vec<User>,
    pub profiles: HashMap<String, String>,
    pub courses: Vec<Course>,
    pub blocks: CourseBlocks,
    pub topics: Vec<Topic>,
}

impl MemoryDirectory {
    pub fn set_course_role(&mut self, role: CourseRole, users: impl IntoIterator<Item = UserId>) {
        self.course_roles
            .get_mut()
            .unwrap()
            .insert(role, users.into_iter().collect());
    }

    pub fn add_user(&mut self, id: UserId, username: &str, enrolled: bool) {
        self.users.push(User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            is_staff: false,
            is_active: true,
        });
        if enrolled {
            self.enrolled.insert(id);
        }
    }
}

#[async_trait]
impl CourseRoster for MemoryDirectory {
    async fn active_enrollments(&self, _course: &CourseKey) -> Result<BTreeSet<UserId>> {
        Ok(self.enrolled.clone())
    }

    async fn users_with_course_role(
        &self,
        _course: &CourseKey,
        role: CourseRole,
    ) -> Result<BTreeSet<UserId>> {
        Ok(self
            .course_roles
            .lock()
            .unwrap()
            .get(&role)
            .cloned()
            .unwrap_or_default())
    }

    async fn users_with_forum_roles(
        &self,
        _course: &CourseKey,
        roles: &[ForumRole],
    ) -> Result<BTreeSet<UserId>> {
        Ok(roles
            .iter()
            .filter_map(|r| self.forum_roles.get(r))
            .flatten()
            .copied()
            .collect())
    }

    async fn cohort_members(&self, _course: &CourseKey, group_id: i64) -> Result<BTreeSet<UserId>> {
        Ok(self.cohorts.get(&group_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TeamLookup for MemoryDirectory {
    async fn team_for_topic(&self, topic_id: &str) -> Result<Option<Team>> {
        Ok(self.teams.iter().find(|t| t.topic_id == topic_id).cloned())
    }
}

#[async_trait]
impl DiscussionSettingsStore for MemoryDirectory {
    async fn discussion_settings(&self, _course: &CourseKey) -> Result<DiscussionSettings> {
        Ok(self.settings.clone())
    }
}

#[async_trait]
impl CourseStructureProvider for MemoryDirectory {
    async fn course_blocks(&self, _course: &CourseKey) -> Result<CourseBlocks> {
        Ok(self.blocks.clone())
    }

    async fn discussion_topics(&self, _course: &CourseKey) -> Result<Vec<Topic>> {
        Ok(self.topics.clone())
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> Result<Vec<User>> {
        Ok(self
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn profile_name(&self, username: &str) -> Result<Option<String>> {
        Ok(self.profiles.get(username).cloned())
    }

    async fn course(&self, course: &CourseKey) -> Result<Option<Course>> {
        Ok(self.courses.iter().find(|c| &c.key == course).cloned())
    }

    async fn enrolled_usernames(
        &self,
        _course: &CourseKey,
        search: Option<&str>,
    ) -> Result<Vec<String>> {
        let needle = search.map(str::to_lowercase);
        Ok(self
            .users
            .iter()
            .filter(|u| self.enrolled.contains(&u.id))
            .filter(|u| match &needle {
                Some(n) => u.username.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .map(|u| u.username.clone())
            .collect())
    }

    async fn course_roles_for_user(
        &self,
        _course: &CourseKey,
        user: UserId,
    ) -> Result<Vec<CourseRole>> {
        Ok(self
            .course_roles
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, users)| users.contains(&user))
            .map(|(role, _)| *role)
            .collect())
    }

    async fn add_course_role(&self, _course: &CourseKey, user: UserId, role: CourseRole) -> Result<()> {
        self.course_roles
            .lock()
            .unwrap()
            .entry(role)
            .or_default()
            .insert(user);
        Ok(())
    }

    async fn remove_course_role(
        &self,
        _course: &CourseKey,
        user: UserId,
        role: CourseRole,
    ) -> Result<()> {
        if let Some(users) = self.course_roles.lock().unwrap().get_mut(&role) {
            users.remove(&user);
        }
        Ok(())
    }
}
