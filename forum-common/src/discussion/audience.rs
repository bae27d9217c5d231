//! New-post notification audience
//!
//! Precedence, first match wins:
//! 1. Topic belongs to a team → team members
//! 2. Cohorts enabled, topic divided, post has a group → cohort members plus
//!    forum moderators/TAs plus course staff and instructors
//! 3. Otherwise → every actively enrolled user
//!
//! The post's author is always removed from the result.

use crate::course_key::{CourseKey, UserId};
use crate::providers::{CourseRoster, DiscussionSettingsStore, TeamLookup};
use crate::roles::{CourseRole, ForumRole};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Deduplicated recipients, never containing the post author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AudienceSet(BTreeSet<UserId>);

impl AudienceSet {
    /// Collect members, dropping the creator
    pub fn excluding(members: impl IntoIterator<Item = UserId>, creator: UserId) -> Self {
        let mut users: BTreeSet<UserId> = members.into_iter().collect();
        users.remove(&creator);
        Self(users)
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied()
    }

    /// Ascending, unique ids
    pub fn into_vec(self) -> Vec<UserId> {
        self.0.into_iter().collect()
    }
}

/// Which precedence branch produced an audience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceSource {
    Team,
    Cohort,
    Enrollment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudience {
    pub source: AudienceSource,
    pub users: AudienceSet,
}

/// Post attributes the audience depends on
#[derive(Debug, Clone, Copy)]
pub struct AudienceQuery<'a> {
    pub course: &'a CourseKey,
    /// Discussion topic (commentable) id of the post
    pub topic_id: &'a str,
    /// Cohort group the post was made in
    pub group_id: Option<i64>,
    pub creator: UserId,
}

/// Computes new-post audiences from roster, team and settings lookups
#[derive(Clone)]
pub struct AudienceResolver {
    roster: Arc<dyn CourseRoster>,
    teams: Arc<dyn TeamLookup>,
    settings: Arc<dyn DiscussionSettingsStore>,
}

impl AudienceResolver {
    pub fn new(
        roster: Arc<dyn CourseRoster>,
        teams: Arc<dyn TeamLookup>,
        settings: Arc<dyn DiscussionSettingsStore>,
    ) -> Self {
        Self {
            roster,
            teams,
            settings,
        }
    }

    pub async fn resolve(&self, query: AudienceQuery<'_>) -> Result<ResolvedAudience> {
        if let Some(team) = self.teams.team_for_topic(query.topic_id).await? {
            debug!(
                "Audience for topic {} from team {} ({} members)",
                query.topic_id,
                team.team_id,
                team.members.len()
            );
            return Ok(ResolvedAudience {
                source: AudienceSource::Team,
                users: AudienceSet::excluding(team.members, query.creator),
            });
        }

        let settings = self.settings.discussion_settings(query.course).await?;
        if let Some(group_id) = query.group_id {
            if settings.cohorts_enabled && settings.is_topic_divided(query.topic_id) {
                let users = self.cohort_audience(query.course, group_id).await?;
                debug!(
                    "Audience for topic {} from cohort {} ({} users)",
                    query.topic_id,
                    group_id,
                    users.len()
                );
                return Ok(ResolvedAudience {
                    source: AudienceSource::Cohort,
                    users: AudienceSet::excluding(users, query.creator),
                });
            }
        }

        let enrolled = self.roster.active_enrollments(query.course).await?;
        debug!(
            "Audience for topic {} from course enrollment ({} users)",
            query.topic_id,
            enrolled.len()
        );
        Ok(ResolvedAudience {
            source: AudienceSource::Enrollment,
            users: AudienceSet::excluding(enrolled, query.creator),
        })
    }

    async fn cohort_audience(&self, course: &CourseKey, group_id: i64) -> Result<BTreeSet<UserId>> {
        let mut users = self.roster.cohort_members(course, group_id).await?;
        users.extend(
            self.roster
                .users_with_forum_roles(course, &ForumRole::COHORT_AUDIENCE)
                .await?,
        );
        users.extend(
            self.roster
                .users_with_course_role(course, CourseRole::Staff)
                .await?,
        );
        users.extend(
            self.roster
                .users_with_course_role(course, CourseRole::Instructor)
                .await?,
        );
        Ok(users)
    }
}
