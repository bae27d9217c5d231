//! Learner stats merge
//!
//! The comment service only reports users who have posted. Learner views list
//! a roster page, so roster users missing from the report get synthesized
//! rows: zero counts in one mode, null counts with a profile name in the other.

use crate::providers::UserDirectory;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-learner discussion activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub threads: Option<u64>,
    #[serde(default)]
    pub replies: Option<u64>,
    #[serde(default)]
    pub responses: Option<u64>,
    #[serde(default)]
    pub active_flags: Option<u64>,
    #[serde(default)]
    pub inactive_flags: Option<u64>,
}

impl UserStats {
    /// Row for a learner with no discussion content
    pub fn zeroed(username: &str) -> Self {
        Self {
            username: username.to_string(),
            name: None,
            threads: Some(0),
            replies: Some(0),
            responses: Some(0),
            active_flags: Some(0),
            inactive_flags: Some(0),
        }
    }

    /// Row with unknown counts
    pub fn unreported(username: &str, name: String) -> Self {
        Self {
            username: username.to_string(),
            name: Some(name),
            ..Self::default()
        }
    }
}

/// How roster users absent from the report are filled in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    #[default]
    Zero,
    Null,
}

/// Append zero-count rows for roster users missing from `stats`
///
/// `users_in_course` is a comma-separated username page.
pub fn add_stats_for_users_with_no_discussion_content(
    mut stats: Vec<UserStats>,
    users_in_course: &str,
) -> Vec<UserStats> {
    let missing: Vec<String> = missing_usernames(&stats, users_in_course)
        .into_iter()
        .map(str::to_string)
        .collect();
    stats.extend(missing.iter().map(|u| UserStats::zeroed(u)));
    sort_by_username_length(&mut stats);
    stats
}

/// Append null-count rows, carrying profile names, for roster users missing
/// from `stats`
pub async fn add_stats_for_users_with_null_values(
    directory: &dyn UserDirectory,
    mut stats: Vec<UserStats>,
    users_in_course: &str,
) -> Result<Vec<UserStats>> {
    let missing: Vec<String> = missing_usernames(&stats, users_in_course)
        .into_iter()
        .map(str::to_string)
        .collect();
    for username in missing {
        let name = directory.profile_name(&username).await?.unwrap_or_default();
        stats.push(UserStats::unreported(&username, name));
    }
    sort_by_username_length(&mut stats);
    Ok(stats)
}

/// Attach profile names to every row
pub async fn add_name_for_users_stats(
    directory: &dyn UserDirectory,
    stats: Vec<UserStats>,
) -> Result<Vec<UserStats>> {
    let mut named = Vec::with_capacity(stats.len());
    for mut row in stats {
        row.name = Some(directory.profile_name(&row.username).await?.unwrap_or_default());
        named.push(row);
    }
    Ok(named)
}

/// Roster usernames with no row in `stats`, in roster order, each once
fn missing_usernames<'a>(stats: &[UserStats], users_in_course: &'a str) -> Vec<&'a str> {
    let reported: HashSet<&str> = stats.iter().map(|s| s.username.as_str()).collect();
    let mut seen = HashSet::new();
    users_in_course
        .split(',')
        .filter(|u| !u.is_empty())
        .filter(|u| !reported.contains(u))
        .filter(|u| seen.insert(*u))
        .collect()
}

fn sort_by_username_length(stats: &mut [UserStats]) {
    stats.sort_by_key(|s| s.username.chars().count());
}
