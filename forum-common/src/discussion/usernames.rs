//! Paginated username listings for learner views

use crate::course_key::CourseKey;
use crate::providers::UserDirectory;
use crate::{Error, Result};
use serde::Serialize;

/// One page of enrolled usernames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsernamePage {
    /// Comma-separated usernames on the requested page
    pub usernames: String,
    /// Total matching users
    pub count: usize,
    /// Total pages, counting a trailing partial page
    pub pages: usize,
}

impl UsernamePage {
    /// Usernames on this page, in order
    pub fn names(&self) -> Vec<&str> {
        self.usernames.split(',').filter(|u| !u.is_empty()).collect()
    }
}

/// Usernames of enrolled users containing `search` (case-insensitive)
pub async fn get_usernames_from_search_string(
    directory: &dyn UserDirectory,
    course: &CourseKey,
    search: &str,
    page: usize,
    page_size: usize,
) -> Result<UsernamePage> {
    let matched = directory.enrolled_usernames(course, Some(search)).await?;
    paginate_usernames(matched, page, page_size)
}

/// Usernames of every enrolled user
pub async fn get_usernames_for_course(
    directory: &dyn UserDirectory,
    course: &CourseKey,
    page: usize,
    page_size: usize,
) -> Result<UsernamePage> {
    let matched = directory.enrolled_usernames(course, None).await?;
    paginate_usernames(matched, page, page_size)
}

/// Order usernames shortest first (ties alphabetical) and cut one page
///
/// An empty input yields an empty page with zero count and pages, whatever
/// page was asked for. Otherwise `page` is 1-based and must exist.
pub fn paginate_usernames(
    mut usernames: Vec<String>,
    page: usize,
    page_size: usize,
) -> Result<UsernamePage> {
    if page_size == 0 {
        return Err(Error::InvalidInput("page_size must be positive".to_string()));
    }
    if usernames.is_empty() {
        return Ok(UsernamePage::default());
    }

    usernames.sort_by(|a, b| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    });

    let count = usernames.len();
    let pages = count.div_ceil(page_size);
    if page == 0 || page > pages {
        return Err(Error::InvalidInput(format!(
            "page {} out of range (1..={})",
            page, pages
        )));
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(count);
    Ok(UsernamePage {
        usernames: usernames[start..end].join(","),
        count,
        pages,
    })
}
