//! Course key parsing
//!
//! Course keys use the `course-v1:{org}+{course}+{run}` form.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const COURSE_KEY_PREFIX: &str = "course-v1:";

/// Integer user identifier
pub type UserId = i64;

/// Parsed course key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey {
    org: String,
    course: String,
    run: String,
}

impl CourseKey {
    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn run(&self) -> &str {
        &self.run
    }
}

impl FromStr for CourseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix(COURSE_KEY_PREFIX)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid course key: {}", s)))?;

        let parts: Vec<&str> = body.split('+').collect();
        match parts.as_slice() {
            [org, course, run] if [org, course, run].iter().all(|p| is_key_part(p)) => Ok(Self {
                org: org.to_string(),
                course: course.to_string(),
                run: run.to_string(),
            }),
            _ => Err(Error::InvalidInput(format!("Invalid course key: {}", s))),
        }
    }
}

fn is_key_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
}

impl TryFrom<String> for CourseKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}+{}+{}", COURSE_KEY_PREFIX, self.org, self.course, self.run)
    }
}
