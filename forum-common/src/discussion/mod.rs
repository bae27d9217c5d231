//! Discussion forum logic: topic tree, notification audience and dispatch,
//! learner listings

pub mod audience;
pub mod notifications;
pub mod prune;
pub mod stats;
pub mod topics;
pub mod usernames;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use audience::{AudienceQuery, AudienceResolver, AudienceSet, AudienceSource, ResolvedAudience};
pub use notifications::{
    ActivityKind, DiscussionNotificationSender, NotificationContext, ResponseInfo, ThreadInfo,
    ThreadType, UserRef,
};
pub use prune::remove_empty_sequentials;
pub use topics::{build_topics_v3_structure, CourseBlocks, Topic, TopicNode};
