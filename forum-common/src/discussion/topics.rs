//! Courseware-aligned discussion topic tree
//!
//! Turns the flat course block listing and the flat topic list returned by the
//! forum into the v3 topic hierarchy the discussions UI renders:
//!
//! ```text
//! [non-courseware topics...] [chapter -> sequential -> topic ...] [archived]
//! ```
//!
//! Every input topic lands in exactly one of the three partitions.

use super::prune::remove_empty_sequentials;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;

/// Id and display name of the bucket holding unlinked courseware topics
pub const ARCHIVED_ID: &str = "archived";
const ARCHIVED_NAME: &str = "Archived";

/// Course structure block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Course,
    Chapter,
    Sequential,
    Vertical,
    Discussion,
    #[serde(other)]
    Other,
}

/// One node of the course structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Child block ids in course order
    #[serde(default)]
    pub children: Vec<String>,
    /// Discussion topic linked to this unit
    #[serde(default)]
    pub discussions_id: Option<String>,
}

/// Block listing of one course
///
/// An inaccessible course is represented by the empty default value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseBlocks {
    /// Id of the course root block, if known
    #[serde(default)]
    pub root: Option<String>,
    pub blocks: HashMap<String, Block>,
}

impl CourseBlocks {
    pub fn new(root: Option<String>, blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            root,
            blocks: blocks.into_iter().map(|b| (b.id.clone(), b)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every chapter block: root order first, then unreachable chapters by id
    pub fn chapters(&self) -> Vec<&Block> {
        let root = self
            .root
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.blocks.values().find(|b| b.block_type == BlockType::Course));

        let mut seen = HashSet::new();
        let mut chapters: Vec<&Block> = root
            .map(|r| r.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|b| b.block_type == BlockType::Chapter && seen.insert(b.id.as_str()))
            .collect();

        let mut rest: Vec<&Block> = self
            .blocks
            .values()
            .filter(|b| b.block_type == BlockType::Chapter && !seen.contains(b.id.as_str()))
            .collect();
        rest.sort_by(|a, b| a.id.cmp(&b.id));
        chapters.extend(rest);
        chapters
    }

    fn children_of_type<'a>(
        &'a self,
        block: &'a Block,
        block_type: BlockType,
    ) -> impl Iterator<Item = &'a Block> + 'a {
        block
            .children
            .iter()
            .filter_map(move |id| self.get(id))
            .filter(move |b| b.block_type == block_type)
    }
}

/// Thread totals per thread type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadCounts {
    pub discussion: u64,
    pub question: u64,
}

impl AddAssign for ThreadCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.discussion += rhs.discussion;
        self.question += rhs.question;
    }
}

/// Discussion category as reported by the forum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `None` marks a general (non-courseware) topic
    #[serde(default)]
    pub usage_key: Option<String>,
    #[serde(default)]
    pub thread_counts: ThreadCounts,
}

/// Kind of a node in the output tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Topic,
    Chapter,
    Sequential,
    Archived,
}

/// Node of the UI-facing topic tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_key: Option<String>,
    pub courseware: bool,
    /// Present on topics and, aggregated, on sequentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_counts: Option<ThreadCounts>,
    #[serde(default)]
    pub children: Vec<TopicNode>,
}

impl TopicNode {
    fn topic(topic: &Topic, courseware: bool) -> Self {
        Self {
            id: topic.id.clone(),
            kind: NodeKind::Topic,
            name: topic.name.clone(),
            usage_key: topic.usage_key.clone(),
            courseware,
            thread_counts: Some(topic.thread_counts),
            children: Vec::new(),
        }
    }

    fn block(block: &Block, kind: NodeKind, children: Vec<TopicNode>) -> Self {
        Self {
            id: block.id.clone(),
            kind,
            name: block.display_name.clone().unwrap_or_default(),
            usage_key: None,
            courseware: true,
            thread_counts: None,
            children,
        }
    }

    /// Ids of every topic leaf at or below this node
    pub fn topic_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_topic_ids(&mut ids);
        ids
    }

    fn collect_topic_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        if self.kind == NodeKind::Topic {
            ids.push(&self.id);
        }
        for child in &self.children {
            child.collect_topic_ids(ids);
        }
    }
}

/// Build the v3 topic tree and prune empty containers
///
/// Output order: non-courseware topics (input order), chapters, then the
/// archived bucket when any courseware topic is no longer linked from a unit.
pub fn build_topics_v3_structure(blocks: &CourseBlocks, topics: &[Topic]) -> Vec<TopicNode> {
    let courseware_topics: HashMap<&str, &Topic> = topics
        .iter()
        .filter(|t| t.usage_key.is_some())
        .map(|t| (t.id.as_str(), t))
        .collect();

    let mut structured: Vec<TopicNode> = topics
        .iter()
        .filter(|t| t.usage_key.is_none())
        .map(|t| TopicNode::topic(t, false))
        .collect();

    let mut placed: HashSet<&str> = HashSet::new();
    for chapter in blocks.chapters() {
        let sequentials = blocks
            .children_of_type(chapter, BlockType::Sequential)
            .map(|seq| sequential_node(blocks, seq, &courseware_topics, &mut placed))
            .collect();
        structured.push(TopicNode::block(chapter, NodeKind::Chapter, sequentials));
    }

    let archived: Vec<TopicNode> = topics
        .iter()
        .filter(|t| t.usage_key.is_some() && !placed.contains(t.id.as_str()))
        .map(|t| TopicNode::topic(t, false))
        .collect();

    if !archived.is_empty() {
        structured.push(TopicNode {
            id: ARCHIVED_ID.to_string(),
            kind: NodeKind::Archived,
            name: ARCHIVED_NAME.to_string(),
            usage_key: None,
            courseware: false,
            thread_counts: None,
            children: archived,
        });
    }

    remove_empty_sequentials(structured)
}

/// Resolve a sequential's units to topics and sum their thread counts
fn sequential_node<'a>(
    blocks: &CourseBlocks,
    sequential: &Block,
    topics: &HashMap<&'a str, &'a Topic>,
    placed: &mut HashSet<&'a str>,
) -> TopicNode {
    let mut counts = ThreadCounts::default();
    let mut children = Vec::new();

    for unit in blocks.children_of_type(sequential, BlockType::Vertical) {
        let Some(topic) = unit
            .discussions_id
            .as_deref()
            .and_then(|id| topics.get(id).copied())
        else {
            continue;
        };
        // A topic linked from two units stays under the first one
        if !placed.insert(topic.id.as_str()) {
            continue;
        }
        counts += topic.thread_counts;
        children.push(TopicNode::topic(topic, true));
    }

    let mut node = TopicNode::block(sequential, NodeKind::Sequential, children);
    node.thread_counts = Some(counts);
    node
}
