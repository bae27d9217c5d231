//! Removal of empty containers from the topic tree

use super::topics::{NodeKind, TopicNode};

/// Drop sequentials and chapters left without children
///
/// Children are pruned first, so a chapter whose sequentials were all empty
/// disappears too. Other node kinds pass through with pruned children.
/// Applying this twice gives the same tree as applying it once.
pub fn remove_empty_sequentials(nodes: Vec<TopicNode>) -> Vec<TopicNode> {
    nodes.into_iter().filter_map(prune_node).collect()
}

fn prune_node(mut node: TopicNode) -> Option<TopicNode> {
    node.children = remove_empty_sequentials(std::mem::take(&mut node.children));
    match node.kind {
        NodeKind::Sequential | NodeKind::Chapter if node.children.is_empty() => None,
        _ => Some(node),
    }
}
