//! Roadmap tree: the value produced by parsing a model answer.

use std::fmt;

use serde::{Deserialize, Serialize};
use termtree::Tree;

/// One node of a roadmap.
///
/// Each node exclusively owns its children, in document order. Optional text
/// fields are `None` when the source document omitted them or set them to
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub children: Vec<RoadmapNode>,
}

impl RoadmapNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_child(mut self, child: RoadmapNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order, left-to-right traversal of this node and its descendants.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Total number of nodes including `self`.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels in the tree; a single node has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in &node.children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// Leaf nodes in document order.
    pub fn leaves(&self) -> Vec<&RoadmapNode> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }

    /// Label used when rendering: the title, then the link in angle brackets.
    pub fn label(&self) -> String {
        let title = self.title.as_deref().unwrap_or("(untitled)");
        match self.link.as_deref() {
            Some(link) if !link.is_empty() => format!("{title} <{link}>"),
            _ => title.to_string(),
        }
    }

    /// Render into a `termtree` for terminal display.
    pub fn to_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree()).collect();
        Tree::new(self.label()).with_leaves(leaves)
    }
}

impl fmt::Display for RoadmapNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree())
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a RoadmapNode>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a RoadmapNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse push keeps left-to-right order on pop
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RoadmapNode {
        RoadmapNode::new("Rust")
            .with_child(
                RoadmapNode::new("Basics")
                    .with_child(RoadmapNode::new("Ownership"))
                    .with_child(RoadmapNode::new("Borrowing")),
            )
            .with_child(
                RoadmapNode::new("Async")
                    .with_description("Futures and executors")
                    .with_link("https://rust-lang.github.io/async-book/"),
            )
    }

    #[test]
    fn given_nested_tree_when_iterating_then_yields_preorder() {
        let tree = sample();
        let titles: Vec<_> = tree.iter().filter_map(|n| n.title.as_deref()).collect();
        assert_eq!(titles, vec!["Rust", "Basics", "Ownership", "Borrowing", "Async"]);
    }

    #[test]
    fn given_nested_tree_when_measuring_then_counts_nodes_and_depth() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(RoadmapNode::default().depth(), 1);
    }

    #[test]
    fn given_nested_tree_when_collecting_leaves_then_keeps_document_order() {
        let tree = sample();
        let leaves: Vec<_> = tree
            .leaves()
            .into_iter()
            .filter_map(|n| n.title.as_deref())
            .collect();
        assert_eq!(leaves, vec!["Ownership", "Borrowing", "Async"]);
        assert_eq!(
            tree.children[1].description.as_deref(),
            Some("Futures and executors")
        );
    }

    #[test]
    fn given_node_without_title_when_labelled_then_uses_placeholder() {
        assert_eq!(RoadmapNode::default().label(), "(untitled)");
        assert_eq!(
            RoadmapNode::new("Docs").with_link("https://docs.rs").label(),
            "Docs <https://docs.rs>"
        );
    }

    #[test]
    fn given_tree_when_displayed_then_renders_every_label() {
        let rendered = sample().to_string();
        assert!(rendered.starts_with("Rust\n"));
        assert!(rendered.contains("Ownership"));
        assert!(rendered.contains("Async <https://rust-lang.github.io/async-book/>"));
    }
}
