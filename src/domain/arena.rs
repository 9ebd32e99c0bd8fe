use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::RoadmapNode;

/// Field payload of a pending roadmap node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

/// Node in the arena-based parse workspace.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes, in document order
    pub children: Vec<Index>,
}

/// Arena holding the nodes of one roadmap while it is being parsed.
///
/// Nodes refer to each other by generational index, so the tree can be
/// filled by an explicit work stack and later turned into owned
/// [`RoadmapNode`]s without recursion.
#[derive(Debug)]
pub struct RoadmapArena {
    arena: Arena<ArenaNode>,
    root: Option<Index>,
}

impl Default for RoadmapArena {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadmapArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node and append it to its parent's children.
    ///
    /// A node inserted without a parent becomes the root.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = ArenaNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Consume the arena and build the owned tree.
    ///
    /// Nodes are assembled in post-order, so every child is complete before
    /// its parent takes ownership of it. Returns `None` for an empty arena.
    #[instrument(level = "trace", skip(self))]
    pub fn into_tree(mut self) -> Option<RoadmapNode> {
        let root = self.root?;
        let order: Vec<Index> = self.iter_postorder().map(|(idx, _)| idx).collect();

        let mut built: HashMap<Index, RoadmapNode> = HashMap::with_capacity(order.len());
        for idx in order {
            let node = self.arena.remove(idx)?;
            let children = node
                .children
                .iter()
                .map(|child| built.remove(child))
                .collect::<Option<Vec<_>>>()?;
            built.insert(
                idx,
                RoadmapNode {
                    title: node.data.title,
                    description: node.data.description,
                    link: node.data.link,
                    children,
                },
            );
        }

        built.remove(&root)
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a RoadmapArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a RoadmapArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ArenaNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
