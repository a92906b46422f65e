use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{NodeData, TreeNode};

/// Node in the arena-based forest.
#[derive(Debug)]
pub struct ForestNode {
    /// Label, Id and link of this node
    pub data: NodeData,
    /// 1-based hierarchy level
    pub depth: usize,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Arena-based forest produced by one conversion.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Roots keep the order in which their rows appeared in the input.
#[derive(Debug)]
pub struct ForestArena {
    /// Arena storage for all nodes
    arena: Arena<ForestNode>,
    /// Indices of the root nodes
    roots: Vec<Index>,
}

impl Default for ForestArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Insert a node; `parent == None` makes it a new root.
    ///
    /// A parent index that is no longer in the arena leaves the node detached.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, depth: usize, parent: Option<Index>) -> Index {
        let node = ForestNode {
            data,
            depth,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over every tree, roots in input order.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Height of the tallest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_height(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_height(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_height(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Owned nested view of the forest for serialization.
    pub fn to_tree_nodes(&self) -> Vec<TreeNode> {
        self.roots
            .iter()
            .filter_map(|&root| self.to_tree_node(root))
            .collect()
    }

    fn to_tree_node(&self, node_idx: Index) -> Option<TreeNode> {
        let node = self.get_node(node_idx)?;
        let mut tree = TreeNode::leaf(&node.data);
        tree.children = node
            .children
            .iter()
            .filter_map(|&child| self.to_tree_node(child))
            .collect();
        Some(tree)
    }
}

pub struct ForestIterator<'a> {
    forest: &'a ForestArena,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a ForestArena) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
