//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// One source record after header lines and leading columns were removed.
pub type Row = Vec<String>;

/// Number of columns that make up one hierarchy level.
pub const GROUP_SIZE: usize = 3;

/// Role a column plays inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Label,
    Id,
    Link,
}

impl Role {
    /// Role of a 1-based column number, periodic in `GROUP_SIZE`.
    ///
    /// `1 → Label`, `2 → Id`, `3 → Link`, `4 → Label`, ...
    pub fn for_column(column_no: usize) -> Self {
        match column_no % GROUP_SIZE {
            1 => Role::Label,
            2 => Role::Id,
            _ => Role::Link,
        }
    }

    /// Field name used in the rendered outputs.
    pub fn element_name(self) -> &'static str {
        match self {
            Role::Label => "label",
            Role::Id => "Id",
            Role::Link => "link",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// Payload carried by every node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    pub label: String,
    pub id: String,
    pub link: String,
}

impl NodeData {
    pub fn set(&mut self, role: Role, value: &str) {
        let slot = match role {
            Role::Label => &mut self.label,
            Role::Id => &mut self.id,
            Role::Link => &mut self.link,
        };
        *slot = value.to_string();
    }

    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Label => &self.label,
            Role::Id => &self.id,
            Role::Link => &self.link,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// Provisional node produced by the level classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub data: NodeData,
    /// 1-based hierarchy level, 0 for rows without a usable first group
    pub depth: usize,
}

/// Owned, arena-free view of one node and its subtree.
///
/// Field order and names match the JSON output: `label`, `Id`, `link`, `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(rename = "Id")]
    pub id: String,
    pub link: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(data: &NodeData) -> Self {
        Self {
            label: data.label.clone(),
            id: data.id.clone(),
            link: data.link.clone(),
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}
