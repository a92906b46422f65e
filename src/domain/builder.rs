//! Tree builder: threads classified rows into a forest.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::ForestArena;
use crate::domain::classifier::classify;
use crate::domain::entities::{Row, GROUP_SIZE};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::observer::ConversionObserver;

/// Result type for tree operations.
pub type TreeResult<T> = DomainResult<T>;

/// How the builder treats rows whose depth does not continue the current branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPolicy {
    /// Attach to whatever node last held the parent depth, even if it belongs
    /// to an earlier branch. Rows without any parent candidate are skipped.
    #[default]
    Permissive,
    /// Reject depth-0 rows and descents by more than one level.
    Strict,
}

/// Constructs a forest from ordered rows.
///
/// `frontier[d]` holds the most recently added node at depth `d`; a node at
/// depth `d > 1` is appended to the children of `frontier[d - 1]`.
pub struct TreeBuilder {
    policy: DepthPolicy,
    frontier: Vec<Option<Index>>,
    previous_depth: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DepthPolicy::default())
    }
}

impl TreeBuilder {
    pub fn new(policy: DepthPolicy) -> Self {
        Self {
            policy,
            frontier: Vec::new(),
            previous_depth: 0,
        }
    }

    pub fn policy(&self) -> DepthPolicy {
        self.policy
    }

    /// Build the forest for `rows`, reporting progress to `observer`.
    #[instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub fn build(
        &mut self,
        rows: &[Row],
        observer: &dyn ConversionObserver,
    ) -> TreeResult<ForestArena> {
        // Reset state for a fresh run
        self.init_frontier(rows);
        self.previous_depth = 0;

        let mut forest = ForestArena::new();
        for (i, row) in rows.iter().enumerate() {
            self.add_row(&mut forest, i + 1, row, observer)?;
        }

        debug!(
            "built forest: {} roots, {} nodes",
            forest.roots().len(),
            forest.len()
        );
        Ok(forest)
    }

    /// One empty slot per level spanned by the widest row.
    fn init_frontier(&mut self, rows: &[Row]) {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let levels = width.div_ceil(GROUP_SIZE);
        self.frontier.clear();
        self.frontier.resize(levels + 1, None);
    }

    fn add_row(
        &mut self,
        forest: &mut ForestArena,
        row_no: usize,
        row: &[String],
        observer: &dyn ConversionObserver,
    ) -> TreeResult<()> {
        let classified = classify(row);
        let depth = classified.depth;

        if depth == 0 {
            let reason = "no complete column group";
            return match self.policy {
                DepthPolicy::Strict => Err(DomainError::MalformedRow {
                    row: row_no,
                    reason: reason.to_string(),
                }),
                DepthPolicy::Permissive => {
                    observer.row_skipped(row_no, reason);
                    Ok(())
                }
            };
        }

        if self.policy == DepthPolicy::Strict && depth > self.previous_depth + 1 {
            return Err(DomainError::DepthJump {
                row: row_no,
                depth,
                previous: self.previous_depth,
            });
        }

        let parent = if depth == 1 {
            None
        } else {
            match self.frontier.get(depth - 1).copied().flatten() {
                Some(parent) => Some(parent),
                None => {
                    observer.row_skipped(row_no, &format!("no ancestor at depth {}", depth - 1));
                    return Ok(());
                }
            }
        };

        observer.node_added(row_no, depth, &classified.data);
        let idx = forest.insert_node(classified.data, depth, parent);

        if self.frontier.len() <= depth {
            self.frontier.resize(depth + 1, None);
        }
        self.frontier[depth] = Some(idx);
        self.previous_depth = depth;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observer::NullObserver;

    fn rows(lines: &[&str]) -> Vec<Row> {
        lines
            .iter()
            .map(|l| l.split(',').map(String::from).collect())
            .collect()
    }

    fn labels(forest: &ForestArena) -> Vec<(usize, String)> {
        forest
            .iter()
            .map(|(_, n)| (n.depth, n.data.label.clone()))
            .collect()
    }

    #[test]
    fn given_no_rows_when_building_then_empty_forest() {
        let forest = TreeBuilder::default().build(&[], &NullObserver).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn given_branching_rows_when_building_then_children_attach_to_latest_parent() {
        let input = rows(&[
            "A,1,a,,,,,,",
            "A,1,a,B,2,b,,,",
            "A,1,a,B,2,b,C,3,c",
            "A,1,a,D,4,d,,,",
            "E,5,e,,,,,,",
            "E,5,e,F,6,f,,,",
        ]);

        let forest = TreeBuilder::default().build(&input, &NullObserver).unwrap();

        assert_eq!(forest.roots().len(), 2);
        let trees = forest.to_tree_nodes();
        assert_eq!(trees[0].label, "A");
        assert_eq!(trees[0].children.len(), 2);
        assert_eq!(trees[0].children[0].label, "B");
        assert_eq!(trees[0].children[0].children[0].label, "C");
        assert_eq!(trees[0].children[1].label, "D");
        assert_eq!(trees[1].children[0].label, "F");
    }

    #[test]
    fn given_valid_rows_when_building_then_child_depth_is_parent_plus_one() {
        let input = rows(&[
            "A,1,a,,,",
            "A,1,a,B,2,b",
            "A,1,a,C,3,c",
            "D,4,d,,,",
        ]);

        let forest = TreeBuilder::default().build(&input, &NullObserver).unwrap();

        for (_, node) in forest.iter() {
            match node.parent {
                None => assert_eq!(node.depth, 1),
                Some(p) => assert_eq!(forest.get_node(p).unwrap().depth + 1, node.depth),
            }
        }
    }

    #[test]
    fn given_depth_zero_row_when_permissive_then_skipped() {
        let input = rows(&["A,1,a", "lonely", "A,1,a,B,2,b"]);

        let forest = TreeBuilder::default().build(&input, &NullObserver).unwrap();

        assert_eq!(labels(&forest), vec![(1, "A".into()), (2, "B".into())]);
    }

    #[test]
    fn given_depth_zero_row_when_strict_then_malformed_row() {
        let input = rows(&["A,1,a", "lonely"]);

        let result = TreeBuilder::new(DepthPolicy::Strict).build(&input, &NullObserver);

        assert_eq!(
            result.unwrap_err(),
            DomainError::MalformedRow {
                row: 2,
                reason: "no complete column group".into()
            }
        );
    }

    #[test]
    fn given_child_before_any_root_when_permissive_then_skipped() {
        let input = rows(&["A,1,a,B,2,b", "C,3,c,,,"]);

        let forest = TreeBuilder::default().build(&input, &NullObserver).unwrap();

        assert_eq!(labels(&forest), vec![(1, "C".into())]);
    }

    #[test]
    fn given_stale_jump_when_permissive_then_attaches_to_earlier_branch() {
        // X at depth 3 follows root D directly; its parent slot still holds B
        let input = rows(&[
            "A,1,a,,,,,,",
            "A,1,a,B,2,b,,,",
            "D,4,d,,,,,,",
            "D,4,d,?,?,?,X,9,x",
        ]);

        let forest = TreeBuilder::default().build(&input, &NullObserver).unwrap();

        let trees = forest.to_tree_nodes();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].children[0].label, "B");
        assert_eq!(trees[0].children[0].children[0].label, "X");
        assert!(trees[1].children.is_empty());
    }

    #[test]
    fn given_depth_jump_when_strict_then_error() {
        let input = rows(&["A,1,a,,,,,,", "A,1,a,B,2,b,C,3,c"]);

        let result = TreeBuilder::new(DepthPolicy::Strict).build(&input, &NullObserver);

        assert_eq!(
            result.unwrap_err(),
            DomainError::DepthJump {
                row: 2,
                depth: 3,
                previous: 1
            }
        );
    }

    #[test]
    fn given_first_row_below_root_when_strict_then_error() {
        let input = rows(&["A,1,a,B,2,b"]);

        let result = TreeBuilder::new(DepthPolicy::Strict).build(&input, &NullObserver);

        assert!(matches!(result, Err(DomainError::DepthJump { row: 1, .. })));
    }

    #[test]
    fn given_builder_reused_when_building_twice_then_identical_forests() {
        let input = rows(&["A,1,a,,,", "A,1,a,B,2,b"]);
        let mut builder = TreeBuilder::default();

        let first = builder.build(&input, &NullObserver).unwrap();
        let second = builder.build(&input, &NullObserver).unwrap();

        assert_eq!(first.to_tree_nodes(), second.to_tree_nodes());
    }
}
