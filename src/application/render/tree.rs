//! Terminal preview of a forest, one tree per root.

use generational_arena::Index;
use termtree::Tree;

use crate::domain::ForestArena;

pub fn render(forest: &ForestArena) -> String {
    if forest.roots().is_empty() {
        return "Empty forest\n".to_string();
    }
    forest
        .roots()
        .iter()
        .filter_map(|&root| build_tree(forest, root))
        .map(|tree| {
            let mut text = tree.to_string();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        })
        .collect()
}

fn build_tree(forest: &ForestArena, node_idx: Index) -> Option<Tree<String>> {
    let node = forest.get_node(node_idx)?;
    let leaves: Vec<_> = node
        .children
        .iter()
        .filter_map(|&child| build_tree(forest, child))
        .collect();
    Some(Tree::new(node.data.to_string()).with_leaves(leaves))
}
