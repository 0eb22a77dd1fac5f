//! Text renderings of assembly trees and of the item store.

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::config::{RenderStyle, Settings};
use crate::domain::{SharedItemStore, TreeArena, TreeNode, TreeResult};

/// Display name of an item. Only the renderers need it.
pub trait Named {
    fn name(&self) -> String;
}

impl Named for String {
    fn name(&self) -> String {
        self.clone()
    }
}

impl Named for &str {
    fn name(&self) -> String {
        self.to_string()
    }
}

fn label<T: Named>(node: &TreeNode<T>, empty_label: &str) -> String {
    node.item()
        .map(|item| item.name())
        .unwrap_or_else(|| empty_label.to_string())
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, root: Index, empty_label: &str) -> TreeResult<Tree<String>>;
}

impl<T: Named> TreeNodeConvert for TreeArena<T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: Index, empty_label: &str) -> TreeResult<Tree<String>> {
        fn build_tree<T: Named>(
            arena: &TreeArena<T>,
            node_idx: Index,
            parent_tree: &mut Tree<String>,
            empty_label: &str,
        ) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in node.children() {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(label(child, empty_label));
                        build_tree(arena, child_idx, &mut child_tree, empty_label);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let mut tree = Tree::new(label(self.node(root)?, empty_label));
        build_tree(self, root, &mut tree, empty_label);
        Ok(tree)
    }
}

/// One line per node in pre-order, indented by the node's level.
///
/// ```text
/// Root assembly
/// - Assembly_1
/// - - Detail_A
/// ```
pub fn render_outline<T: Named>(
    tree: &TreeArena<T>,
    root: Index,
    settings: &Settings,
) -> TreeResult<String> {
    tree.node(root)?;
    let mut out = String::new();
    for (_, node) in tree.iter(root) {
        out.push_str(&settings.indent.repeat(node.level()));
        out.push_str(&label(node, &settings.empty_label));
        out.push('\n');
    }
    Ok(out)
}

/// Render the subtree in the configured style.
pub fn render<T: Named>(tree: &TreeArena<T>, root: Index, settings: &Settings) -> TreeResult<String> {
    match settings.style {
        RenderStyle::Outline => render_outline(tree, root, settings),
        RenderStyle::Tree => Ok(tree.to_tree_string(root, &settings.empty_label)?.to_string()),
    }
}

/// Registered items with their live reference counts, sorted by name.
pub fn render_links<T: Named>(store: &SharedItemStore<T>) -> String {
    let lines = store
        .links()
        .map(|(item, count)| (item.name(), count))
        .sorted()
        .map(|(name, count)| format!("{}: {}\n", name, count))
        .join("");
    format!("Current links:\n{}", lines)
}
