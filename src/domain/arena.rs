use std::rc::Rc;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, TreeResult};
use crate::domain::item::ItemHandle;
use crate::domain::store::{Release, SharedStore};

/// Quantity of a freshly created position.
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// Tree node in the arena-based assembly structure.
#[derive(Debug)]
pub struct TreeNode<T> {
    item: Option<ItemHandle<T>>,
    quantity: f64,
    level: usize,
    parent: Option<Index>,
    children: Vec<Index>,
}

impl<T> TreeNode<T> {
    fn new(item: Option<ItemHandle<T>>) -> Self {
        Self {
            item,
            quantity: DEFAULT_QUANTITY,
            level: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn item(&self) -> Option<&ItemHandle<T>> {
        self.item.as_ref()
    }

    pub fn has_item(&self) -> bool {
        self.item.is_some()
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Depth in the tree, 0 for a root.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Index of parent node in the arena, None for root nodes
    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[Index] {
        &self.children
    }
}

/// Report of a subtree teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Teardown {
    /// Removed nodes, children before their parent
    pub removed: Vec<Index>,
    /// Number of items the store destroyed during the teardown
    pub items_destroyed: usize,
}

/// Arena-based forest of assembly trees.
///
/// Every parentless node is the root of its own tree. Nodes own their
/// children through the child lists; the parent link is a plain index and
/// never keeps anything alive. Item bindings are counted in the injected
/// store, which may be shared with other arenas.
///
/// Dropping the arena tears down all remaining trees.
pub struct TreeArena<T> {
    arena: Arena<TreeNode<T>>,
    store: SharedStore<T>,
}

impl<T> TreeArena<T> {
    pub fn new(store: SharedStore<T>) -> Self {
        Self {
            arena: Arena::new(),
            store,
        }
    }

    pub fn store(&self) -> &SharedStore<T> {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    /// Like [`Self::get_node`], but reports a missing node as an error.
    pub fn node(&self, idx: Index) -> TreeResult<&TreeNode<T>> {
        self.arena.get(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    fn node_mut(&mut self, idx: Index) -> TreeResult<&mut TreeNode<T>> {
        self.arena.get_mut(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    /// Roots of all trees held by the arena, in no particular order.
    pub fn roots(&self) -> Vec<Index> {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_empty(&mut self) -> Index {
        self.arena.insert(TreeNode::new(None))
    }

    #[instrument(level = "trace", skip_all, fields(item = ?item.id()))]
    pub fn create_with_item(&mut self, item: ItemHandle<T>) -> Index {
        self.store.borrow_mut().acquire(&item);
        self.arena.insert(TreeNode::new(Some(item)))
    }

    /// Creates a node bound to `item` and appends it as the last child of `parent`.
    #[instrument(level = "trace", skip(self, item))]
    pub fn append_new_child(&mut self, parent: Index, item: ItemHandle<T>) -> TreeResult<Index> {
        self.node(parent)?;
        let child = self.create_with_item(item);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Creates an empty structural node as the last child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn append_empty_child(&mut self, parent: Index) -> TreeResult<Index> {
        self.node(parent)?;
        let child = self.create_empty();
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Appends an existing subtree as the last child of `parent`.
    ///
    /// A child that already has a parent is detached from it first, so it is
    /// never listed under two parents. Appending a node below itself or below
    /// one of its descendants fails with [`DomainError::CycleDetected`].
    /// Levels of the whole moved subtree are recomputed.
    #[instrument(level = "debug", skip(self))]
    pub fn append_existing_child(&mut self, parent: Index, child: Index) -> TreeResult<Index> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomainError::CycleDetected {
                node: child,
                parent,
            });
        }
        if self.node(child)?.parent.is_some() {
            self.detach(child)?;
        }
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Removes `node` from its parent's child list, making it a root.
    ///
    /// Detaching a root is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, node: Index) -> TreeResult<()> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        self.node_mut(node)?.parent = None;
        self.refresh_levels(node);
        debug!(?node, ?parent, "detached");
        Ok(())
    }

    fn attach(&mut self, parent: Index, child: Index) -> TreeResult<()> {
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.refresh_levels(child);
        Ok(())
    }

    /// True if `ancestor` is `node` or lies on the path from `node` to its root.
    fn is_ancestor_or_self(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Recomputes levels of `start` and its whole subtree from the parent's level.
    fn refresh_levels(&mut self, start: Index) {
        let base = self
            .arena
            .get(start)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .map_or(0, |p| p.level + 1);

        let mut stack = vec![(start, base)];
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.arena.get_mut(idx) {
                node.level = level;
                stack.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        trace!(?start, base, "levels refreshed");
    }

    pub fn parent(&self, node: Index) -> TreeResult<Option<Index>> {
        Ok(self.node(node)?.parent)
    }

    pub fn children(&self, node: Index) -> TreeResult<&[Index]> {
        Ok(&self.node(node)?.children)
    }

    pub fn has_item(&self, node: Index) -> TreeResult<bool> {
        Ok(self.node(node)?.has_item())
    }

    pub fn item(&self, node: Index) -> TreeResult<Option<&ItemHandle<T>>> {
        Ok(self.node(node)?.item())
    }

    pub fn level(&self, node: Index) -> TreeResult<usize> {
        Ok(self.node(node)?.level)
    }

    pub fn quantity(&self, node: Index) -> TreeResult<f64> {
        Ok(self.node(node)?.quantity)
    }

    /// Sets the position multiplier. Any value is accepted, including zero,
    /// negative numbers and NaN.
    pub fn set_quantity(&mut self, node: Index, quantity: f64) -> TreeResult<()> {
        self.node_mut(node)?.quantity = quantity;
        Ok(())
    }

    /// Binds `item` to `node` (or clears the binding with `None`).
    ///
    /// The new item is acquired before the old one is released, so assigning
    /// the item a node already holds leaves its count unchanged.
    #[instrument(level = "debug", skip(self, item))]
    pub fn assign_item(
        &mut self,
        node: Index,
        item: Option<ItemHandle<T>>,
    ) -> TreeResult<Option<Release>> {
        self.node(node)?;
        if let Some(new) = &item {
            self.store.borrow_mut().acquire(new);
        }
        let previous = std::mem::replace(&mut self.node_mut(node)?.item, item);
        let Some(old) = previous else {
            return Ok(None);
        };
        let (outcome, freed) = self.store.borrow_mut().release_deferred(old);
        drop(freed);
        Ok(Some(outcome))
    }

    /// Tears down the subtree rooted at `node`.
    ///
    /// The node is detached from its parent, then every node of the subtree is
    /// removed children-first and its item released to the store. Payloads
    /// are dropped once the store is no longer borrowed, so their destructors
    /// may use it.
    #[instrument(level = "debug", skip(self))]
    pub fn destroy(&mut self, node: Index) -> TreeResult<Teardown> {
        self.detach(node)?;
        let order: Vec<Index> = self.iter_postorder(node).map(|(idx, _)| idx).collect();

        let mut teardown = Teardown::default();
        let mut freed = Vec::new();
        for idx in order {
            if let Some(removed) = self.arena.remove(idx) {
                if let Some(item) = removed.item {
                    let (outcome, handles) = self.store.borrow_mut().release_deferred(item);
                    if outcome.is_destroyed() {
                        teardown.items_destroyed += 1;
                    }
                    freed.extend(handles);
                }
                teardown.removed.push(idx);
            }
        }
        debug!(
            ?node,
            nodes = teardown.removed.len(),
            items = teardown.items_destroyed,
            "subtree destroyed"
        );
        drop(freed);
        Ok(teardown)
    }

    /// Pre-order walk of the subtree rooted at `root`, children left to right.
    pub fn iter(&self, root: Index) -> TreeIterator<'_, T> {
        TreeIterator::new(self, root)
    }

    /// Post-order walk of the subtree rooted at `root`, children left to right.
    pub fn iter_postorder(&self, root: Index) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, root)
    }

    /// Number of levels in the subtree rooted at `root` (1 for a lone node).
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, root: Index) -> TreeResult<usize> {
        let base = self.node(root)?.level;
        Ok(self
            .iter(root)
            .map(|(_, node)| node.level - base + 1)
            .max()
            .unwrap_or(0))
    }

    /// Nodes without children in the subtree rooted at `root`, left to right.
    pub fn leaf_nodes(&self, root: Index) -> TreeResult<Vec<Index>> {
        self.node(root)?;
        Ok(self
            .iter(root)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect())
    }
}

impl<T> Drop for TreeArena<T> {
    fn drop(&mut self) {
        for root in self.roots() {
            if let Err(e) = self.destroy(root) {
                warn!(?root, error = %e, "teardown on drop failed");
            }
        }
    }
}

impl<T> std::fmt::Debug for TreeArena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeArena")
            .field("nodes", &self.arena.len())
            .field("store_refs", &Rc::strong_count(&self.store))
            .finish()
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, root: Index) -> Self {
        Self {
            arena,
            stack: vec![root],
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>, root: Index) -> Self {
        Self {
            arena,
            stack: vec![(root, false)],
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

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
