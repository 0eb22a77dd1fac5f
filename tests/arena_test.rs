//! Topology tests for TreeArena: levels, parenting, ordering, teardown.

use std::cell::Cell;
use std::rc::Rc;

use generational_arena::Index;
use rstest::{fixture, rstest};

use bomtree::domain::{
    DomainError, ItemHandle, Release, SharedItemStore, SharedStore, TreeArena, DEFAULT_QUANTITY,
};
use bomtree::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

type Arena = TreeArena<&'static str>;

#[fixture]
fn store() -> SharedStore<&'static str> {
    SharedItemStore::shared()
}

/// Every node's level equals its parent's level plus one, roots are 0.
fn assert_levels_consistent<T>(tree: &TreeArena<T>) {
    for root in tree.roots() {
        for (idx, node) in tree.iter(root) {
            let expected = match node.parent() {
                Some(p) => tree.level(p).unwrap() + 1,
                None => 0,
            };
            assert_eq!(node.level(), expected, "level mismatch at {:?}", idx);
        }
    }
}

fn chain(tree: &mut Arena, len: usize) -> Vec<Index> {
    let mut nodes = vec![tree.create_empty()];
    for _ in 1..len {
        let last = *nodes.last().unwrap();
        nodes.push(tree.append_empty_child(last).unwrap());
    }
    nodes
}

// ============================================================
// Level invariant
// ============================================================

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn given_chain_when_built_then_level_equals_position(
    store: SharedStore<&'static str>,
    #[case] len: usize,
) {
    let mut tree = TreeArena::new(store);
    let nodes = chain(&mut tree, len);
    for (depth, idx) in nodes.iter().enumerate() {
        assert_eq!(tree.level(*idx).unwrap(), depth);
    }
    assert_eq!(tree.depth(nodes[0]).unwrap(), len);
}

#[rstest]
fn given_subtree_when_appended_deeper_then_whole_subtree_relevelled(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let sub = chain(&mut tree, 3);
    let host = chain(&mut tree, 4);

    tree.append_existing_child(host[3], sub[0]).unwrap();

    assert_eq!(tree.level(sub[0]).unwrap(), 4);
    assert_eq!(tree.level(sub[1]).unwrap(), 5);
    assert_eq!(tree.level(sub[2]).unwrap(), 6);
    assert_levels_consistent(&tree);
}

#[rstest]
fn given_nested_node_when_detached_then_becomes_root_with_level_zero(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let nodes = chain(&mut tree, 4);

    tree.detach(nodes[2]).unwrap();

    assert_eq!(tree.parent(nodes[2]).unwrap(), None);
    assert_eq!(tree.level(nodes[2]).unwrap(), 0);
    assert_eq!(tree.level(nodes[3]).unwrap(), 1);
    assert!(tree.children(nodes[1]).unwrap().is_empty());
    assert_eq!(tree.roots().len(), 2);
    assert_levels_consistent(&tree);
}

#[rstest]
fn given_root_when_detached_then_nothing_changes(store: SharedStore<&'static str>) {
    let mut tree = TreeArena::new(store);
    let nodes = chain(&mut tree, 2);
    tree.detach(nodes[0]).unwrap();
    assert_eq!(tree.children(nodes[0]).unwrap(), &[nodes[1]]);
}

// ============================================================
// Single parent and cycles
// ============================================================

#[rstest]
fn given_parented_node_when_appended_elsewhere_then_leaves_former_parent(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let first = tree.create_empty();
    let second = tree.create_empty();
    let moved = tree.append_new_child(first, ItemHandle::new("part")).unwrap();
    let stays = tree.append_empty_child(first).unwrap();

    tree.append_existing_child(second, moved).unwrap();

    assert_eq!(tree.children(first).unwrap(), &[stays]);
    assert_eq!(tree.children(second).unwrap(), &[moved]);
    assert_eq!(tree.parent(moved).unwrap(), Some(second));
}

#[rstest]
fn given_child_when_appended_to_same_parent_then_moves_to_end(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let root = tree.create_empty();
    let a = tree.append_empty_child(root).unwrap();
    let b = tree.append_empty_child(root).unwrap();

    tree.append_existing_child(root, a).unwrap();

    assert_eq!(tree.children(root).unwrap(), &[b, a]);
}

#[rstest]
fn given_ancestor_when_appended_below_descendant_then_rejected(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let nodes = chain(&mut tree, 3);

    let result = tree.append_existing_child(nodes[2], nodes[0]);

    assert_eq!(
        result,
        Err(DomainError::CycleDetected {
            node: nodes[0],
            parent: nodes[2]
        })
    );
    assert_eq!(tree.parent(nodes[0]).unwrap(), None);
    assert_levels_consistent(&tree);
}

#[rstest]
fn given_removed_node_when_used_then_not_found(store: SharedStore<&'static str>) {
    let mut tree = TreeArena::new(store);
    let root = tree.create_empty();
    let gone = tree.create_empty();
    tree.destroy(gone).unwrap();

    assert_eq!(
        tree.append_existing_child(root, gone),
        Err(DomainError::NodeNotFound(gone))
    );
    assert_eq!(
        tree.append_new_child(gone, ItemHandle::new("part")),
        Err(DomainError::NodeNotFound(gone))
    );
    assert!(tree.children(root).unwrap().is_empty());
}

// ============================================================
// Ordering
// ============================================================

#[rstest]
fn given_children_appended_in_order_when_enumerated_then_order_preserved(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let root = tree.create_empty();
    let c1 = tree.append_new_child(root, ItemHandle::new("c1")).unwrap();
    let c2 = tree.append_new_child(root, ItemHandle::new("c2")).unwrap();
    let c3 = tree.append_new_child(root, ItemHandle::new("c3")).unwrap();

    assert_eq!(tree.children(root).unwrap(), &[c1, c2, c3]);
    let names: Vec<_> = tree
        .iter(root)
        .filter_map(|(_, n)| n.item().map(|i| **i))
        .collect();
    assert_eq!(names, vec!["c1", "c2", "c3"]);
    assert_eq!(tree.leaf_nodes(root).unwrap(), vec![c1, c2, c3]);
}

#[rstest]
fn given_tree_when_destroyed_then_children_removed_before_parent(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store);
    let root = tree.create_empty();
    let a = tree.append_empty_child(root).unwrap();
    let a1 = tree.append_empty_child(a).unwrap();
    let b = tree.append_empty_child(root).unwrap();

    let teardown = tree.destroy(root).unwrap();

    assert_eq!(teardown.removed, vec![a1, a, b, root]);
    assert!(tree.is_empty());
}

#[rstest]
fn given_inner_node_when_destroyed_then_parent_forgets_it(store: SharedStore<&'static str>) {
    let mut tree = TreeArena::new(store.clone());
    let root = tree.create_empty();
    let keep = tree.append_new_child(root, ItemHandle::new("keep")).unwrap();
    let gone = tree.append_new_child(root, ItemHandle::new("gone")).unwrap();

    let teardown = tree.destroy(gone).unwrap();

    assert_eq!(teardown.items_destroyed, 1);
    assert_eq!(tree.children(root).unwrap(), &[keep]);
    assert_eq!(store.borrow().len(), 1);
}

// ============================================================
// Items and quantity
// ============================================================

#[rstest]
#[case(0.0)]
#[case(-3.5)]
#[case(1e9)]
fn given_any_quantity_when_set_then_accepted(
    store: SharedStore<&'static str>,
    #[case] quantity: f64,
) {
    let mut tree = TreeArena::new(store);
    let node = tree.create_empty();
    assert_eq!(tree.quantity(node).unwrap(), DEFAULT_QUANTITY);
    tree.set_quantity(node, quantity).unwrap();
    assert_eq!(tree.quantity(node).unwrap(), quantity);
}

#[rstest]
fn given_bound_node_when_item_reassigned_then_counts_move(store: SharedStore<&'static str>) {
    let mut tree = TreeArena::new(store.clone());
    let old = ItemHandle::new("old");
    let new = ItemHandle::new("new");
    let node = tree.create_with_item(old.clone());

    let released = tree.assign_item(node, Some(new.clone())).unwrap();

    assert_eq!(released, Some(Release::Destroyed));
    assert!(!store.borrow().contains(&old.id()));
    assert_eq!(store.borrow().count(&new.id()), Some(1));
    assert!(tree.item(node).unwrap().unwrap().ptr_eq(&new));
}

#[rstest]
fn given_bound_node_when_same_item_reassigned_then_count_unchanged(
    store: SharedStore<&'static str>,
) {
    let mut tree = TreeArena::new(store.clone());
    let item = ItemHandle::new("part");
    let node = tree.create_with_item(item.clone());

    let released = tree.assign_item(node, Some(item.clone())).unwrap();

    assert_eq!(released, Some(Release::Retained { remaining: 1 }));
    assert_eq!(store.borrow().count(&item.id()), Some(1));
}

#[rstest]
fn given_bound_node_when_item_cleared_then_node_is_empty(store: SharedStore<&'static str>) {
    let mut tree = TreeArena::new(store.clone());
    let node = tree.create_with_item(ItemHandle::new("part"));

    tree.assign_item(node, None).unwrap();

    assert!(!tree.has_item(node).unwrap());
    assert!(store.borrow().is_empty());
    assert_eq!(tree.assign_item(node, None).unwrap(), None);
}

// ============================================================
// Ownership
// ============================================================

struct DropCounter(Rc<Cell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn given_arena_when_dropped_then_all_items_released() {
    let drops = Rc::new(Cell::new(0));
    let store = SharedItemStore::shared();
    {
        let mut tree = TreeArena::new(store.clone());
        let root = tree.create_with_item(ItemHandle::new(DropCounter(drops.clone())));
        tree.append_new_child(root, ItemHandle::new(DropCounter(drops.clone())))
            .unwrap();
        let loose = tree.create_with_item(ItemHandle::new(DropCounter(drops.clone())));
        tree.append_empty_child(loose).unwrap();
        assert_eq!(store.borrow().len(), 3);
    }
    assert!(store.borrow().is_empty());
    assert_eq!(drops.get(), 3);
}

#[test]
fn given_store_shared_by_two_arenas_when_one_dropped_then_item_survives() {
    let drops = Rc::new(Cell::new(0));
    let store = SharedItemStore::shared();
    let part = ItemHandle::new(DropCounter(drops.clone()));
    let id = part.id();

    let mut left = TreeArena::new(store.clone());
    let mut right = TreeArena::new(store.clone());
    left.create_with_item(part.clone());
    right.create_with_item(part);
    assert_eq!(store.borrow().count(&id), Some(2));

    drop(left);
    assert_eq!(store.borrow().count(&id), Some(1));
    assert_eq!(drops.get(), 0);

    drop(right);
    assert!(store.borrow().is_empty());
    assert_eq!(drops.get(), 1);
}
