//! Selection propagation engine.
//!
//! `select`/`deselect` run one transaction: cascade the new state down the
//! whole subtree, then recompute every ancestor from its immediate children.
//! Cost is O(subtree + depth); the rest of the tree is never visited.
//!
//! Each operation returns the indices it touched (target, descendants,
//! ancestors in that order) so a view can redraw exactly those nodes.

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::TreeArena;
use crate::domain::node::SelectionState;

#[instrument(level = "debug", skip(tree))]
pub fn select(tree: &mut TreeArena, idx: Index) -> Vec<Index> {
    set_state(tree, idx, SelectionState::Selected)
}

#[instrument(level = "debug", skip(tree))]
pub fn deselect(tree: &mut TreeArena, idx: Index) -> Vec<Index> {
    set_state(tree, idx, SelectionState::Unselected)
}

/// Checkbox semantics: a Selected node is deselected, anything else selected.
pub fn toggle(tree: &mut TreeArena, idx: Index) -> Vec<Index> {
    match tree.get_node(idx).map(|n| n.state) {
        Some(SelectionState::Selected) => deselect(tree, idx),
        Some(_) => select(tree, idx),
        None => Vec::new(),
    }
}

fn set_state(tree: &mut TreeArena, idx: Index, state: SelectionState) -> Vec<Index> {
    let mut touched = Vec::new();
    cascade(tree, idx, state, &mut touched);
    recompute_ancestors(tree, idx, &mut touched);
    touched
}

/// Force `state` onto `idx` and every descendant, overwriting Partial.
fn cascade(tree: &mut TreeArena, idx: Index, state: SelectionState, touched: &mut Vec<Index>) {
    let mut stack = vec![idx];
    while let Some(current) = stack.pop() {
        if let Some(node) = tree.get_node_mut(current) {
            node.state = state;
            touched.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
    }
}

/// Walk from the parent of `idx` to the root, deriving each state from the
/// immediate children. The root (no parent) terminates the walk.
fn recompute_ancestors(tree: &mut TreeArena, idx: Index, touched: &mut Vec<Index>) {
    let mut current = tree.parent_of(idx);
    while let Some(parent) = current {
        let aggregate = SelectionState::aggregate(
            tree.children_of(parent)
                .iter()
                .filter_map(|&c| tree.get_node(c))
                .map(|c| c.state),
        );
        if let Some(node) = tree.get_node_mut(parent) {
            trace!(value = %node.value, ?aggregate, "recomputed");
            node.state = aggregate;
        }
        touched.push(parent);
        current = tree.parent_of(parent);
    }
}

/// Maximal fully-selected subtrees in display order.
///
/// A Selected node is reported without descending into it; a Partial node
/// is descended into; Unselected subtrees are skipped.
pub fn selected_nodes(tree: &TreeArena) -> Vec<Index> {
    let mut selection = Vec::new();
    let Some(root) = tree.root() else {
        return selection;
    };
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        let Some(node) = tree.get_node(current) else {
            continue;
        };
        match node.state {
            SelectionState::Selected => selection.push(current),
            SelectionState::Partial => stack.extend(node.children.iter().rev().copied()),
            SelectionState::Unselected => {}
        }
    }
    selection
}

/// True when every branch holds the state aggregated from its children.
pub fn is_consistent(tree: &TreeArena) -> bool {
    tree.iter().filter(|(_, node)| !node.is_leaf()).all(|(idx, node)| {
        let expected = SelectionState::aggregate(
            tree.children_of(idx)
                .iter()
                .filter_map(|&c| tree.get_node(c))
                .map(|c| c.state),
        );
        node.state == expected
    })
}
