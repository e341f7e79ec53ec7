//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::collections::HashSet;

use colored::Colorize;
use termtree::Tree;

use crate::application::TreeView;
use crate::domain::{NodeId, SelectionState, TreeNode};
use crate::infrastructure::traits::UiSurface;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Checkbox glyph colored by state.
pub fn glyph(state: SelectionState) -> String {
    let glyph = state.glyph();
    match state {
        SelectionState::Selected => glyph.green().to_string(),
        SelectionState::Partial => glyph.yellow().to_string(),
        SelectionState::Unselected => glyph.to_string(),
    }
}

/// One-line description of a node: glyph, label and value when it differs.
pub fn node_line(node: &TreeNode) -> String {
    if node.label == node.value {
        format!("{} {}", glyph(node.state), node.label)
    } else {
        format!(
            "{} {} {}",
            glyph(node.state),
            node.label,
            format!("({})", node.value).dimmed()
        )
    }
}

/// Tree of the nodes that are materialized and visible (inside expanded branches).
///
/// Collapsed branches get `+`, expanded ones `-`, filter matches are bold.
pub fn visible_tree<S: UiSurface>(view: &TreeView<S>) -> Option<Tree<String>> {
    let root = view.tree().root_node()?;
    let matches: HashSet<NodeId> = view.get_matching().into_iter().map(|n| n.id).collect();
    Some(visible_subtree(view, root, &matches))
}

fn visible_subtree<S: UiSurface>(
    view: &TreeView<S>,
    node: &TreeNode,
    matches: &HashSet<NodeId>,
) -> Tree<String> {
    let expanded = view.is_expanded(node.id);
    let marker = match expanded {
        Some(true) => "-",
        Some(false) => "+",
        None => " ",
    };
    let mut line = format!("{marker} {}", node_line(node));
    if matches.contains(&node.id) {
        line = line.bold().to_string();
    }

    let leaves: Vec<Tree<String>> = if expanded == Some(true) {
        node.children
            .iter()
            .filter_map(|&idx| view.tree().get_node(idx))
            .filter(|child| view.is_rendered(child.id))
            .map(|child| visible_subtree(view, child, matches))
            .collect()
    } else {
        Vec::new()
    };
    Tree::new(line).with_leaves(leaves)
}
