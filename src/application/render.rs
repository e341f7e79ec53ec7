//! Element materialization shared by the live render and the template render.
//!
//! Every node element carries a fixed set of class markers; `node_shape`
//! computes them once so both render paths produce identical structure.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::{SelectionState, TreeArena, TreeNode};
use crate::infrastructure::traits::{ElementId, ElementKind, UiSurface};

pub const ROOT_NODE: &str = "stv-root-node";
pub const CHILD_NODE: &str = "stv-child-node";
pub const NODE: &str = "stv-node";
pub const UNSELECTED: &str = "stv-unselected";
pub const PARTIALLY_SELECTED: &str = "stv-partially-selected";
pub const SELECTED: &str = "stv-selected";
pub const COLLAPSED: &str = "stv-collapsed";
pub const EXPANDED: &str = "stv-expanded";
pub const PARENT: &str = "stv-parent";
pub const LEAF: &str = "stv-leaf";
pub const EXPANDER: &str = "stv-expander";
pub const CHECKBOX: &str = "stv-checkbox";
pub const LABEL: &str = "stv-label";
pub const CHILD_LIST: &str = "stv-child-list";

pub const FILTERING: &str = "stv-filtering";
pub const FILTER_MATCH: &str = "stv-filter-match";
pub const FILTER_DESCENDANT_MATCH: &str = "stv-filter-descendant-match";
pub const FILTER_CONTROLS: &str = "stv-filter-controls";
pub const FILTER_INPUT: &str = "stv-filter-input";
pub const MATCH_COUNT: &str = "stv-match-count";
pub const SELECT_MATCHING: &str = "stv-select-matching";

pub const DATA_NODE_ID: &str = "data-node-id";
pub const DATA_VALUE: &str = "data-value";

pub fn selection_marker(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Unselected => UNSELECTED,
        SelectionState::Partial => PARTIALLY_SELECTED,
        SelectionState::Selected => SELECTED,
    }
}

/// Text of the match counter for `count` matches of `term`.
pub fn match_count_text(term: &str, count: usize) -> String {
    match (term.is_empty(), count) {
        (true, _) => "(no search term)".to_string(),
        (false, 1) => "1 match".to_string(),
        (false, n) => format!("{n} matches"),
    }
}

/// Element kind, classes and attributes of one node element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub kind: ElementKind,
    pub classes: Vec<&'static str>,
    pub attributes: Vec<(&'static str, String)>,
    pub is_branch: bool,
}

/// `expanded` only matters for branches: whether their children get elements.
pub fn node_shape(node: &TreeNode, expanded: bool) -> NodeShape {
    let (kind, kind_class) = if node.is_root() {
        (ElementKind::Container, ROOT_NODE)
    } else {
        (ElementKind::ListItem, CHILD_NODE)
    };
    let is_branch = !node.is_leaf();
    let mut classes = vec![kind_class, NODE];
    if is_branch {
        classes.push(PARENT);
        classes.push(if expanded { EXPANDED } else { COLLAPSED });
    } else {
        classes.push(LEAF);
    }
    classes.push(selection_marker(node.state));

    NodeShape {
        kind,
        classes,
        attributes: vec![
            (DATA_NODE_ID, node.id.to_string()),
            (DATA_VALUE, node.value.clone()),
        ],
        is_branch,
    }
}

/// Generations below a node that still get elements, one level down.
pub(crate) fn next_generation(remaining: Option<usize>) -> Option<usize> {
    remaining.map(|n| n.saturating_sub(1))
}

/// Whether a branch with `remaining` generations left renders its children.
pub(crate) fn renders_children(remaining: Option<usize>) -> bool {
    remaining != Some(0)
}

/// Elements created for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeElements {
    pub element: ElementId,
    pub expander: ElementId,
    pub checkbox: ElementId,
    pub label: ElementId,
    /// Present for branches only
    pub child_list: Option<ElementId>,
    /// Children have been materialized at least once
    pub children_rendered: bool,
}

pub(crate) type ElementMap = HashMap<Index, NodeElements>;

/// Creates node elements on a surface and records them in the element map.
pub(crate) struct Materializer<'a, S: UiSurface> {
    pub surface: &'a mut S,
    pub tree: &'a TreeArena,
    pub elements: &'a mut ElementMap,
    pub html_labels: bool,
}

impl<S: UiSurface> Materializer<'_, S> {
    /// Create the element of `idx` and of its descendants for `remaining`
    /// further generations (`None` = all).
    #[instrument(level = "trace", skip(self))]
    pub fn create(&mut self, idx: Index, remaining: Option<usize>) -> Option<ElementId> {
        let tree = self.tree;
        let node = tree.get_node(idx)?;
        let expanded = renders_children(remaining);
        let shape = node_shape(node, expanded);

        let element = self.surface.create_element(shape.kind);
        for class in &shape.classes {
            self.surface.add_class(element, class);
        }
        for (name, value) in &shape.attributes {
            self.surface.set_attribute(element, name, value);
        }

        let expander = self.part(element, ElementKind::Span, EXPANDER);
        let checkbox = self.part(element, ElementKind::Span, CHECKBOX);
        let label = self.part(element, ElementKind::Label, LABEL);
        if self.html_labels {
            self.surface.set_markup(label, &node.label);
        } else {
            self.surface.set_text(label, &node.label);
        }
        let child_list = shape
            .is_branch
            .then(|| self.part(element, ElementKind::List, CHILD_LIST));

        self.elements.insert(
            idx,
            NodeElements {
                element,
                expander,
                checkbox,
                label,
                child_list,
                children_rendered: false,
            },
        );

        if shape.is_branch && expanded {
            self.create_children(idx, next_generation(remaining));
        }
        Some(element)
    }

    /// Materialize the direct children of `idx` (plus `remaining` generations
    /// below them) into its child list. No-op once done.
    pub fn create_children(&mut self, idx: Index, remaining: Option<usize>) {
        let Some(list) = self.elements.get(&idx).and_then(|e| e.child_list) else {
            return;
        };
        if self.elements.get(&idx).is_some_and(|e| e.children_rendered) {
            return;
        }
        if let Some(entry) = self.elements.get_mut(&idx) {
            entry.children_rendered = true;
        }
        let tree = self.tree;
        for &child in tree.children_of(idx) {
            if let Some(child_el) = self.create(child, remaining) {
                self.surface.append_child(list, child_el);
            }
        }
        trace!(children = tree.children_of(idx).len(), "children materialized");
    }

    fn part(&mut self, parent: ElementId, kind: ElementKind, class: &str) -> ElementId {
        let part = self.surface.create_element(kind);
        self.surface.add_class(part, class);
        self.surface.append_child(parent, part);
        part
    }
}

/// Replace the selection marker of an element with the one for `state`.
pub(crate) fn redraw_selection<S: UiSurface>(
    surface: &mut S,
    element: ElementId,
    state: SelectionState,
) {
    for marker in [UNSELECTED, PARTIALLY_SELECTED, SELECTED] {
        surface.remove_class(element, marker);
    }
    surface.add_class(element, selection_marker(state));
}

/// Set the expansion marker of a branch element.
pub(crate) fn redraw_expansion<S: UiSurface>(surface: &mut S, element: ElementId, expanded: bool) {
    surface.set_class(element, COLLAPSED, !expanded);
    surface.set_class(element, EXPANDED, expanded);
}
