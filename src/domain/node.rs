//! Node entities: identifiers, tri-state selection, raw input and snapshots

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Prefix of the textual form of a [`NodeId`], e.g. `stv-12`.
pub const NODE_ID_PREFIX: &str = "stv-";

/// Tri-state checkbox selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    #[default]
    Unselected,
    Partial,
    Selected,
}

impl SelectionState {
    /// Aggregate state of a parent, derived from its immediate children.
    ///
    /// All Selected gives Selected, all Unselected gives Unselected,
    /// anything else is Partial.
    pub fn aggregate<I>(children: I) -> Self
    where
        I: IntoIterator<Item = SelectionState>,
    {
        let mut all_selected = true;
        let mut all_unselected = true;
        for state in children {
            all_selected &= state == SelectionState::Selected;
            all_unselected &= state == SelectionState::Unselected;
        }
        if all_selected {
            SelectionState::Selected
        } else if all_unselected {
            SelectionState::Unselected
        } else {
            SelectionState::Partial
        }
    }

    /// Checkbox glyph used for terminal output.
    pub fn glyph(self) -> &'static str {
        match self {
            SelectionState::Unselected => "[ ]",
            SelectionState::Partial => "[-]",
            SelectionState::Selected => "[x]",
        }
    }
}

/// Identifier of a node, unique within its tree for the tree's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, self.0)
    }
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(NODE_ID_PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(NodeId)
            .ok_or_else(|| format!("not a node id: {s}"))
    }
}

/// Monotonic id source owned by a single tree.
///
/// Never reset while the tree lives, so ids handed out for replaced data
/// never resolve to nodes of the current data.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Nested input as supplied by callers (e.g. parsed from JSON).
///
/// `label` and `value` are both optional here; [`NodeSpec::normalize`]
/// turns them into a fully specified pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with a value only; the label is defaulted from it.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Node with a label only; the value is defaulted from it.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = RawNode>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Normalized label/value pair of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub label: String,
    pub value: String,
}

impl NodeSpec {
    /// Fill in whichever of label/value is missing from the other.
    ///
    /// The root may omit both; any other node without either fails with
    /// [`DomainError::MissingLabelAndValue`] carrying its location.
    pub fn normalize(raw: &RawNode, path: &[usize]) -> DomainResult<Self> {
        let is_root = path.is_empty();
        match (&raw.label, &raw.value) {
            (Some(label), Some(value)) => Ok(Self {
                label: label.clone(),
                value: value.clone(),
            }),
            (Some(label), None) => Ok(Self {
                label: label.clone(),
                value: label.clone(),
            }),
            (None, Some(value)) => Ok(Self {
                label: value.clone(),
                value: value.clone(),
            }),
            (None, None) if is_root => Ok(Self {
                label: String::new(),
                value: String::new(),
            }),
            (None, None) => Err(DomainError::MissingLabelAndValue {
                path: path.to_vec(),
            }),
        }
    }
}

/// Tree node in the arena-based hierarchy.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    /// Display text
    pub label: String,
    /// Identity and search key
    pub value: String,
    pub state: SelectionState,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in display order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn new(id: NodeId, spec: NodeSpec, parent: Option<Index>) -> Self {
        Self {
            id,
            label: spec.label,
            value: spec.value,
            state: SelectionState::Unselected,
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Case-insensitive substring match against label, then value.
    ///
    /// `lower_term` must already be lowercase.
    pub fn label_or_value_matches(&self, lower_term: &str) -> bool {
        self.label.to_lowercase().contains(lower_term)
            || self.value.to_lowercase().contains(lower_term)
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Detached deep copy of a subtree, without back references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub label: String,
    pub value: String,
    pub state: SelectionState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}
