//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent tree data violations.
/// These are independent of rendering and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("tree has no data")]
    NoData,

    #[error("tree node at {} has neither label nor value", format_path(.path))]
    MissingLabelAndValue { path: Vec<usize> },

    #[error("{} is not a valid node location", format_path(.path))]
    NodeLocation { path: Vec<usize> },

    #[error("id {0} already exists in tree")]
    DuplicateId(NodeId),
}

/// Render a child-index path the way it is typed on the command line.
pub fn format_path(path: &[usize]) -> String {
    if path.is_empty() {
        return "[]".to_string();
    }
    let parts: Vec<String> = path.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(" "))
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
