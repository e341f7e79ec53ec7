//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, NodeId};

/// Application errors wrap domain errors and add view-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),

    #[error("stale element: {0}")]
    StaleElement(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
