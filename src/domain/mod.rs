//! Domain layer: tree data model and selection propagation
//!
//! This layer is independent of external concerns (no rendering, no I/O, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod node;
pub mod search;
pub mod selection;

pub use arena::{TreeArena, TreeIterator};
pub use builder::TreeBuilder;
pub use error::{DomainError, DomainResult};
pub use node::{IdGenerator, NodeId, NodeSnapshot, NodeSpec, RawNode, SelectionState, TreeNode};
