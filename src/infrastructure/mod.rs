//! Infrastructure layer: boundary implementations, data loading and DI container
//!
//! This layer implements the UI/time boundary traits and wires up views.

pub mod di;
pub mod dom;
pub mod error;
pub mod loader;
pub mod traits;

pub use dom::MemoryDom;
pub use error::{InfraError, InfraResult};
