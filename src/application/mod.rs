//! Application layer: tree view, rendering and filtering
//!
//! This layer orchestrates domain logic and depends on UI/time boundary traits.

pub mod debounce;
pub mod error;
pub mod error_ext;
pub mod markup;
pub mod options;
pub mod render;
pub mod view;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use markup::{HtmlTemplate, Template};
pub use options::{FilterDelay, RenderDepth, SelectionArg, ViewOptions};
pub use view::{EventOutcome, TreeView, UiEvent};
