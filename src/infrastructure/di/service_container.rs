//! Service container for dependency injection
//!
//! Wires tree views up with settings and boundary implementations.

use std::sync::Arc;

use crate::application::{ApplicationResult, TreeView};
use crate::config::Settings;
use crate::infrastructure::dom::MemoryDom;
use crate::infrastructure::traits::{Clock, ElementKind, SystemClock, UiSurface};

/// Container holding shared settings and boundary implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Time source for debounced filtering
    pub clock: Arc<dyn Clock>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(SystemClock))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, clock }
    }

    /// A view on a fresh [`MemoryDom`] with an attached container element.
    pub fn new_view(&self) -> ApplicationResult<TreeView<MemoryDom>> {
        let mut view = TreeView::with_clock(
            MemoryDom::new(),
            self.settings.view_options(),
            Arc::clone(&self.clock),
        );
        let container = view.surface_mut().create_element(ElementKind::Container);
        view.set_element(container)?;
        Ok(view)
    }
}
