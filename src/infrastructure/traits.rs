//! UI and time boundary traits
//!
//! The render controller never talks to a concrete toolkit. It drives a
//! DOM-like element tree through [`UiSurface`] and reads time through
//! [`Clock`], so views can be tested against in-memory implementations.

use std::fmt;
use std::time::Instant;

/// Opaque handle to an element owned by a [`UiSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    slot: usize,
    generation: u64,
}

impl ElementId {
    pub fn from_raw_parts(slot: usize, generation: u64) -> Self {
        Self { slot, generation }
    }

    pub fn into_raw_parts(self) -> (usize, u64) {
        (self.slot, self.generation)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}.{}", self.slot, self.generation)
    }
}

/// Element types the tree view creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Block container (`div`); valid render target
    Container,
    /// Detached fragment; valid render target
    Fragment,
    List,
    ListItem,
    Span,
    Label,
    Input,
    Button,
}

impl ElementKind {
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Container => "div",
            ElementKind::Fragment => "#fragment",
            ElementKind::List => "ul",
            ElementKind::ListItem => "li",
            ElementKind::Span => "span",
            ElementKind::Label => "label",
            ElementKind::Input => "input",
            ElementKind::Button => "button",
        }
    }

    /// Whether a tree may be rendered into an element of this kind.
    pub fn is_render_target(self) -> bool {
        matches!(self, ElementKind::Container | ElementKind::Fragment)
    }
}

/// DOM-like element tree abstraction.
///
/// Operations on handles that do not belong to the surface are ignored
/// (mutations) or report absence (queries).
pub trait UiSurface {
    /// Create a detached element.
    fn create_element(&mut self, kind: ElementKind) -> ElementId;

    /// Whether the handle refers to a live element.
    fn contains(&self, el: ElementId) -> bool;

    fn kind(&self, el: ElementId) -> Option<ElementKind>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    /// Class markers in insertion order.
    fn classes(&self, el: ElementId) -> Vec<String>;

    /// Append `child` as last child of `parent`, detaching it from any previous parent.
    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Detach and destroy `el` with its whole subtree.
    fn remove(&mut self, el: ElementId);

    fn children(&self, el: ElementId) -> Vec<ElementId>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Replace content with escaped text.
    fn set_text(&mut self, el: ElementId, text: &str);

    /// Replace content with raw markup.
    fn set_markup(&mut self, el: ElementId, markup: &str);

    /// Text or markup content of the element itself.
    fn text(&self, el: ElementId) -> Option<String>;

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order.
    fn query_by_class(&self, root: ElementId, class: &str) -> Vec<ElementId>;

    /// Add or remove `class` depending on `on`.
    fn set_class(&mut self, el: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
    }

    /// Nearest inclusive ancestor of `el` carrying `class`, not searching above `stop`.
    fn closest_with_class(
        &self,
        el: ElementId,
        class: &str,
        stop: Option<ElementId>,
    ) -> Option<ElementId> {
        let mut current = Some(el);
        while let Some(candidate) = current {
            if self.has_class(candidate, class) {
                return Some(candidate);
            }
            if Some(candidate) == stop {
                return None;
            }
            current = self.parent(candidate);
        }
        None
    }
}

/// Time source for debouncing.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
