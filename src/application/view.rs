//! Tree view: data model plus incremental rendering onto a UI surface.
//!
//! Elements are materialized up to a requested depth; branches beyond it get
//! their children the first time they are expanded. Clicks arrive through a
//! single delegated entry point, [`TreeView::handle_event`].

use std::sync::Arc;
use std::time::Instant;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::application::debounce::Debouncer;
use crate::application::markup::{MarkupWriter, Template};
use crate::application::options::{RenderDepth, SelectionArg, ViewOptions};
use crate::application::render::{self, ElementMap, Materializer, NodeElements};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    search, selection, DomainError, NodeId, NodeSnapshot, RawNode, SelectionState, TreeArena,
    TreeNode,
};
use crate::infrastructure::traits::{Clock, ElementId, ElementKind, SystemClock, UiSurface};

/// Interaction delivered to the view's container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click { target: ElementId },
    FilterInput { term: String },
}

/// What [`TreeView::handle_event`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Toggled { id: NodeId, state: SelectionState },
    Expansion { id: NodeId, expanded: bool },
    FilterScheduled,
    FilterApplied { matches: usize },
    MatchesSelected { count: usize },
    Ignored,
}

/// Elements of the filter box.
#[derive(Debug, Clone, Copy)]
struct FilterControls {
    root: ElementId,
    input: ElementId,
    match_count: ElementId,
    select_matching: ElementId,
}

/// Hierarchical checkbox tree bound to a [`UiSurface`].
pub struct TreeView<S: UiSurface> {
    tree: TreeArena,
    options: ViewOptions,
    surface: S,
    container: Option<ElementId>,
    root_element: Option<ElementId>,
    elements: ElementMap,
    filter_controls: Option<FilterControls>,
    matching: Vec<Index>,
    filter_term: String,
    debouncer: Debouncer,
    clock: Arc<dyn Clock>,
}

impl<S: UiSurface> TreeView<S> {
    pub fn new(surface: S, options: ViewOptions) -> Self {
        Self::with_clock(surface, options, Arc::new(SystemClock))
    }

    pub fn with_clock(surface: S, options: ViewOptions, clock: Arc<dyn Clock>) -> Self {
        let debouncer = Debouncer::new(options.filter_delay);
        Self {
            tree: TreeArena::new(),
            options,
            surface,
            container: None,
            root_element: None,
            elements: ElementMap::new(),
            filter_controls: None,
            matching: Vec::new(),
            filter_term: String::new(),
            debouncer,
            clock,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    pub fn filter_input(&self) -> Option<ElementId> {
        self.filter_controls.map(|c| c.input)
    }

    pub fn match_count_element(&self) -> Option<ElementId> {
        self.filter_controls.map(|c| c.match_count)
    }

    pub fn select_matching_button(&self) -> Option<ElementId> {
        self.filter_controls.map(|c| c.select_matching)
    }

    /// Element of the root node, once rendered.
    pub fn root_element(&self) -> Option<ElementId> {
        self.root_element
    }

    // ============================================================
    // DATA MODEL
    // ============================================================

    /// Replace the tree data. Materialized elements, matches and any pending
    /// filter run are discarded; the previous data survives a failure.
    #[instrument(level = "debug", skip_all)]
    pub fn set_data(&mut self, raw: &RawNode) -> ApplicationResult<()> {
        self.tree.set_data(raw)?;
        self.clear_visual_state();
        Ok(())
    }

    pub fn node_at(&self, path: &[usize]) -> ApplicationResult<&TreeNode> {
        Ok(self.tree.node_at(path)?)
    }

    pub fn node_with_value(&self, value: &str) -> ApplicationResult<Option<&TreeNode>> {
        Ok(self.tree.node_with_value(value)?)
    }

    pub fn node_with_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.tree.node_with_id(id)
    }

    pub fn copy_data(&self) -> ApplicationResult<NodeSnapshot> {
        Ok(self.tree.copy_data()?)
    }

    /// Child-index path of the node, inverse of [`Self::node_at`].
    pub fn path_of(&self, id: NodeId) -> ApplicationResult<Vec<usize>> {
        let idx = self.require_index(id)?;
        Ok(self.tree.path_of(idx))
    }

    /// Values of the maximal selected subtrees.
    pub fn get_selection(&self) -> Vec<String> {
        self.get_selected_nodes()
            .into_iter()
            .map(|node| node.value.clone())
            .collect()
    }

    /// Clear the current selection, then select every node named by value.
    /// Values with no node are skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn set_selection<A>(&mut self, selection: A) -> ApplicationResult<()>
    where
        A: Into<SelectionArg> + std::fmt::Debug,
    {
        let selection = selection.into();
        if !self.tree.has_data() {
            return Err(DomainError::NoData.into());
        }

        for idx in selection::selected_nodes(&self.tree) {
            let touched = selection::deselect(&mut self.tree, idx);
            self.redraw_selection(&touched);
        }
        for value in selection.values() {
            match self.tree.index_with_value(value)? {
                Some(idx) => {
                    let touched = selection::select(&mut self.tree, idx);
                    self.redraw_selection(&touched);
                }
                None => warn!(%value, "no node with value, skipped"),
            }
        }
        Ok(())
    }

    pub fn get_selected_nodes(&self) -> Vec<&TreeNode> {
        selection::selected_nodes(&self.tree)
            .into_iter()
            .filter_map(|idx| self.tree.get_node(idx))
            .collect()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: NodeId) -> ApplicationResult<()> {
        let idx = self.require_index(id)?;
        let touched = selection::select(&mut self.tree, idx);
        self.redraw_selection(&touched);
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn deselect(&mut self, id: NodeId) -> ApplicationResult<()> {
        let idx = self.require_index(id)?;
        let touched = selection::deselect(&mut self.tree, idx);
        self.redraw_selection(&touched);
        Ok(())
    }

    /// Checkbox semantics; returns the node's new state.
    pub fn toggle(&mut self, id: NodeId) -> ApplicationResult<SelectionState> {
        let idx = self.require_index(id)?;
        let touched = selection::toggle(&mut self.tree, idx);
        self.redraw_selection(&touched);
        Ok(self.tree.get_node(idx).map(|n| n.state).unwrap_or_default())
    }

    fn require_index(&self, id: NodeId) -> ApplicationResult<Index> {
        self.tree
            .index_of(id)
            .ok_or(ApplicationError::UnknownNode(id))
    }

    // ============================================================
    // RENDERING
    // ============================================================

    /// Attach the container the tree renders into.
    #[instrument(level = "debug", skip(self))]
    pub fn set_element(&mut self, container: ElementId) -> ApplicationResult<()> {
        match self.surface.kind(container) {
            Some(kind) if kind.is_render_target() => {
                self.clear_visual_state();
                self.container = Some(container);
                Ok(())
            }
            Some(kind) => Err(ApplicationError::InvalidArgument(format!(
                "cannot render into a <{}> element",
                kind.tag()
            ))),
            None => Err(ApplicationError::InvalidArgument(format!(
                "{container} is not an element of this surface"
            ))),
        }
    }

    /// Materialize the tree into the container down to `depth`, replacing
    /// anything rendered before.
    #[instrument(level = "debug", skip(self))]
    pub fn render(&mut self, depth: RenderDepth) -> ApplicationResult<ElementId> {
        let container = self
            .container
            .filter(|&c| self.surface.contains(c))
            .ok_or_else(|| {
                ApplicationError::InvalidArgument("no valid container to render into".to_string())
            })?;
        let root = self.tree.root().ok_or(DomainError::NoData)?;

        self.clear_visual_state();

        if self.options.filter {
            let controls = self.create_filter_controls();
            self.surface.append_child(container, controls.root);
            self.filter_controls = Some(controls);
        }

        let root_element = Materializer {
            surface: &mut self.surface,
            tree: &self.tree,
            elements: &mut self.elements,
            html_labels: self.options.html_labels,
        }
        .create(root, depth.generations())
        .ok_or(DomainError::NoData)?;
        self.surface.append_child(container, root_element);
        self.root_element = Some(root_element);

        debug!(elements = self.elements.len(), "rendered");
        Ok(root_element)
    }

    /// Pure markup of the tree down to `depth`; same structure as [`Self::render`]
    /// produces for the root element.
    pub fn render_to_string(
        &self,
        depth: RenderDepth,
        template: &dyn Template,
    ) -> ApplicationResult<String> {
        let root = self.tree.root().ok_or(DomainError::NoData)?;
        let mut out = String::new();
        MarkupWriter {
            tree: &self.tree,
            template,
            html_labels: self.options.html_labels,
        }
        .write(&mut out, root, depth.generations());
        Ok(out)
    }

    /// Whether the node currently has an element.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        self.tree
            .index_of(id)
            .is_some_and(|idx| self.elements.contains_key(&idx))
    }

    /// Elements of a materialized node.
    pub fn elements_of(&self, id: NodeId) -> Option<NodeElements> {
        self.tree
            .index_of(id)
            .and_then(|idx| self.elements.get(&idx).copied())
    }

    /// Number of nodes that currently have elements.
    pub fn rendered_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether the branch is expanded; `None` for leaves and unrendered nodes.
    pub fn is_expanded(&self, id: NodeId) -> Option<bool> {
        let entry = self.elements_of(id)?;
        entry.child_list?;
        Some(self.surface.has_class(entry.element, render::EXPANDED))
    }

    /// Flip the expansion of a branch, materializing its direct children the
    /// first time it opens. Returns the new state; leaves report `false`.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_expansion(&mut self, id: NodeId) -> ApplicationResult<bool> {
        let idx = self.require_index(id)?;
        let expanded = self
            .ensure_elements(idx)?
            .map(|entry| self.surface.has_class(entry.element, render::EXPANDED))
            .unwrap_or(false);
        self.set_expansion(idx, !expanded);
        Ok(!expanded && !self.tree.children_of(idx).is_empty())
    }

    /// Force a branch open along with every ancestor, materializing what is
    /// needed on the way.
    #[instrument(level = "debug", skip(self))]
    pub fn expand(&mut self, id: NodeId) -> ApplicationResult<()> {
        let idx = self.require_index(id)?;
        self.reveal(idx)?;
        self.set_expansion(idx, true);
        Ok(())
    }

    fn set_expansion(&mut self, idx: Index, expanded: bool) {
        let Some(entry) = self.elements.get(&idx).copied() else {
            return;
        };
        if entry.child_list.is_none() {
            return;
        }
        if expanded && !entry.children_rendered {
            Materializer {
                surface: &mut self.surface,
                tree: &self.tree,
                elements: &mut self.elements,
                html_labels: self.options.html_labels,
            }
            .create_children(idx, Some(0));
        }
        render::redraw_expansion(&mut self.surface, entry.element, expanded);
    }

    fn require_rendered(&self) -> ApplicationResult<()> {
        if self.root_element.is_none() {
            return Err(ApplicationError::InvalidArgument(
                "tree has not been rendered".to_string(),
            ));
        }
        Ok(())
    }

    /// Give `idx` an element, expanding its ancestors top down only when it
    /// has none yet. Needs a rendered root.
    fn ensure_elements(&mut self, idx: Index) -> ApplicationResult<Option<NodeElements>> {
        self.require_rendered()?;
        if !self.elements.contains_key(&idx) {
            self.expand_ancestors(idx);
        }
        Ok(self.elements.get(&idx).copied())
    }

    /// Make `idx` visible: every ancestor ends up expanded, including ones
    /// that were rendered and collapsed again. Needs a rendered root.
    fn reveal(&mut self, idx: Index) -> ApplicationResult<Option<NodeElements>> {
        self.require_rendered()?;
        self.expand_ancestors(idx);
        Ok(self.elements.get(&idx).copied())
    }

    fn expand_ancestors(&mut self, idx: Index) {
        for ancestor in self.tree.ancestors(idx).into_iter().rev() {
            self.set_expansion(ancestor, true);
        }
    }

    fn redraw_selection(&mut self, touched: &[Index]) {
        for idx in touched {
            let (Some(entry), Some(node)) = (self.elements.get(idx), self.tree.get_node(*idx)) else {
                continue;
            };
            render::redraw_selection(&mut self.surface, entry.element, node.state);
        }
    }

    fn create_filter_controls(&mut self) -> FilterControls {
        let root = self.surface.create_element(ElementKind::Container);
        self.surface.add_class(root, render::FILTER_CONTROLS);

        let label = self.surface.create_element(ElementKind::Label);
        self.surface.set_text(label, "Search");
        self.surface.append_child(root, label);

        let input = self.surface.create_element(ElementKind::Input);
        self.surface.add_class(input, render::FILTER_INPUT);
        self.surface.append_child(root, input);

        let match_count = self.surface.create_element(ElementKind::Span);
        self.surface.add_class(match_count, render::MATCH_COUNT);
        self.surface
            .set_text(match_count, &render::match_count_text(&self.filter_term, 0));
        self.surface.append_child(root, match_count);

        let select_matching = self.surface.create_element(ElementKind::Button);
        self.surface.add_class(select_matching, render::SELECT_MATCHING);
        self.surface.set_text(select_matching, "Select");
        self.surface.append_child(root, select_matching);

        FilterControls {
            root,
            input,
            match_count,
            select_matching,
        }
    }

    /// Drop all materialized elements and filter state.
    fn clear_visual_state(&mut self) {
        if let Some(root_element) = self.root_element.take() {
            self.surface.remove(root_element);
        }
        if let Some(controls) = self.filter_controls.take() {
            self.surface.remove(controls.root);
        }
        if let Some(container) = self.container {
            self.surface.remove_class(container, render::FILTERING);
        }
        self.elements.clear();
        self.matching.clear();
        self.filter_term.clear();
        self.debouncer.cancel();
    }

    // ============================================================
    // FILTER
    // ============================================================

    /// Mark all nodes matching `term` and reveal them; returns the match count.
    ///
    /// Without a rendered root only the match list is computed.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_filter(&mut self, term: &str) -> ApplicationResult<usize> {
        self.clear_filter_markers();
        self.matching = search::find_matching(&self.tree, term);
        self.filter_term = term.to_string();

        if let Some(container) = self.container {
            self.surface
                .set_class(container, render::FILTERING, !term.is_empty());
        }

        if self.root_element.is_some() {
            for idx in self.matching.clone() {
                if let Some(entry) = self.reveal(idx)? {
                    self.surface.add_class(entry.element, render::FILTER_MATCH);
                }
                for ancestor in self.tree.ancestors(idx) {
                    if let Some(entry) = self.elements.get(&ancestor) {
                        self.surface
                            .add_class(entry.element, render::FILTER_DESCENDANT_MATCH);
                    }
                }
            }
        }

        if let Some(controls) = self.filter_controls {
            let text = render::match_count_text(term, self.matching.len());
            self.surface.set_text(controls.match_count, &text);
        }
        debug!(matches = self.matching.len(), "filter applied");
        Ok(self.matching.len())
    }

    fn clear_filter_markers(&mut self) {
        let Some(root_element) = self.root_element else {
            return;
        };
        for marker in [render::FILTER_MATCH, render::FILTER_DESCENDANT_MATCH] {
            let mut marked = self.surface.query_by_class(root_element, marker);
            if self.surface.has_class(root_element, marker) {
                marked.push(root_element);
            }
            for el in marked {
                self.surface.remove_class(el, marker);
            }
        }
    }

    /// Register filter input. Runs right away with an immediate delay and
    /// returns the match count; otherwise schedules a run and returns `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn on_filter_input(&mut self, term: &str) -> ApplicationResult<Option<usize>> {
        match self.debouncer.schedule(term, self.clock.now()) {
            Some(term) => self.apply_filter(&term).map(Some),
            None => Ok(None),
        }
    }

    /// Run the pending filter if its delay has elapsed.
    pub fn run_pending_filter(&mut self) -> ApplicationResult<Option<usize>> {
        match self.debouncer.take_due(self.clock.now()) {
            Some(term) => self.apply_filter(&term).map(Some),
            None => Ok(None),
        }
    }

    /// Deadline of the pending filter run, if any.
    pub fn pending_filter_due(&self) -> Option<Instant> {
        self.debouncer.due_at()
    }

    /// Select every node of the last computed match list; returns how many.
    #[instrument(level = "debug", skip(self))]
    pub fn select_matching(&mut self) -> usize {
        for idx in self.matching.clone() {
            let touched = selection::select(&mut self.tree, idx);
            self.redraw_selection(&touched);
        }
        self.matching.len()
    }

    pub fn get_matching(&self) -> Vec<&TreeNode> {
        self.matching
            .iter()
            .filter_map(|&idx| self.tree.get_node(idx))
            .collect()
    }

    /// Term of the last filter run.
    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    // ============================================================
    // EVENTS
    // ============================================================

    /// Delegated entry point for everything happening inside the container.
    #[instrument(level = "debug", skip(self))]
    pub fn handle_event(&mut self, event: UiEvent) -> ApplicationResult<EventOutcome> {
        match event {
            UiEvent::FilterInput { term } => {
                if !self.options.filter {
                    return Ok(EventOutcome::Ignored);
                }
                Ok(match self.on_filter_input(&term)? {
                    Some(matches) => EventOutcome::FilterApplied { matches },
                    None => EventOutcome::FilterScheduled,
                })
            }
            UiEvent::Click { target } => self.handle_click(target),
        }
    }

    fn handle_click(&mut self, target: ElementId) -> ApplicationResult<EventOutcome> {
        if let Some(controls) = self.filter_controls {
            if self
                .surface
                .closest_with_class(target, render::SELECT_MATCHING, Some(controls.root))
                == Some(controls.select_matching)
            {
                let count = self.select_matching();
                return Ok(EventOutcome::MatchesSelected { count });
            }
        }

        let Some(node_element) = self
            .surface
            .closest_with_class(target, render::NODE, self.container)
        else {
            return Ok(EventOutcome::Ignored);
        };
        let id = self.node_id_of(node_element)?;

        let on_part = |class: &str| {
            self.surface
                .closest_with_class(target, class, Some(node_element))
                .is_some()
        };
        if on_part(render::CHECKBOX) || on_part(render::LABEL) {
            let state = self.toggle(id)?;
            Ok(EventOutcome::Toggled { id, state })
        } else if on_part(render::EXPANDER) {
            let expanded = self.toggle_expansion(id)?;
            Ok(EventOutcome::Expansion { id, expanded })
        } else {
            Ok(EventOutcome::Ignored)
        }
    }

    /// Resolve a node element back to a live node id.
    fn node_id_of(&self, element: ElementId) -> ApplicationResult<NodeId> {
        let raw = self
            .surface
            .attribute(element, render::DATA_NODE_ID)
            .ok_or_else(|| ApplicationError::StaleElement(format!("{element} has no node id")))?;
        let id: NodeId = raw
            .parse()
            .map_err(ApplicationError::StaleElement)?;
        if self.tree.node_with_id(id).is_none() {
            warn!(%id, "event on element of a node that no longer exists");
            return Err(ApplicationError::StaleElement(format!(
                "{id} does not resolve to a node"
            )));
        }
        Ok(id)
    }
}
