//! Integration tests for incremental rendering onto the in-memory DOM.

use rstest::{fixture, rstest};

use stv::application::render::{
    CHECKBOX, CHILD_LIST, CHILD_NODE, COLLAPSED, DATA_NODE_ID, DATA_VALUE, EXPANDED, EXPANDER,
    FILTER_CONTROLS, LABEL, LEAF, NODE, PARENT, PARTIALLY_SELECTED, ROOT_NODE, SELECTED,
    UNSELECTED,
};
use stv::application::{ApplicationError, RenderDepth, TreeView, ViewOptions};
use stv::domain::RawNode;
use stv::infrastructure::traits::{ElementKind, UiSurface};
use stv::infrastructure::MemoryDom;
use stv::util::testing::{init_test_setup, sample_tree};

fn no_filter() -> ViewOptions {
    ViewOptions {
        filter: false,
        ..ViewOptions::default()
    }
}

fn attached_view(raw: &RawNode, options: ViewOptions) -> TreeView<MemoryDom> {
    init_test_setup();
    let mut view = TreeView::new(MemoryDom::new(), options);
    view.set_data(raw).expect("valid data");
    let container = view.surface_mut().create_element(ElementKind::Container);
    view.set_element(container).expect("container accepted");
    view
}

#[fixture]
fn view() -> TreeView<MemoryDom> {
    attached_view(&sample_tree(), no_filter())
}

fn node_elements(view: &TreeView<MemoryDom>) -> usize {
    let container = view.container().unwrap();
    view.surface().query_by_class(container, NODE).len()
}

fn id_of(view: &TreeView<MemoryDom>, value: &str) -> stv::domain::NodeId {
    view.node_with_value(value).unwrap().unwrap().id
}

// ============================================================
// Container validation
// ============================================================

#[test]
fn given_list_element_when_set_element_then_invalid_argument() {
    let mut view = TreeView::new(MemoryDom::new(), no_filter());
    let list = view.surface_mut().create_element(ElementKind::List);
    assert!(matches!(
        view.set_element(list),
        Err(ApplicationError::InvalidArgument(_))
    ));
}

#[test]
fn given_removed_element_when_set_element_then_invalid_argument() {
    let mut view = TreeView::new(MemoryDom::new(), no_filter());
    let el = view.surface_mut().create_element(ElementKind::Container);
    view.surface_mut().remove(el);
    assert!(view.set_element(el).is_err());
}

#[test]
fn given_fragment_when_set_element_then_accepted() {
    let mut view = TreeView::new(MemoryDom::new(), no_filter());
    let fragment = view.surface_mut().create_element(ElementKind::Fragment);
    assert!(view.set_element(fragment).is_ok());
}

#[test]
fn given_no_container_when_render_then_invalid_argument() {
    let mut view = TreeView::new(MemoryDom::new(), no_filter());
    view.set_data(&sample_tree()).unwrap();
    assert!(matches!(
        view.render(RenderDepth::Unlimited),
        Err(ApplicationError::InvalidArgument(_))
    ));
}

// ============================================================
// Depth
// ============================================================

#[test]
fn given_root_with_one_child_when_render_depth_zero_then_two_node_elements() {
    let raw = RawNode::value("root").with_children([
        RawNode::value("only").with_children([RawNode::value("grandchild")]),
    ]);
    let mut view = attached_view(&raw, no_filter());

    view.render(RenderDepth::Levels(0)).unwrap();

    assert_eq!(node_elements(&view), 2);
    assert_eq!(view.rendered_count(), 2);
    let only = id_of(&view, "only");
    assert_eq!(view.is_expanded(only), Some(false));
    assert!(!view.is_rendered(id_of(&view, "grandchild")));
}

#[rstest]
#[case(RenderDepth::Levels(0), 3)]
#[case(RenderDepth::Levels(1), 5)]
#[case(RenderDepth::Unlimited, 5)]
#[case(RenderDepth::Levels(usize::MAX), 5)]
fn given_depth_when_rendering_then_generations_materialized(
    mut view: TreeView<MemoryDom>,
    #[case] depth: RenderDepth,
    #[case] expected: usize,
) {
    view.render(depth).unwrap();
    assert_eq!(node_elements(&view), expected);
}

#[rstest]
fn given_rendered_view_when_rerendered_then_previous_elements_replaced(
    mut view: TreeView<MemoryDom>,
) {
    let first = view.render(RenderDepth::Unlimited).unwrap();
    let dom_size = view.surface().len();
    let second = view.render(RenderDepth::Unlimited).unwrap();

    assert_ne!(first, second);
    assert!(!view.surface().contains(first));
    assert_eq!(view.surface().len(), dom_size);
    assert_eq!(node_elements(&view), 5);
}

// ============================================================
// Element structure
// ============================================================

#[rstest]
fn given_rendered_tree_when_inspecting_elements_then_markers_and_parts_present(
    mut view: TreeView<MemoryDom>,
) {
    let root_el = view.render(RenderDepth::Levels(0)).unwrap();
    let dom = view.surface();

    assert_eq!(dom.kind(root_el), Some(ElementKind::Container));
    for class in [ROOT_NODE, NODE, PARENT, EXPANDED, UNSELECTED] {
        assert!(dom.has_class(root_el, class), "root lacks {class}");
    }
    assert_eq!(dom.parent(root_el), view.container());

    let child0 = view.elements_of(id_of(&view, "child0")).unwrap();
    assert_eq!(dom.kind(child0.element), Some(ElementKind::ListItem));
    for class in [CHILD_NODE, NODE, PARENT, COLLAPSED] {
        assert!(dom.has_class(child0.element, class));
    }
    assert_eq!(
        dom.attribute(child0.element, DATA_VALUE).as_deref(),
        Some("child0")
    );
    assert_eq!(
        dom.attribute(child0.element, DATA_NODE_ID),
        Some(id_of(&view, "child0").to_string())
    );

    let parts = dom.children(child0.element);
    assert_eq!(parts.len(), 4);
    assert!(dom.has_class(parts[0], EXPANDER));
    assert!(dom.has_class(parts[1], CHECKBOX));
    assert!(dom.has_class(parts[2], LABEL));
    assert!(dom.has_class(parts[3], CHILD_LIST));
    assert!(dom.children(parts[3]).is_empty());

    let child1 = view.elements_of(id_of(&view, "child1")).unwrap();
    assert!(dom.has_class(child1.element, LEAF));
    assert!(!dom.has_class(child1.element, COLLAPSED));
    assert_eq!(child1.child_list, None);
    assert_eq!(dom.children(child1.element).len(), 3);
}

#[test]
fn given_html_labels_when_rendering_then_label_is_markup_otherwise_escaped() {
    let raw = RawNode::value("root").with_children([RawNode::labelled("<b>bold</b>", "b")]);

    let mut markup_view = attached_view(
        &raw,
        ViewOptions {
            html_labels: true,
            ..no_filter()
        },
    );
    let root_el = markup_view.render(RenderDepth::Unlimited).unwrap();
    assert!(markup_view
        .surface()
        .outer_html(root_el)
        .contains(r#"<label class="stv-label"><b>bold</b></label>"#));

    let mut text_view = attached_view(&raw, no_filter());
    let root_el = text_view.render(RenderDepth::Unlimited).unwrap();
    assert!(text_view
        .surface()
        .outer_html(root_el)
        .contains("&lt;b&gt;bold&lt;/b&gt;"));
}

#[test]
fn given_filter_enabled_when_rendering_then_controls_precede_root() {
    let mut view = attached_view(&sample_tree(), ViewOptions::default());
    let root_el = view.render(RenderDepth::Unlimited).unwrap();
    let children = view.surface().children(view.container().unwrap());

    assert_eq!(children.len(), 2);
    assert!(view.surface().has_class(children[0], FILTER_CONTROLS));
    assert_eq!(children[1], root_el);
    assert_eq!(
        view.surface().text(view.match_count_element().unwrap()).as_deref(),
        Some("(no search term)")
    );
}

// ============================================================
// Lazy expansion
// ============================================================

#[rstest]
fn given_collapsed_branch_when_expanded_repeatedly_then_children_materialized_once(
    mut view: TreeView<MemoryDom>,
) {
    view.render(RenderDepth::Levels(0)).unwrap();
    let child0 = id_of(&view, "child0");
    assert_eq!(node_elements(&view), 3);

    assert!(view.toggle_expansion(child0).unwrap());
    assert_eq!(node_elements(&view), 5);
    assert!(view.is_rendered(id_of(&view, "child01")));

    assert!(!view.toggle_expansion(child0).unwrap());
    assert_eq!(view.is_expanded(child0), Some(false));
    assert!(view.toggle_expansion(child0).unwrap());
    assert_eq!(node_elements(&view), 5);

    let list = view.elements_of(child0).unwrap().child_list.unwrap();
    assert_eq!(view.surface().children(list).len(), 2);
}

#[rstest]
fn given_deep_unrendered_node_when_expanded_then_ancestors_materialized(
    mut view: TreeView<MemoryDom>,
) {
    let raw = RawNode::value("root").with_children([RawNode::value("a").with_children([
        RawNode::value("b").with_children([RawNode::value("c").with_children([RawNode::value("d")])]),
    ])]);
    view.set_data(&raw).unwrap();
    view.render(RenderDepth::Levels(0)).unwrap();

    view.expand(id_of(&view, "c")).unwrap();

    assert!(view.is_rendered(id_of(&view, "d")));
    assert_eq!(view.is_expanded(id_of(&view, "b")), Some(true));
    assert_eq!(view.rendered_count(), 5);
}

#[rstest]
fn given_leaf_when_toggling_expansion_then_nothing_happens(mut view: TreeView<MemoryDom>) {
    view.render(RenderDepth::Unlimited).unwrap();
    let leaf = id_of(&view, "child1");
    assert!(!view.toggle_expansion(leaf).unwrap());
    assert_eq!(view.is_expanded(leaf), None);
}

#[rstest]
fn given_unrendered_view_when_toggling_expansion_then_error(mut view: TreeView<MemoryDom>) {
    let child0 = id_of(&view, "child0");
    assert!(matches!(
        view.toggle_expansion(child0),
        Err(ApplicationError::InvalidArgument(_))
    ));
}

// ============================================================
// Selection redraw
// ============================================================

#[rstest]
fn given_rendered_tree_when_selecting_then_touched_markers_updated(
    mut view: TreeView<MemoryDom>,
) {
    view.render(RenderDepth::Unlimited).unwrap();
    view.select(id_of(&view, "child00")).unwrap();

    let dom = view.surface();
    let marker = |value: &str| {
        let el = view.elements_of(id_of(&view, value)).unwrap().element;
        [UNSELECTED, PARTIALLY_SELECTED, SELECTED]
            .into_iter()
            .filter(|m| dom.has_class(el, m))
            .collect::<Vec<_>>()
    };
    assert_eq!(marker("child00"), [SELECTED]);
    assert_eq!(marker("child01"), [UNSELECTED]);
    assert_eq!(marker("child0"), [PARTIALLY_SELECTED]);
    assert_eq!(marker("root"), [PARTIALLY_SELECTED]);
}

#[rstest]
fn given_unrendered_descendants_when_selecting_then_materialized_later_with_live_state(
    mut view: TreeView<MemoryDom>,
) {
    view.render(RenderDepth::Levels(0)).unwrap();
    let child0 = id_of(&view, "child0");
    view.select(child0).unwrap();
    assert!(!view.is_rendered(id_of(&view, "child00")));

    view.expand(child0).unwrap();
    let grandchild = view.elements_of(id_of(&view, "child00")).unwrap();
    assert!(view.surface().has_class(grandchild.element, SELECTED));
}

#[rstest]
fn given_rendered_view_when_data_replaced_then_elements_removed(mut view: TreeView<MemoryDom>) {
    let root_el = view.render(RenderDepth::Unlimited).unwrap();
    view.set_data(&sample_tree()).unwrap();

    assert!(!view.surface().contains(root_el));
    assert_eq!(view.rendered_count(), 0);
    assert_eq!(view.root_element(), None);
}
