//! Integration tests for filtering, match markers and debouncing.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use stv::application::render::{FILTERING, FILTER_DESCENDANT_MATCH, FILTER_MATCH, SELECTED};
use stv::application::{FilterDelay, RenderDepth, TreeView, ViewOptions};
use stv::domain::{RawNode, SelectionState};
use stv::infrastructure::traits::{ElementKind, UiSurface};
use stv::infrastructure::MemoryDom;
use stv::util::testing::{init_test_setup, sample_tree, ManualClock};

/// Two collapsed branches, each holding one "needle".
fn two_branches() -> RawNode {
    RawNode::value("root").with_children([
        RawNode::value("left").with_children([
            RawNode::value("l-mid").with_children([RawNode::labelled("Needle One", "n1")]),
        ]),
        RawNode::value("right").with_children([RawNode::labelled("needle two", "n2")]),
        RawNode::value("other"),
    ])
}

fn rendered(raw: &RawNode, delay: FilterDelay, clock: &ManualClock) -> TreeView<MemoryDom> {
    init_test_setup();
    let options = ViewOptions {
        filter_delay: delay,
        ..ViewOptions::default()
    };
    let mut view = TreeView::with_clock(MemoryDom::new(), options, Arc::new(clock.clone()));
    view.set_data(raw).expect("valid data");
    let container = view.surface_mut().create_element(ElementKind::Container);
    view.set_element(container).expect("container");
    view.render(RenderDepth::Levels(0)).expect("render");
    view
}

#[fixture]
fn clock() -> ManualClock {
    ManualClock::new()
}

fn id_of(view: &TreeView<MemoryDom>, value: &str) -> stv::domain::NodeId {
    view.node_with_value(value).unwrap().unwrap().id
}

fn marked(view: &TreeView<MemoryDom>, class: &str) -> Vec<String> {
    let container = view.container().unwrap();
    let dom = view.surface();
    dom.query_by_class(container, class)
        .into_iter()
        .filter_map(|el| dom.attribute(el, "data-value"))
        .collect()
}

// ============================================================
// Matching and markers
// ============================================================

#[rstest]
fn given_matches_in_two_collapsed_branches_when_filtering_then_both_chains_materialized(
    clock: ManualClock,
) {
    let mut view = rendered(&two_branches(), FilterDelay::Immediate, &clock);
    assert!(!view.is_rendered(id_of(&view, "n1")));

    let count = view.apply_filter("NEEDLE").unwrap();

    assert_eq!(count, 2);
    let matching: Vec<_> = view.get_matching().iter().map(|n| n.value.clone()).collect();
    assert_eq!(matching, ["n1", "n2"]);
    for value in ["n1", "n2", "l-mid"] {
        assert!(view.is_rendered(id_of(&view, value)), "{value} not rendered");
    }
    for value in ["left", "l-mid", "right"] {
        assert_eq!(view.is_expanded(id_of(&view, value)), Some(true));
    }
    assert_eq!(marked(&view, FILTER_MATCH), ["n1", "n2"]);
    assert_eq!(
        marked(&view, FILTER_DESCENDANT_MATCH),
        ["root", "left", "l-mid", "right"]
    );

    let root_el = view.root_element().unwrap();
    assert!(view.surface().has_class(root_el, FILTER_DESCENDANT_MATCH));
    assert!(view.surface().has_class(view.container().unwrap(), FILTERING));
    assert_eq!(
        view.surface().text(view.match_count_element().unwrap()).as_deref(),
        Some("2 matches")
    );
}

#[rstest]
fn given_branch_expanded_then_collapsed_when_filtering_then_branch_reopened(clock: ManualClock) {
    let mut view = rendered(&two_branches(), FilterDelay::Immediate, &clock);
    let left = id_of(&view, "left");
    let l_mid = id_of(&view, "l-mid");
    assert!(view.toggle_expansion(left).unwrap());
    assert!(view.toggle_expansion(l_mid).unwrap());
    assert!(!view.toggle_expansion(left).unwrap());
    assert!(view.is_rendered(id_of(&view, "n1")));

    assert_eq!(view.apply_filter("needle").unwrap(), 2);

    assert_eq!(view.is_expanded(left), Some(true));
    assert_eq!(view.is_expanded(l_mid), Some(true));
    assert_eq!(view.is_expanded(id_of(&view, "right")), Some(true));
    assert_eq!(marked(&view, FILTER_MATCH), ["n1", "n2"]);
}

#[rstest]
fn given_previous_filter_when_filtering_again_then_old_markers_cleared(clock: ManualClock) {
    let mut view = rendered(&two_branches(), FilterDelay::Immediate, &clock);
    view.apply_filter("needle").unwrap();

    assert_eq!(view.apply_filter("two").unwrap(), 1);
    assert_eq!(marked(&view, FILTER_MATCH), ["n2"]);
    assert_eq!(marked(&view, FILTER_DESCENDANT_MATCH), ["root", "right"]);
    assert_eq!(
        view.surface().text(view.match_count_element().unwrap()).as_deref(),
        Some("1 match")
    );

    assert_eq!(view.apply_filter("").unwrap(), 0);
    assert!(marked(&view, FILTER_MATCH).is_empty());
    assert!(marked(&view, FILTER_DESCENDANT_MATCH).is_empty());
    assert!(view.get_matching().is_empty());
    assert!(!view.surface().has_class(view.container().unwrap(), FILTERING));
    assert_eq!(
        view.surface().text(view.match_count_element().unwrap()).as_deref(),
        Some("(no search term)")
    );
}

#[test]
fn given_unrendered_view_when_filtering_then_only_match_list_computed() {
    let mut view = TreeView::new(MemoryDom::new(), ViewOptions::default());
    view.set_data(&two_branches()).unwrap();
    assert_eq!(view.apply_filter("needle").unwrap(), 2);
    assert_eq!(view.rendered_count(), 0);
}

#[rstest]
fn given_child_term_when_filtering_sample_then_four_nodes_match(clock: ManualClock) {
    let mut view = rendered(&sample_tree(), FilterDelay::Immediate, &clock);
    assert_eq!(view.apply_filter("child").unwrap(), 4);
}

// ============================================================
// Select matching
// ============================================================

#[rstest]
fn given_matches_when_select_matching_then_matches_selected_and_ancestors_recomputed(
    clock: ManualClock,
) {
    let mut view = rendered(&sample_tree(), FilterDelay::Immediate, &clock);
    view.apply_filter("child0").unwrap();

    assert_eq!(view.select_matching(), 3);

    let container = view.container().unwrap();
    let selected: Vec<_> = view
        .surface()
        .query_by_class(container, SELECTED)
        .into_iter()
        .filter(|&el| view.surface().has_class(el, "stv-child-node"))
        .collect();
    assert_eq!(selected.len(), 3);
    assert_eq!(
        view.node_with_value("root").unwrap().unwrap().state,
        SelectionState::Partial
    );
    assert_eq!(view.get_selection(), ["child0"]);
}

// ============================================================
// Debounce
// ============================================================

#[rstest]
fn given_keystroke_burst_when_delay_elapses_then_only_last_term_applied(clock: ManualClock) {
    let mut view = rendered(
        &two_branches(),
        FilterDelay::Debounced(Duration::from_millis(300)),
        &clock,
    );

    assert_eq!(view.on_filter_input("n").unwrap(), None);
    clock.advance(Duration::from_millis(200));
    assert_eq!(view.on_filter_input("ne").unwrap(), None);
    clock.advance(Duration::from_millis(200));
    assert_eq!(view.on_filter_input("two").unwrap(), None);

    clock.advance(Duration::from_millis(299));
    assert_eq!(view.run_pending_filter().unwrap(), None);
    assert!(view.get_matching().is_empty());

    clock.advance(Duration::from_millis(1));
    assert_eq!(view.run_pending_filter().unwrap(), Some(1));
    assert_eq!(view.filter_term(), "two");
    assert_eq!(view.get_matching()[0].value, "n2");

    assert_eq!(view.run_pending_filter().unwrap(), None);
    assert!(view.pending_filter_due().is_none());
}

#[rstest]
fn given_immediate_delay_when_input_then_filter_runs_synchronously(clock: ManualClock) {
    let mut view = rendered(&two_branches(), FilterDelay::Immediate, &clock);
    assert_eq!(view.on_filter_input("needle").unwrap(), Some(2));
    assert!(view.pending_filter_due().is_none());
}

#[rstest]
fn given_pending_filter_when_data_replaced_then_cancelled(clock: ManualClock) {
    let mut view = rendered(
        &two_branches(),
        FilterDelay::Debounced(Duration::from_millis(10)),
        &clock,
    );
    view.on_filter_input("needle").unwrap();
    view.set_data(&sample_tree()).unwrap();
    clock.advance(Duration::from_millis(50));
    assert_eq!(view.run_pending_filter().unwrap(), None);
}
