//! Full-tree text matching used by the filter.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::TreeArena;

/// All nodes whose label or value contains `term`, case-insensitively,
/// in preorder. An empty term matches nothing.
#[instrument(level = "debug", skip(tree))]
pub fn find_matching(tree: &TreeArena, term: &str) -> Vec<Index> {
    if term.is_empty() {
        return Vec::new();
    }
    let lower_term = term.to_lowercase();
    tree.iter()
        .filter(|(_, node)| node.label_or_value_matches(&lower_term))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::RawNode;

    #[test]
    fn given_mixed_case_term_when_matching_then_case_insensitive_on_label_and_value() {
        let raw = RawNode::value("root").with_children([
            RawNode::labelled("Apple", "fruit-1"),
            RawNode::labelled("Carrot", "veg-1"),
            RawNode::labelled("Pear", "FRUIT-2"),
        ]);
        let mut tree = TreeArena::new();
        tree.set_data(&raw).unwrap();

        let values: Vec<_> = find_matching(&tree, "Fruit")
            .into_iter()
            .map(|idx| tree.get_node(idx).unwrap().label.clone())
            .collect();
        assert_eq!(values, ["Apple", "Pear"]);
        assert_eq!(find_matching(&tree, "APP").len(), 1);
        assert!(find_matching(&tree, "").is_empty());
    }
}
