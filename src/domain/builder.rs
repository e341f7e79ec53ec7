//! Tree builder: one depth-first, parent-before-children construction pass.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::TreeArena;
use crate::domain::error::DomainResult;
use crate::domain::node::{NodeSpec, RawNode};

/// Constructs arena trees from nested [`RawNode`] input.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    /// Nodes inserted by the last `populate` call
    inserted: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Insert `raw` and all its descendants into `tree`.
    ///
    /// Iterative version of the recursive descent: children are pushed in
    /// reverse so that popping visits them left to right, which keeps the
    /// parent's child order equal to the input order.
    #[instrument(level = "debug", skip_all)]
    pub fn populate(&mut self, tree: &mut TreeArena, raw: &RawNode) -> DomainResult<()> {
        self.inserted = 0;
        let mut stack: Vec<(&RawNode, Option<Index>, Vec<usize>)> = vec![(raw, None, Vec::new())];

        while let Some((current, parent_idx, path)) = stack.pop() {
            let spec = NodeSpec::normalize(current, &path)?;
            let current_idx = tree.insert_node(spec, parent_idx)?;
            self.inserted += 1;

            for (i, child) in current.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child, Some(current_idx), child_path));
            }
        }

        Ok(())
    }
}
