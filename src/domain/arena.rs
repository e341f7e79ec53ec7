use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::builder::TreeBuilder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{IdGenerator, NodeId, NodeSnapshot, NodeSpec, RawNode, TreeNode};

/// Arena-based tree structure with an id index.
///
/// Nodes are owned by the arena; parent links are plain indices, so the
/// parent/child cycle never becomes an ownership cycle. Generational indices
/// from replaced data no longer resolve.
#[derive(Debug, Default)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    /// Node id -> arena index, one entry per live node
    ids: HashMap<NodeId, Index>,
    /// Id source, survives data replacement
    id_gen: IdGenerator,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `raw` into a tree, replacing root, nodes and id index together.
    ///
    /// On failure the current data is left untouched.
    #[instrument(level = "debug", skip_all)]
    pub fn set_data(&mut self, raw: &RawNode) -> DomainResult<()> {
        let mut fresh = TreeArena {
            id_gen: std::mem::take(&mut self.id_gen),
            ..TreeArena::default()
        };
        let result = TreeBuilder::new().populate(&mut fresh, raw);
        match result {
            Ok(()) => {
                debug!(nodes = fresh.len(), "tree data replaced");
                *self = fresh;
                Ok(())
            }
            Err(e) => {
                self.id_gen = std::mem::take(&mut fresh.id_gen);
                Err(e)
            }
        }
    }

    #[instrument(level = "trace", skip(self, spec))]
    pub fn insert_node(&mut self, spec: NodeSpec, parent: Option<Index>) -> DomainResult<Index> {
        let id = self.id_gen.next_id();
        if self.ids.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        let node_idx = self.arena.insert(TreeNode::new(id, spec, parent));
        self.ids.insert(id, node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        Ok(node_idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    pub fn has_data(&self) -> bool {
        self.root.is_some()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn children_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_of(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|node| node.parent)
    }

    /// O(1) lookup of an arena index by node id.
    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.ids.get(&id).copied()
    }

    pub fn node_with_id(&self, id: NodeId) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    fn require_root(&self) -> DomainResult<Index> {
        self.root.ok_or(DomainError::NoData)
    }

    /// Follow child indices from the root; `[]` is the root itself.
    #[instrument(level = "debug", skip(self))]
    pub fn index_at(&self, path: &[usize]) -> DomainResult<Index> {
        let mut current = self.require_root()?;
        for &i in path {
            current = *self
                .children_of(current)
                .get(i)
                .ok_or_else(|| DomainError::NodeLocation {
                    path: path.to_vec(),
                })?;
        }
        Ok(current)
    }

    pub fn node_at(&self, path: &[usize]) -> DomainResult<&TreeNode> {
        let idx = self.index_at(path)?;
        self.arena.get(idx).ok_or(DomainError::NodeLocation {
            path: path.to_vec(),
        })
    }

    /// Depth-first search, root first, children in order.
    #[instrument(level = "debug", skip(self))]
    pub fn index_with_value(&self, value: &str) -> DomainResult<Option<Index>> {
        self.require_root()?;
        Ok(self
            .iter()
            .find(|(_, node)| node.value == value)
            .map(|(idx, _)| idx))
    }

    pub fn node_with_value(&self, value: &str) -> DomainResult<Option<&TreeNode>> {
        Ok(self
            .index_with_value(value)?
            .and_then(|idx| self.arena.get(idx)))
    }

    /// Child-index path from the root to `idx`; inverse of [`Self::index_at`].
    pub fn path_of(&self, idx: Index) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = idx;
        while let Some(parent) = self.parent_of(current) {
            let position = self
                .children_of(parent)
                .iter()
                .position(|&c| c == current)
                .unwrap_or_default();
            path.push(position);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Proper ancestors of `idx`, nearest first.
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut result = Vec::new();
        let mut current = self.parent_of(idx);
        while let Some(parent) = current {
            result.push(parent);
            current = self.parent_of(parent);
        }
        result
    }

    /// Detached deep copy of the whole tree.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_data(&self) -> DomainResult<NodeSnapshot> {
        let root = self.require_root()?;
        Ok(self.snapshot(root))
    }

    fn snapshot(&self, idx: Index) -> NodeSnapshot {
        let node = &self.arena[idx];
        NodeSnapshot {
            label: node.label.clone(),
            value: node.value.clone(),
            state: node.state,
            children: node.children.iter().map(|&c| self.snapshot(c)).collect(),
        }
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Preorder iteration over the subtree rooted at `idx`.
    pub fn iter_from(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator {
            arena: self,
            stack: vec![idx],
        }
    }

    /// Number of levels, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        1 + self
            .children_of(node_idx)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Values of all leaves, in display order.
    pub fn leaf_values(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.value.clone())
            .collect()
    }
}

/// Preorder (root first, children left to right) traversal.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
