//! Node to wrapper side table.
//!
//! A node has at most one wrapper. Once created, the pairing holds until
//! the collector sweeps the wrapper.

use crate::heap::{Heap, WrapperId};
use mdtree_tree::{NodeId, Tree, TreeError, TreeResult};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct IdentityCache {
    wrappers: HashMap<NodeId, WrapperId>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, node: NodeId) -> Option<WrapperId> {
        self.wrappers.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.wrappers.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Return the wrapper for `node`, allocating one on first use.
    ///
    /// A new wrapper copies the node's current ownership and starts
    /// unrooted.
    pub fn get_or_create(
        &mut self,
        heap: &mut Heap,
        tree: &Tree,
        node: NodeId,
    ) -> TreeResult<WrapperId> {
        if let Some(wrapper) = self.lookup(node) {
            return Ok(wrapper);
        }
        let ownership = tree.ownership(node)?;
        let wrapper = heap.alloc(node, ownership);
        self.wrappers.insert(node, wrapper);
        tracing::trace!(?node, ?wrapper, ?ownership, "materialized wrapper");
        Ok(wrapper)
    }

    /// Wrap `node` and every ancestor that has no wrapper yet, root first.
    ///
    /// Afterwards every wrapped node with a parent has a wrapped parent.
    pub fn materialize(
        &mut self,
        heap: &mut Heap,
        tree: &Tree,
        node: NodeId,
    ) -> TreeResult<WrapperId> {
        if let Some(wrapper) = self.lookup(node) {
            return Ok(wrapper);
        }
        tree.node(node)?;
        let pending: Vec<NodeId> = tree
            .ancestors(node)
            .take_while(|id| !self.contains(*id))
            .collect();

        let mut wrapper = Err(TreeError::StaleNode(node));
        for &id in pending.iter().rev() {
            wrapper = self.get_or_create(heap, tree, id);
        }
        wrapper
    }

    /// Drop the entry for `node` if it still points at `wrapper`.
    pub(crate) fn forget(&mut self, node: NodeId, wrapper: WrapperId) {
        if self.lookup(node) == Some(wrapper) {
            self.wrappers.remove(&node);
        }
    }
}
