//! Storage for wrapper objects.
//!
//! A wrapper is the handle the host holds for a node. The heap only stores
//! them; reachability is decided by the collector.

use mdtree_tree::{Arena, Key, NodeId, Ownership};

pub type WrapperId = Key<Wrapper>;

#[derive(Debug, Clone)]
pub struct Wrapper {
    pub(crate) node: NodeId,
    pub(crate) ownership: Ownership,
    pub(crate) roots: u32,
    pub(crate) marked: bool,
}

impl Wrapper {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Number of external references keeping this wrapper alive.
    pub fn root_count(&self) -> u32 {
        self.roots
    }

    pub fn is_rooted(&self) -> bool {
        self.roots > 0
    }
}

#[derive(Default)]
pub struct Heap {
    wrappers: Arena<Wrapper>,
    allocated_since_collect: usize,
    total_allocated: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an unrooted wrapper for `node`.
    pub fn alloc(&mut self, node: NodeId, ownership: Ownership) -> WrapperId {
        self.allocated_since_collect += 1;
        self.total_allocated += 1;
        self.wrappers.alloc(Wrapper {
            node,
            ownership,
            roots: 0,
            marked: false,
        })
    }

    pub fn get(&self, id: WrapperId) -> Option<&Wrapper> {
        self.wrappers.get(id)
    }

    pub fn get_mut(&mut self, id: WrapperId) -> Option<&mut Wrapper> {
        self.wrappers.get_mut(id)
    }

    pub fn contains(&self, id: WrapperId) -> bool {
        self.wrappers.contains(id)
    }

    pub(crate) fn remove(&mut self, id: WrapperId) -> Option<Wrapper> {
        self.wrappers.remove(id)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WrapperId, &Wrapper)> {
        self.wrappers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (WrapperId, &mut Wrapper)> {
        self.wrappers.iter_mut()
    }

    pub fn allocated_since_collect(&self) -> usize {
        self.allocated_since_collect
    }

    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }

    pub(crate) fn reset_allocation_counter(&mut self) {
        self.allocated_since_collect = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdtree_tree::{NodeKind, Tree};

    #[test]
    fn test_alloc_starts_unrooted() {
        let mut tree = Tree::new();
        let node = tree.new_node(NodeKind::Paragraph);
        let mut heap = Heap::new();
        let id = heap.alloc(node, Ownership::Root);

        let wrapper = heap.get(id).unwrap();
        assert_eq!(wrapper.node(), node);
        assert!(!wrapper.is_rooted());
        assert_eq!(heap.allocated_since_collect(), 1);
    }

    #[test]
    fn test_removed_wrapper_id_is_stale() {
        let mut tree = Tree::new();
        let node = tree.new_node(NodeKind::Text);
        let mut heap = Heap::new();
        let first = heap.alloc(node, Ownership::Root);
        heap.remove(first).unwrap();
        let second = heap.alloc(node, Ownership::Root);

        assert!(!heap.contains(first));
        assert!(heap.contains(second));
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.total_allocated(), 2);
    }
}
