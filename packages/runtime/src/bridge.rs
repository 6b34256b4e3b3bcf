//! Hooks the collector calls into.
//!
//! The collector cannot see the links between nodes, so when it visits a
//! wrapper, [`propagate`] marks the wrappers of the node's parent and
//! children on its behalf. [`finalize`] releases native storage for a
//! collected root wrapper.

use crate::heap::WrapperId;
use crate::identity::IdentityCache;
use mdtree_tree::{NodeId, Tree};
use thiserror::Error;

/// Receives the wrappers found reachable during marking.
pub trait Tracer {
    fn mark(&mut self, wrapper: WrapperId);
}

/// A mark stack is itself a tracer.
impl Tracer for Vec<WrapperId> {
    fn mark(&mut self, wrapper: WrapperId) {
        self.push(wrapper);
    }
}

/// A wrapped node whose parent has no wrapper. Memory safety can no longer
/// be guaranteed once this is seen.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("node {node:?} is wrapped but its parent {parent:?} is not")]
pub struct FatalInvariantViolation {
    pub node: NodeId,
    pub parent: NodeId,
}

/// Mark the wrappers of `node`'s parent and of every wrapped child.
pub fn propagate(
    tree: &Tree,
    cache: &IdentityCache,
    node: NodeId,
    tracer: &mut impl Tracer,
) -> Result<(), FatalInvariantViolation> {
    let Some(current) = tree.get(node) else {
        return Ok(());
    };
    if let Some(parent) = current.parent() {
        let wrapper = cache
            .lookup(parent)
            .ok_or(FatalInvariantViolation { node, parent })?;
        tracer.mark(wrapper);
    }
    for child in tree.children(node) {
        if let Some(wrapper) = cache.lookup(child) {
            tracer.mark(wrapper);
        }
    }
    Ok(())
}

/// Free the subtree rooted at `node`. Returns how many nodes were freed.
///
/// A node that is already gone frees nothing.
pub fn finalize(tree: &mut Tree, node: NodeId) -> usize {
    match tree.free_subtree(node) {
        Ok(freed) => {
            tracing::trace!(?node, freed, "finalized root");
            freed
        }
        Err(err) => {
            tracing::warn!(?node, %err, "finalizer found no live node");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use mdtree_tree::NodeKind;

    struct Recorder(Vec<WrapperId>);

    impl Tracer for Recorder {
        fn mark(&mut self, wrapper: WrapperId) {
            self.0.push(wrapper);
        }
    }

    #[test]
    fn test_marks_parent_and_wrapped_children() {
        let mut tree = Tree::new();
        let doc = tree.new_node(NodeKind::Document);
        let list = tree.new_node(NodeKind::List);
        let first = tree.new_node(NodeKind::Item);
        let second = tree.new_node(NodeKind::Item);
        tree.append_child(doc, list).unwrap();
        tree.append_child(list, first).unwrap();
        tree.append_child(list, second).unwrap();

        let mut heap = Heap::new();
        let mut cache = IdentityCache::new();
        let list_w = cache.materialize(&mut heap, &tree, list).unwrap();
        let doc_w = cache.lookup(doc).unwrap();
        let second_w = cache.materialize(&mut heap, &tree, second).unwrap();

        let mut recorder = Recorder(Vec::new());
        propagate(&tree, &cache, list, &mut recorder).unwrap();
        assert_eq!(recorder.0, vec![doc_w, second_w]);

        let mut stack = Vec::new();
        propagate(&tree, &cache, second, &mut stack).unwrap();
        assert_eq!(stack, vec![list_w]);
    }

    #[test]
    fn test_unwrapped_parent_is_fatal() {
        let mut tree = Tree::new();
        let para = tree.new_node(NodeKind::Paragraph);
        let text = tree.new_node(NodeKind::Text);
        tree.append_child(para, text).unwrap();

        let mut heap = Heap::new();
        let mut cache = IdentityCache::new();
        cache.get_or_create(&mut heap, &tree, text).unwrap();

        let mut stack = Vec::new();
        assert_eq!(
            propagate(&tree, &cache, text, &mut stack),
            Err(FatalInvariantViolation {
                node: text,
                parent: para
            })
        );
    }

    #[test]
    fn test_finalize_frees_subtree_once() {
        let mut tree = Tree::new();
        let doc = tree.new_node(NodeKind::Document);
        let para = tree.new_node(NodeKind::Paragraph);
        tree.append_child(doc, para).unwrap();

        assert_eq!(finalize(&mut tree, doc), 2);
        assert_eq!(finalize(&mut tree, doc), 0);
        assert_eq!(tree.freed_count(), 2);
        assert_eq!(tree.live_count(), 0);
    }
}
