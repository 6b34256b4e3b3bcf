//! Stop-the-world mark/sweep over the wrapper heap.
//!
//! Wrappers with a non-zero root count seed the mark stack. Every marked
//! wrapper is handed to [`propagate`], which pushes its neighbours. Sweeping
//! removes every unmarked wrapper and finalizes the `Root` ones.

use crate::bridge::{finalize, propagate, FatalInvariantViolation};
use crate::heap::{Heap, WrapperId};
use crate::identity::IdentityCache;
use mdtree_tree::{Ownership, Tree};
use serde::Serialize;

/// Outcome of one collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectStats {
    /// Wrappers found reachable.
    pub marked: usize,
    /// Wrappers removed from the heap.
    pub swept: usize,
    /// Swept wrappers that owned their subtree.
    pub finalized: usize,
    /// Native nodes released by the finalizers.
    pub freed_nodes: usize,
}

/// Run a full collection.
///
/// A violation found while marking stops the pass before anything is swept.
pub fn collect(
    heap: &mut Heap,
    cache: &mut IdentityCache,
    tree: &mut Tree,
) -> Result<CollectStats, FatalInvariantViolation> {
    let marked = mark(heap, cache, tree)?;
    let mut stats = sweep(heap, cache, tree);
    stats.marked = marked;
    heap.reset_allocation_counter();
    Ok(stats)
}

fn mark(
    heap: &mut Heap,
    cache: &IdentityCache,
    tree: &Tree,
) -> Result<usize, FatalInvariantViolation> {
    let mut stack: Vec<WrapperId> = Vec::new();
    for (id, wrapper) in heap.iter_mut() {
        wrapper.marked = false;
        if wrapper.is_rooted() {
            stack.push(id);
        }
    }

    let mut marked = 0;
    while let Some(id) = stack.pop() {
        let Some(wrapper) = heap.get_mut(id) else {
            continue;
        };
        if wrapper.marked {
            continue;
        }
        wrapper.marked = true;
        marked += 1;
        let node = wrapper.node;
        propagate(tree, cache, node, &mut stack)?;
    }
    Ok(marked)
}

fn sweep(heap: &mut Heap, cache: &mut IdentityCache, tree: &mut Tree) -> CollectStats {
    let dead: Vec<WrapperId> = heap
        .iter()
        .filter(|(_, wrapper)| !wrapper.marked)
        .map(|(id, _)| id)
        .collect();

    let mut stats = CollectStats::default();
    for id in dead {
        let Some(wrapper) = heap.remove(id) else {
            continue;
        };
        cache.forget(wrapper.node, id);
        stats.swept += 1;
        if wrapper.ownership == Ownership::Root {
            stats.finalized += 1;
            stats.freed_nodes += finalize(tree, wrapper.node);
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdtree_tree::{NodeId, NodeKind};

    struct Fixture {
        tree: Tree,
        heap: Heap,
        cache: IdentityCache,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tree: Tree::new(),
                heap: Heap::new(),
                cache: IdentityCache::new(),
            }
        }

        fn wrap(&mut self, node: NodeId) -> WrapperId {
            self.cache
                .materialize(&mut self.heap, &self.tree, node)
                .unwrap()
        }

        fn collect(&mut self) -> Result<CollectStats, FatalInvariantViolation> {
            collect(&mut self.heap, &mut self.cache, &mut self.tree)
        }

        /// document > paragraph > text
        fn document(&mut self) -> (NodeId, NodeId, NodeId) {
            let doc = self.tree.new_node(NodeKind::Document);
            let para = self.tree.new_node(NodeKind::Paragraph);
            let text = self.tree.new_node(NodeKind::Text);
            self.tree.append_child(doc, para).unwrap();
            self.tree.append_child(para, text).unwrap();
            (doc, para, text)
        }
    }

    #[test]
    fn test_unreachable_root_is_finalized() {
        let mut fx = Fixture::new();
        let (doc, _, text) = fx.document();
        fx.wrap(text);

        let stats = fx.collect().unwrap();
        assert_eq!(
            stats,
            CollectStats {
                marked: 0,
                swept: 3,
                finalized: 1,
                freed_nodes: 3,
            }
        );
        assert!(fx.heap.is_empty());
        assert!(fx.cache.is_empty());
        assert!(!fx.tree.contains(doc));
        assert_eq!(fx.tree.freed_count(), 3);
    }

    #[test]
    fn test_rooted_descendant_keeps_tree_alive() {
        let mut fx = Fixture::new();
        let (doc, _, text) = fx.document();
        let text_w = fx.wrap(text);
        fx.heap.get_mut(text_w).unwrap().roots = 1;

        let stats = fx.collect().unwrap();
        assert_eq!(stats.marked, 3);
        assert_eq!(stats.swept, 0);
        assert!(fx.tree.contains(doc));
        assert_eq!(fx.cache.lookup(text), Some(text_w));
    }

    #[test]
    fn test_only_unreachable_tree_is_freed() {
        let mut fx = Fixture::new();
        let (kept, _, kept_text) = fx.document();
        let (dropped, dropped_para, _) = fx.document();
        let kept_w = fx.wrap(kept);
        fx.heap.get_mut(kept_w).unwrap().roots = 1;
        fx.wrap(kept_text);
        fx.wrap(dropped_para);

        let stats = fx.collect().unwrap();
        assert_eq!(stats.marked, 3);
        assert_eq!(stats.swept, 2);
        assert_eq!(stats.finalized, 1);
        assert_eq!(stats.freed_nodes, 3);
        assert!(fx.tree.contains(kept_text));
        assert!(!fx.tree.contains(dropped));
        assert_eq!(fx.tree.freed_count(), 3);
    }

    #[test]
    fn test_violation_stops_before_sweep() {
        let mut fx = Fixture::new();
        let (doc, _, text) = fx.document();
        let text_w = fx.wrap(text);
        fx.heap.get_mut(text_w).unwrap().roots = 1;
        let doc_w = fx.cache.lookup(doc).unwrap();
        let loose = fx.tree.new_node(NodeKind::Paragraph);
        let orphan = fx.wrap(loose);

        // Break the chain: the paragraph keeps its node but loses its wrapper.
        let para = fx.tree.parent(text).unwrap().unwrap();
        let para_w = fx.cache.lookup(para).unwrap();
        fx.heap.remove(para_w).unwrap();
        fx.cache.forget(para, para_w);

        let err = fx.collect().unwrap_err();
        assert_eq!(err, FatalInvariantViolation { node: text, parent: para });
        assert!(fx.heap.contains(orphan));
        assert!(fx.heap.contains(doc_w));
        assert!(fx.tree.contains(doc));
    }

    #[test]
    fn test_collect_resets_allocation_counter() {
        let mut fx = Fixture::new();
        let (_, _, text) = fx.document();
        fx.wrap(text);
        assert_eq!(fx.heap.allocated_since_collect(), 3);
        fx.collect().unwrap();
        assert_eq!(fx.heap.allocated_since_collect(), 0);
    }
}
