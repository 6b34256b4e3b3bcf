//! Structural edits addressed by wrapper.
//!
//! An edit runs in two phases. The tree primitive runs first; if it rejects
//! the edit nothing else happens. Only after it succeeds does the moved
//! node's wrapper take its ownership transition.

use crate::errors::{RuntimeError, RuntimeResult};
use crate::heap::{Heap, WrapperId};
use crate::ownership::{attach, detach, Transition};
use mdtree_tree::{NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Detach `node` from its parent and siblings.
    Unlink { node: WrapperId },
    /// Put `sibling` directly before `node`.
    InsertBefore { node: WrapperId, sibling: WrapperId },
    /// Put `sibling` directly after `node`.
    InsertAfter { node: WrapperId, sibling: WrapperId },
    PrependChild { parent: WrapperId, child: WrapperId },
    AppendChild { parent: WrapperId, child: WrapperId },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Unlink { .. } => "unlink",
            Mutation::InsertBefore { .. } => "insert_before",
            Mutation::InsertAfter { .. } => "insert_after",
            Mutation::PrependChild { .. } => "prepend_child",
            Mutation::AppendChild { .. } => "append_child",
        }
    }

    /// The wrapper whose node changes parent.
    pub fn moved(&self) -> WrapperId {
        match *self {
            Mutation::Unlink { node } => node,
            Mutation::InsertBefore { sibling, .. } | Mutation::InsertAfter { sibling, .. } => {
                sibling
            }
            Mutation::PrependChild { child, .. } | Mutation::AppendChild { child, .. } => child,
        }
    }
}

fn resolve(heap: &Heap, wrapper: WrapperId) -> RuntimeResult<NodeId> {
    heap.get(wrapper)
        .map(|w| w.node)
        .ok_or(RuntimeError::StaleWrapper(wrapper))
}

pub(crate) fn apply(
    tree: &mut Tree,
    heap: &mut Heap,
    mutation: Mutation,
) -> RuntimeResult<Transition> {
    match mutation {
        Mutation::Unlink { node } => {
            let node = resolve(heap, node)?;
            tree.unlink(node)?;
        }
        Mutation::InsertBefore { node, sibling } => {
            let (node, sibling) = (resolve(heap, node)?, resolve(heap, sibling)?);
            tree.insert_before(node, sibling)?;
        }
        Mutation::InsertAfter { node, sibling } => {
            let (node, sibling) = (resolve(heap, node)?, resolve(heap, sibling)?);
            tree.insert_after(node, sibling)?;
        }
        Mutation::PrependChild { parent, child } => {
            let (parent, child) = (resolve(heap, parent)?, resolve(heap, child)?);
            tree.prepend_child(parent, child)?;
        }
        Mutation::AppendChild { parent, child } => {
            let (parent, child) = (resolve(heap, parent)?, resolve(heap, child)?);
            tree.append_child(parent, child)?;
        }
    }

    let moved = mutation.moved();
    let wrapper = heap
        .get_mut(moved)
        .ok_or(RuntimeError::StaleWrapper(moved))?;
    let transition = match mutation {
        Mutation::Unlink { .. } => detach(&mut wrapper.ownership),
        _ => attach(&mut wrapper.ownership),
    };
    debug_assert_eq!(
        Some(wrapper.ownership),
        tree.ownership(wrapper.node).ok(),
        "wrapper ownership out of step with its node after {}",
        mutation.name()
    );
    if let Transition::Changed { from, to } = transition {
        tracing::debug!(wrapper = ?moved, ?from, ?to, "{}", mutation.name());
    }
    Ok(transition)
}
