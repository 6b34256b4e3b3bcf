//! Wrapper ownership transitions.
//!
//! A `Root` wrapper frees its node's subtree when collected; an `Attached`
//! one leaves that to the root of its tree. Attaching and detaching are
//! idempotent.

use mdtree_tree::Ownership;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: Ownership, to: Ownership },
    Unchanged,
}

impl Transition {
    pub fn is_changed(self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

/// Root -> Attached, after the node gained a parent.
pub fn attach(state: &mut Ownership) -> Transition {
    transition(state, Ownership::Attached)
}

/// Attached -> Root, after the node lost its parent.
pub fn detach(state: &mut Ownership) -> Transition {
    transition(state, Ownership::Root)
}

fn transition(state: &mut Ownership, to: Ownership) -> Transition {
    if *state == to {
        return Transition::Unchanged;
    }
    let from = std::mem::replace(state, to);
    Transition::Changed { from, to }
}
