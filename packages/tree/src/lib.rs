//! Native node tree for mdtree.
//!
//! Nodes live in a generational arena and are addressed by `NodeId`. Each
//! node records whether it is a tree root or attached to a parent, and the
//! edit primitives keep that flag in step with the links.

pub mod accessors;
pub mod arena;
pub mod error;
pub mod node;
pub mod snapshot;
pub mod tree;
pub mod walk;

pub use arena::{Arena, Key};
pub use error::{EditError, Field, KindError, TreeError, TreeResult};
pub use node::{ListType, Node, NodeId, NodeKind, Ownership, Payload};
pub use snapshot::NodeSnapshot;
pub use tree::{Children, Tree};
pub use walk::{WalkEvent, Walker};

#[cfg(test)]
mod tests;
