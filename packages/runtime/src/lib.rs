//! Managed-object layer over an mdtree [`Tree`](mdtree_tree::Tree).
//!
//! Nodes are exposed to a host through wrappers kept in a collected heap.
//! The [`IdentityCache`] guarantees one wrapper per node, the [`bridge`]
//! lets the collector see native parent/child edges, and the [`Runtime`]
//! façade keeps wrapper ownership in step with every structural edit.

pub mod bridge;
pub mod collector;
pub mod config;
pub mod errors;
pub mod heap;
pub mod identity;
pub mod mutations;
pub mod ownership;
pub mod runtime;

pub use bridge::{finalize, propagate, FatalInvariantViolation, Tracer};
pub use collector::CollectStats;
pub use config::{RuntimeConfig, DEFAULT_GC_THRESHOLD};
pub use errors::{RuntimeError, RuntimeResult};
pub use heap::{Heap, Wrapper, WrapperId};
pub use identity::IdentityCache;
pub use mutations::Mutation;
pub use ownership::Transition;
pub use runtime::Runtime;
