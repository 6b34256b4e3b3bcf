//! The host-facing object model.
//!
//! A [`Runtime`] owns the tree, the wrapper heap and the identity cache.
//! Hosts only ever hold [`WrapperId`]s; every call that hands out a node
//! goes through the identity cache, so the same node always comes back as
//! the same wrapper.

use crate::bridge::FatalInvariantViolation;
use crate::collector::{self, CollectStats};
use crate::config::RuntimeConfig;
use crate::errors::{RuntimeError, RuntimeResult};
use crate::heap::{Heap, Wrapper, WrapperId};
use crate::identity::IdentityCache;
use crate::mutations::{self, Mutation};
use crate::ownership::Transition;
use mdtree_compiler_html::RenderOptions;
use mdtree_tree::{ListType, NodeId, NodeKind, Ownership, Tree, TreeResult};
use tracing::instrument;

type Step = fn(&Tree, NodeId) -> TreeResult<Option<NodeId>>;

#[derive(Default)]
pub struct Runtime {
    pub(crate) tree: Tree,
    pub(crate) heap: Heap,
    pub(crate) cache: IdentityCache,
    config: RuntimeConfig,
    collections: usize,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn wrapper_count(&self) -> usize {
        self.heap.len()
    }

    /// Number of collections run so far.
    pub fn collections(&self) -> usize {
        self.collections
    }

    // ---- Creation ----

    /// Parse `text` with the configured options and wrap the document.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn parse_document(&mut self, text: &str) -> RuntimeResult<WrapperId> {
        let doc = mdtree_parser::parse_into(&mut self.tree, text, &self.config.parse)?;
        self.wrap(doc)
    }

    /// Create a detached node of `kind` and wrap it.
    pub fn new_node(&mut self, kind: NodeKind) -> RuntimeResult<WrapperId> {
        let node = self.tree.new_node(kind);
        self.wrap(node)
    }

    /// The wrapper for `node`, creating it and any missing ancestor wrappers.
    pub fn wrap(&mut self, node: NodeId) -> RuntimeResult<WrapperId> {
        Ok(self.cache.materialize(&mut self.heap, &self.tree, node)?)
    }

    pub fn wrapper(&self, wrapper: WrapperId) -> RuntimeResult<&Wrapper> {
        self.heap
            .get(wrapper)
            .ok_or(RuntimeError::StaleWrapper(wrapper))
    }

    /// The live node behind `wrapper`.
    pub fn node_of(&self, wrapper: WrapperId) -> RuntimeResult<NodeId> {
        let node = self.wrapper(wrapper)?.node();
        if !self.tree.contains(node) {
            return Err(RuntimeError::StaleNode(node));
        }
        Ok(node)
    }

    // ---- Roots ----

    /// Record an external reference to `wrapper`.
    pub fn root(&mut self, wrapper: WrapperId) -> RuntimeResult<()> {
        let entry = self
            .heap
            .get_mut(wrapper)
            .ok_or(RuntimeError::StaleWrapper(wrapper))?;
        entry.roots += 1;
        Ok(())
    }

    /// Release one external reference to `wrapper`.
    pub fn unroot(&mut self, wrapper: WrapperId) -> RuntimeResult<()> {
        let entry = self
            .heap
            .get_mut(wrapper)
            .ok_or(RuntimeError::StaleWrapper(wrapper))?;
        entry.roots = entry.roots.saturating_sub(1);
        Ok(())
    }

    // ---- Type and traversal ----

    pub fn kind(&self, wrapper: WrapperId) -> RuntimeResult<NodeKind> {
        Ok(self.tree.kind(self.node_of(wrapper)?)?)
    }

    pub fn type_string(&self, wrapper: WrapperId) -> RuntimeResult<&'static str> {
        Ok(self.kind(wrapper)?.type_string())
    }

    pub fn ownership(&self, wrapper: WrapperId) -> RuntimeResult<Ownership> {
        Ok(self.wrapper(wrapper)?.ownership())
    }

    pub fn parent(&mut self, wrapper: WrapperId) -> RuntimeResult<Option<WrapperId>> {
        self.neighbour(wrapper, Tree::parent)
    }

    pub fn first_child(&mut self, wrapper: WrapperId) -> RuntimeResult<Option<WrapperId>> {
        self.neighbour(wrapper, Tree::first_child)
    }

    pub fn last_child(&mut self, wrapper: WrapperId) -> RuntimeResult<Option<WrapperId>> {
        self.neighbour(wrapper, Tree::last_child)
    }

    pub fn next(&mut self, wrapper: WrapperId) -> RuntimeResult<Option<WrapperId>> {
        self.neighbour(wrapper, Tree::next)
    }

    pub fn previous(&mut self, wrapper: WrapperId) -> RuntimeResult<Option<WrapperId>> {
        self.neighbour(wrapper, Tree::previous)
    }

    fn neighbour(&mut self, wrapper: WrapperId, step: Step) -> RuntimeResult<Option<WrapperId>> {
        let node = self.node_of(wrapper)?;
        match step(&self.tree, node)? {
            Some(found) => Ok(Some(self.wrap(found)?)),
            None => Ok(None),
        }
    }

    // ---- Fields ----

    pub fn string_content(&self, wrapper: WrapperId) -> RuntimeResult<&str> {
        Ok(self.tree.literal(self.node_of(wrapper)?)?)
    }

    pub fn set_string_content(&mut self, wrapper: WrapperId, text: &str) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_literal(node, text)?)
    }

    pub fn url(&self, wrapper: WrapperId) -> RuntimeResult<&str> {
        Ok(self.tree.url(self.node_of(wrapper)?)?)
    }

    pub fn set_url(&mut self, wrapper: WrapperId, url: &str) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_url(node, url)?)
    }

    pub fn title(&self, wrapper: WrapperId) -> RuntimeResult<&str> {
        Ok(self.tree.title(self.node_of(wrapper)?)?)
    }

    pub fn set_title(&mut self, wrapper: WrapperId, title: &str) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_title(node, title)?)
    }

    pub fn header_level(&self, wrapper: WrapperId) -> RuntimeResult<u8> {
        Ok(self.tree.header_level(self.node_of(wrapper)?)?)
    }

    pub fn set_header_level(&mut self, wrapper: WrapperId, level: i64) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_header_level(node, level)?)
    }

    pub fn list_type(&self, wrapper: WrapperId) -> RuntimeResult<ListType> {
        Ok(self.tree.list_type(self.node_of(wrapper)?)?)
    }

    pub fn set_list_type(&mut self, wrapper: WrapperId, list_type: ListType) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_list_type(node, list_type)?)
    }

    pub fn list_start(&self, wrapper: WrapperId) -> RuntimeResult<u32> {
        Ok(self.tree.list_start(self.node_of(wrapper)?)?)
    }

    pub fn set_list_start(&mut self, wrapper: WrapperId, start: i64) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_list_start(node, start)?)
    }

    pub fn list_tight(&self, wrapper: WrapperId) -> RuntimeResult<bool> {
        Ok(self.tree.list_tight(self.node_of(wrapper)?)?)
    }

    pub fn set_list_tight(&mut self, wrapper: WrapperId, tight: bool) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_list_tight(node, tight)?)
    }

    pub fn fence_info(&self, wrapper: WrapperId) -> RuntimeResult<&str> {
        Ok(self.tree.fence_info(self.node_of(wrapper)?)?)
    }

    pub fn set_fence_info(&mut self, wrapper: WrapperId, info: &str) -> RuntimeResult<()> {
        let node = self.node_of(wrapper)?;
        Ok(self.tree.set_fence_info(node, info)?)
    }

    // ---- Rendering ----

    /// Render with the configured options.
    pub fn render_html(&self, wrapper: WrapperId) -> RuntimeResult<String> {
        self.render_html_with(wrapper, &self.config.render)
    }

    pub fn render_html_with(
        &self,
        wrapper: WrapperId,
        options: &RenderOptions,
    ) -> RuntimeResult<String> {
        let node = self.node_of(wrapper)?;
        Ok(mdtree_compiler_html::render_html(&self.tree, node, options)?)
    }

    pub fn render_commonmark(&self, wrapper: WrapperId) -> RuntimeResult<String> {
        let node = self.node_of(wrapper)?;
        Ok(mdtree_parser::serialize(&self.tree, node)?)
    }

    // ---- Mutation ----

    pub fn apply(&mut self, mutation: Mutation) -> RuntimeResult<Transition> {
        mutations::apply(&mut self.tree, &mut self.heap, mutation)
    }

    pub fn unlink(&mut self, node: WrapperId) -> RuntimeResult<()> {
        self.apply(Mutation::Unlink { node }).map(drop)
    }

    pub fn insert_before(&mut self, node: WrapperId, sibling: WrapperId) -> RuntimeResult<()> {
        self.apply(Mutation::InsertBefore { node, sibling }).map(drop)
    }

    pub fn insert_after(&mut self, node: WrapperId, sibling: WrapperId) -> RuntimeResult<()> {
        self.apply(Mutation::InsertAfter { node, sibling }).map(drop)
    }

    pub fn prepend_child(&mut self, parent: WrapperId, child: WrapperId) -> RuntimeResult<()> {
        self.apply(Mutation::PrependChild { parent, child }).map(drop)
    }

    pub fn append_child(&mut self, parent: WrapperId, child: WrapperId) -> RuntimeResult<()> {
        self.apply(Mutation::AppendChild { parent, child }).map(drop)
    }

    // ---- Collection ----

    /// Run a full collection.
    ///
    /// A broken parent-wrapper chain means freed memory could be reached
    /// later, so the process is aborted.
    pub fn collect(&mut self) -> CollectStats {
        match self.try_collect() {
            Ok(stats) => stats,
            Err(violation) => {
                tracing::error!(
                    node = ?violation.node,
                    parent = ?violation.parent,
                    "fatal invariant violation during marking: {violation}"
                );
                std::process::abort()
            }
        }
    }

    /// Collect once enough wrappers have been allocated since the last pass.
    pub fn maybe_collect(&mut self) -> Option<CollectStats> {
        if self.heap.allocated_since_collect() < self.config.gc_threshold {
            return None;
        }
        Some(self.collect())
    }

    pub(crate) fn try_collect(&mut self) -> Result<CollectStats, FatalInvariantViolation> {
        let stats = collector::collect(&mut self.heap, &mut self.cache, &mut self.tree)?;
        self.collections += 1;
        tracing::debug!(
            marked = stats.marked,
            swept = stats.swept,
            finalized = stats.finalized,
            freed_nodes = stats.freed_nodes,
            live_wrappers = self.heap.len(),
            "collection {} finished",
            self.collections
        );
        Ok(stats)
    }
}
