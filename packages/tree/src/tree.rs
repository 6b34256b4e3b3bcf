//! The native tree: node storage plus the structural edit primitives.
//!
//! Edits validate everything before touching a link, so a rejected edit
//! leaves the tree exactly as it was.

use crate::arena::Arena;
use crate::error::{EditError, TreeError, TreeResult};
use crate::node::{Node, NodeId, NodeKind, Ownership, Payload};
use std::ops::Index;

#[derive(Debug, Default)]
pub struct Tree {
    nodes: Arena<Node>,
    allocated: usize,
    freed: usize,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with the default payload for its kind.
    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        self.new_node_with(kind, Payload::default_for(kind))
    }

    pub fn new_node_with(&mut self, kind: NodeKind, payload: Payload) -> NodeId {
        debug_assert_eq!(
            std::mem::discriminant(&payload),
            std::mem::discriminant(&Payload::default_for(kind)),
            "payload does not match {kind}"
        );
        self.allocated += 1;
        self.nodes.alloc(Node::new(kind, payload))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.nodes.get(id).ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(TreeError::StaleNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn kind(&self, id: NodeId) -> TreeResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    pub fn ownership(&self, id: NodeId) -> TreeResult<Ownership> {
        Ok(self.node(id)?.ownership)
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn first_child(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.last_child)
    }

    pub fn next(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.next)
    }

    pub fn previous(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.prev)
    }

    /// Iterate over the direct children of `id`. A stale id yields nothing.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).and_then(|node| node.first_child),
        }
    }

    /// Walk up from `id` to the root, starting with `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), move |&cur| {
            self.get(cur).and_then(|node| node.parent)
        })
    }

    /// Topmost ancestor of `id`.
    pub fn root_of(&self, id: NodeId) -> TreeResult<NodeId> {
        self.node(id)?;
        Ok(self.ancestors(id).last().unwrap_or(id))
    }

    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        Ok(self.ancestors(id).count() - 1)
    }

    /// Detach `id` from its parent and siblings. It becomes a tree root.
    ///
    /// Unlinking a node that is already a root succeeds and changes nothing.
    pub fn unlink(&mut self, id: NodeId) -> TreeResult<()> {
        self.node(id)?;
        self.detach(id);
        Ok(())
    }

    /// Insert `sibling` directly before `node`.
    pub fn insert_before(&mut self, node: NodeId, sibling: NodeId) -> TreeResult<()> {
        let parent = self.check_sibling_edit(node, sibling)?;
        self.detach(sibling);

        let prev = self.nodes[node].prev;
        {
            let s = &mut self.nodes[sibling];
            s.parent = Some(parent);
            s.prev = prev;
            s.next = Some(node);
            s.ownership = Ownership::Attached;
        }
        self.nodes[node].prev = Some(sibling);
        match prev {
            Some(prev) => self.nodes[prev].next = Some(sibling),
            None => self.nodes[parent].first_child = Some(sibling),
        }
        Ok(())
    }

    /// Insert `sibling` directly after `node`.
    pub fn insert_after(&mut self, node: NodeId, sibling: NodeId) -> TreeResult<()> {
        let parent = self.check_sibling_edit(node, sibling)?;
        self.detach(sibling);

        let next = self.nodes[node].next;
        {
            let s = &mut self.nodes[sibling];
            s.parent = Some(parent);
            s.prev = Some(node);
            s.next = next;
            s.ownership = Ownership::Attached;
        }
        self.nodes[node].next = Some(sibling);
        match next {
            Some(next) => self.nodes[next].prev = Some(sibling),
            None => self.nodes[parent].last_child = Some(sibling),
        }
        Ok(())
    }

    /// Make `child` the first child of `node`.
    pub fn prepend_child(&mut self, node: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_can_contain(node, child)?;
        self.detach(child);

        let old_first = self.nodes[node].first_child;
        {
            let c = &mut self.nodes[child];
            c.parent = Some(node);
            c.prev = None;
            c.next = old_first;
            c.ownership = Ownership::Attached;
        }
        match old_first {
            Some(first) => self.nodes[first].prev = Some(child),
            None => self.nodes[node].last_child = Some(child),
        }
        self.nodes[node].first_child = Some(child);
        Ok(())
    }

    /// Make `child` the last child of `node`.
    pub fn append_child(&mut self, node: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_can_contain(node, child)?;
        self.detach(child);

        let old_last = self.nodes[node].last_child;
        {
            let c = &mut self.nodes[child];
            c.parent = Some(node);
            c.prev = old_last;
            c.next = None;
            c.ownership = Ownership::Attached;
        }
        match old_last {
            Some(last) => self.nodes[last].next = Some(child),
            None => self.nodes[node].first_child = Some(child),
        }
        self.nodes[node].last_child = Some(child);
        Ok(())
    }

    /// Free `id` and every node below it. Returns the number of nodes freed.
    ///
    /// Only the child/sibling links needed to enumerate the subtree are read.
    pub fn free_subtree(&mut self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        self.detach(id);

        let mut stack = vec![id];
        let mut count = 0;
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(current) else {
                continue;
            };
            let mut child = node.first_child;
            while let Some(c) = child {
                stack.push(c);
                child = self.nodes.get(c).and_then(|n| n.next);
            }
            count += 1;
        }
        self.freed += count;
        Ok(count)
    }

    pub fn subtree_size(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend(self.children(current));
        }
        Ok(count)
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes created over the tree's lifetime.
    pub fn allocated_count(&self) -> usize {
        self.allocated
    }

    /// Number of nodes released through `free_subtree`.
    pub fn freed_count(&self) -> usize {
        self.freed
    }

    /// Ids of every live node without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    fn check_sibling_edit(&self, node: NodeId, sibling: NodeId) -> TreeResult<NodeId> {
        self.node(sibling)?;
        let parent = self.node(node)?.parent.ok_or(EditError::Detached)?;
        if node == sibling {
            return Err(EditError::SameNode.into());
        }
        self.check_can_contain(parent, sibling)?;
        Ok(parent)
    }

    fn check_can_contain(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_kind = self.node(parent)?.kind;
        let child_kind = self.node(child)?.kind;
        if parent == child {
            return Err(EditError::SameNode.into());
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(EditError::Cycle.into());
        }
        if !parent_kind.can_contain(child_kind) {
            return Err(EditError::CannotContain {
                parent: parent_kind,
                child: child_kind,
            }
            .into());
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id];
            (node.parent, node.prev, node.next)
        };
        if let Some(prev) = prev {
            self.nodes[prev].next = next;
        }
        if let Some(next) = next {
            self.nodes[next].prev = prev;
        }
        if let Some(parent) = parent {
            let p = &mut self.nodes[parent];
            if p.first_child == Some(id) {
                p.first_child = next;
            }
            if p.last_child == Some(id) {
                p.last_child = prev;
            }
        }
        let node = &mut self.nodes[id];
        node.parent = None;
        node.prev = None;
        node.next = None;
        node.ownership = Ownership::Root;
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    /// Panics on a stale id. Links stored inside the tree are always live.
    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(node) => node,
            None => panic!("stale node id {id:?}"),
        }
    }
}

pub struct Children<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(|node| node.next);
        Some(current)
    }
}
