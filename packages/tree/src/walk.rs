//! Depth-first Enter/Exit traversal.
//!
//! Container nodes produce an `Enter` and a matching `Exit`. Leaf kinds
//! produce `Enter` only. The walk never leaves the subtree it started at.

use crate::node::NodeId;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Exit(NodeId),
}

impl WalkEvent {
    pub fn node(self) -> NodeId {
        match self {
            WalkEvent::Enter(id) | WalkEvent::Exit(id) => id,
        }
    }
}

pub struct Walker<'t> {
    tree: &'t Tree,
    root: NodeId,
    pending: Option<WalkEvent>,
}

impl<'t> Walker<'t> {
    pub fn new(tree: &'t Tree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            pending: tree.contains(root).then_some(WalkEvent::Enter(root)),
        }
    }

    /// Jump straight to the `Exit` of `node`, skipping its descendants.
    pub fn skip_to_exit(&mut self, node: NodeId) {
        self.pending = Some(WalkEvent::Exit(node));
    }

    fn is_leaf(&self, id: NodeId) -> bool {
        self.tree
            .get(id)
            .map(|node| node.kind().is_leaf())
            .unwrap_or(true)
    }

    fn after(&self, id: NodeId) -> Option<WalkEvent> {
        if id == self.root {
            return None;
        }
        let node = self.tree.get(id)?;
        match (node.next(), node.parent()) {
            (Some(next), _) => Some(WalkEvent::Enter(next)),
            (None, Some(parent)) => Some(WalkEvent::Exit(parent)),
            (None, None) => None,
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let current = self.pending?;
        self.pending = match current {
            WalkEvent::Enter(id) if !self.is_leaf(id) => {
                match self.tree.get(id).and_then(|node| node.first_child()) {
                    Some(child) => Some(WalkEvent::Enter(child)),
                    None => Some(WalkEvent::Exit(id)),
                }
            }
            WalkEvent::Enter(id) | WalkEvent::Exit(id) => self.after(id),
        };
        Some(current)
    }
}

impl Tree {
    pub fn walk(&self, root: NodeId) -> Walker<'_> {
        Walker::new(self, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn sample() -> (Tree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let doc = tree.new_node(NodeKind::Document);
        let para = tree.new_node(NodeKind::Paragraph);
        let emph = tree.new_node(NodeKind::Emph);
        let text = tree.new_node(NodeKind::Text);
        tree.append_child(doc, para).unwrap();
        tree.append_child(para, emph).unwrap();
        tree.append_child(emph, text).unwrap();
        (tree, doc, para, emph, text)
    }

    #[test]
    fn test_enter_exit_order() {
        let (tree, doc, para, emph, text) = sample();
        let events: Vec<_> = tree.walk(doc).collect();
        assert_eq!(
            events,
            vec![
                WalkEvent::Enter(doc),
                WalkEvent::Enter(para),
                WalkEvent::Enter(emph),
                WalkEvent::Enter(text),
                WalkEvent::Exit(emph),
                WalkEvent::Exit(para),
                WalkEvent::Exit(doc),
            ]
        );
    }

    #[test]
    fn test_walk_stays_inside_subtree() {
        let (mut tree, _doc, para, emph, text) = sample();
        let sibling = tree.new_node(NodeKind::Paragraph);
        tree.insert_after(para, sibling).unwrap();

        let events: Vec<_> = tree.walk(emph).collect();
        assert_eq!(
            events,
            vec![WalkEvent::Enter(emph), WalkEvent::Enter(text), WalkEvent::Exit(emph)]
        );
    }

    #[test]
    fn test_skip_to_exit() {
        let (tree, doc, para, emph, _text) = sample();
        let mut walker = tree.walk(doc);
        let mut seen = Vec::new();
        while let Some(event) = walker.next() {
            seen.push(event);
            if event == WalkEvent::Enter(emph) {
                walker.skip_to_exit(emph);
            }
        }
        assert_eq!(
            seen,
            vec![
                WalkEvent::Enter(doc),
                WalkEvent::Enter(para),
                WalkEvent::Enter(emph),
                WalkEvent::Exit(emph),
                WalkEvent::Exit(para),
                WalkEvent::Exit(doc),
            ]
        );
    }
}
