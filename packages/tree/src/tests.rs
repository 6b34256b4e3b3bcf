use crate::*;

fn doc_with_paragraphs(n: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let doc = tree.new_node(NodeKind::Document);
    let paras = (0..n)
        .map(|_| {
            let p = tree.new_node(NodeKind::Paragraph);
            tree.append_child(doc, p).unwrap();
            p
        })
        .collect();
    (tree, doc, paras)
}

#[test]
fn test_new_node_is_root() {
    let mut tree = Tree::new();
    let para = tree.new_node(NodeKind::Paragraph);
    assert_eq!(tree.ownership(para).unwrap(), Ownership::Root);
    assert_eq!(tree.parent(para).unwrap(), None);
    assert_eq!(tree.allocated_count(), 1);
}

#[test]
fn test_append_and_prepend_order() {
    let mut tree = Tree::new();
    let doc = tree.new_node(NodeKind::Document);
    let a = tree.new_node(NodeKind::Paragraph);
    let b = tree.new_node(NodeKind::Paragraph);
    let c = tree.new_node(NodeKind::Paragraph);
    tree.append_child(doc, b).unwrap();
    tree.append_child(doc, c).unwrap();
    tree.prepend_child(doc, a).unwrap();

    assert_eq!(tree.children(doc).collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(tree.first_child(doc).unwrap(), Some(a));
    assert_eq!(tree.last_child(doc).unwrap(), Some(c));
    assert_eq!(tree.previous(b).unwrap(), Some(a));
    assert_eq!(tree.next(b).unwrap(), Some(c));
    for id in [a, b, c] {
        assert_eq!(tree.ownership(id).unwrap(), Ownership::Attached);
    }
}

#[test]
fn test_insert_before_and_after() {
    let (mut tree, doc, paras) = doc_with_paragraphs(2);
    let first = tree.new_node(NodeKind::Hrule);
    let middle = tree.new_node(NodeKind::Hrule);
    tree.insert_before(paras[0], first).unwrap();
    tree.insert_after(paras[0], middle).unwrap();

    assert_eq!(
        tree.children(doc).collect::<Vec<_>>(),
        vec![first, paras[0], middle, paras[1]]
    );
    assert_eq!(tree.parent(middle).unwrap(), Some(doc));
}

#[test]
fn test_unlink_makes_root() {
    let (mut tree, doc, paras) = doc_with_paragraphs(3);
    tree.unlink(paras[1]).unwrap();

    assert_eq!(tree.ownership(paras[1]).unwrap(), Ownership::Root);
    assert_eq!(tree.parent(paras[1]).unwrap(), None);
    assert_eq!(tree.next(paras[1]).unwrap(), None);
    assert_eq!(tree.children(doc).collect::<Vec<_>>(), vec![paras[0], paras[2]]);
    assert_eq!(tree.next(paras[0]).unwrap(), Some(paras[2]));

    // Unlinking a root is a no-op.
    tree.unlink(paras[1]).unwrap();
    assert_eq!(tree.ownership(paras[1]).unwrap(), Ownership::Root);
}

#[test]
fn test_move_between_parents() {
    let mut tree = Tree::new();
    let doc = tree.new_node(NodeKind::Document);
    let quote = tree.new_node(NodeKind::BlockQuote);
    let para = tree.new_node(NodeKind::Paragraph);
    tree.append_child(doc, quote).unwrap();
    tree.append_child(doc, para).unwrap();

    tree.append_child(quote, para).unwrap();
    assert_eq!(tree.children(doc).collect::<Vec<_>>(), vec![quote]);
    assert_eq!(tree.parent(para).unwrap(), Some(quote));
    assert_eq!(tree.ownership(para).unwrap(), Ownership::Attached);
}

#[test]
fn test_rejected_edits_leave_tree_unchanged() {
    let (mut tree, doc, paras) = doc_with_paragraphs(1);
    let text = tree.new_node(NodeKind::Text);
    let item = tree.new_node(NodeKind::Item);

    assert_eq!(
        tree.append_child(doc, text),
        Err(TreeError::InvalidEdit(EditError::CannotContain {
            parent: NodeKind::Document,
            child: NodeKind::Text
        }))
    );
    assert!(matches!(
        tree.append_child(paras[0], doc),
        Err(TreeError::InvalidEdit(_))
    ));
    assert_eq!(
        tree.append_child(doc, doc),
        Err(TreeError::InvalidEdit(EditError::SameNode))
    );
    assert_eq!(
        tree.insert_before(item, paras[0]),
        Err(TreeError::InvalidEdit(EditError::Detached))
    );

    assert_eq!(tree.children(doc).collect::<Vec<_>>(), paras);
    assert_eq!(tree.ownership(text).unwrap(), Ownership::Root);
    assert_eq!(tree.ownership(paras[0]).unwrap(), Ownership::Attached);
}

#[test]
fn test_cycle_is_rejected() {
    let mut tree = Tree::new();
    let outer = tree.new_node(NodeKind::BlockQuote);
    let inner = tree.new_node(NodeKind::BlockQuote);
    tree.append_child(outer, inner).unwrap();
    assert_eq!(
        tree.append_child(inner, outer),
        Err(TreeError::InvalidEdit(EditError::Cycle))
    );
    assert_eq!(tree.parent(outer).unwrap(), None);
}

#[test]
fn test_free_subtree_counts_every_node() {
    let (mut tree, doc, paras) = doc_with_paragraphs(3);
    let text = tree.new_node(NodeKind::Text);
    tree.append_child(paras[0], text).unwrap();

    assert_eq!(tree.subtree_size(doc).unwrap(), 5);
    assert_eq!(tree.free_subtree(doc).unwrap(), 5);
    assert_eq!(tree.freed_count(), 5);
    assert_eq!(tree.live_count(), 0);
    assert!(!tree.contains(text));
    assert_eq!(tree.kind(doc), Err(TreeError::StaleNode(doc)));
}

#[test]
fn test_free_attached_subtree_detaches_first() {
    let (mut tree, doc, paras) = doc_with_paragraphs(2);
    assert_eq!(tree.free_subtree(paras[0]).unwrap(), 1);
    assert_eq!(tree.children(doc).collect::<Vec<_>>(), vec![paras[1]]);
    assert_eq!(tree.previous(paras[1]).unwrap(), None);
}

#[test]
fn test_stale_ids_are_errors() {
    let mut tree = Tree::new();
    let a = tree.new_node(NodeKind::Paragraph);
    tree.free_subtree(a).unwrap();
    let b = tree.new_node(NodeKind::Paragraph);

    assert_eq!(tree.parent(a), Err(TreeError::StaleNode(a)));
    assert!(tree.unlink(a).is_err());
    assert!(tree.contains(b));
}

#[test]
fn test_roots_and_depth() {
    let (mut tree, doc, paras) = doc_with_paragraphs(1);
    let orphan = tree.new_node(NodeKind::Hrule);
    let text = tree.new_node(NodeKind::Text);
    tree.append_child(paras[0], text).unwrap();

    let mut roots: Vec<_> = tree.roots().collect();
    roots.sort_by_key(|id| id.index());
    assert_eq!(roots, vec![doc, orphan]);
    assert_eq!(tree.depth(text).unwrap(), 2);
    assert_eq!(tree.root_of(text).unwrap(), doc);
}
