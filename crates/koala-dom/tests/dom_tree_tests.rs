//! Tests for shadow trees, tree-order traversal and ranges.

use std::cmp::Ordering;

use koala_dom::{DomError, DomTree, NodeId, Position, Range, RangeError, ShadowRootKind, compare_positions};

/// `<div><p>one</p><p>two</p></div>` under the document.
fn two_paragraphs() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div");
    let first = tree.append_element(div, "p");
    let _ = tree.append_text(first, "one");
    let second = tree.append_element(div, "p");
    let _ = tree.append_text(second, "two");
    (tree, div, first, second)
}

// ========== shadow trees ==========

#[test]
fn test_attach_author_shadow_roots_youngest_last() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "span");
    let old = tree.attach_shadow(host, ShadowRootKind::Author).unwrap();
    let young = tree.attach_shadow(host, ShadowRootKind::Author).unwrap();

    assert_eq!(tree.youngest_author_shadow_root(host), Some(young));
    assert_eq!(tree.older_shadow_root(young), Some(old));
    assert_eq!(tree.older_shadow_root(old), None);
    assert_eq!(tree.shadow_host(young), Some(host));
    assert_eq!(tree.parent(young), None);
    assert_eq!(tree.parent_or_shadow_host(young), Some(host));
}

#[test]
fn test_user_agent_root_is_oldest_and_unique() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "input");
    let author = tree.attach_shadow(host, ShadowRootKind::Author).unwrap();
    let ua = tree.attach_shadow(host, ShadowRootKind::UserAgent).unwrap();

    assert_eq!(tree.shadow_roots(host), &[ua, author]);
    assert_eq!(tree.older_shadow_root(author), Some(ua));
    assert!(matches!(
        tree.attach_shadow(host, ShadowRootKind::UserAgent),
        Err(DomError::DuplicateUserAgentShadowRoot(_))
    ));
}

#[test]
fn test_shadow_root_needs_element_host() {
    let mut tree = DomTree::new();
    let text = tree.append_text(NodeId::ROOT, "x");
    assert!(matches!(
        tree.attach_shadow(text, ShadowRootKind::Author),
        Err(DomError::NotAnElement(_))
    ));
}

#[test]
fn test_nodes_inside_shadow_tree() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "span");
    let root = tree.attach_shadow(host, ShadowRootKind::Author).unwrap();
    let inner = tree.append_element(root, "b");
    let text = tree.append_text(inner, "hidden");

    assert!(tree.is_in_shadow_tree(text));
    assert!(!tree.is_in_shadow_tree(host));
    assert_eq!(tree.tree_root(text), root);
    assert_eq!(tree.containing_shadow_host(text), Some(host));
    assert!(!tree.is_descendant_of(text, host));
}

#[test]
fn test_text_control_builder() {
    let mut tree = DomTree::new();
    let input = tree.append_text_control(NodeId::ROOT, "input", "abc").unwrap();
    let root = tree.user_agent_shadow_root(input).unwrap();
    let editor = tree.first_child(root).unwrap();
    assert!(tree.has_tag(editor, "div"));
    assert_eq!(tree.attribute(input, "value"), Some("abc"));
}

// ========== traversal ==========

#[test]
fn test_next_in_pre_order() {
    let (tree, div, first, second) = two_paragraphs();
    let one = tree.first_child(first).unwrap();
    assert_eq!(tree.next_in_pre_order(div), Some(first));
    assert_eq!(tree.next_in_pre_order(first), Some(one));
    assert_eq!(tree.next_in_pre_order(one), Some(second));
    assert_eq!(tree.next_skipping_children(first), Some(second));
    assert_eq!(tree.next_skipping_children(div), None);
}

#[test]
fn test_node_index_and_child_at() {
    let (tree, div, first, second) = two_paragraphs();
    assert_eq!(tree.node_index(first), 0);
    assert_eq!(tree.node_index(second), 1);
    assert_eq!(tree.child_at(div, 1), Some(second));
    assert_eq!(tree.child_at(div, 2), None);
}

#[test]
fn test_max_offset_counts_scalar_values() {
    let mut tree = DomTree::new();
    let text = tree.append_text(NodeId::ROOT, "héllo");
    assert_eq!(tree.max_offset(text), 5);
    assert!(tree.offset_in_characters(text));
    assert_eq!(tree.max_offset(NodeId::ROOT), 1);
}

// ========== ranges ==========

#[test]
fn test_range_new_validates_order() {
    let (tree, div, ..) = two_paragraphs();
    let start = Position::new(div, 2);
    let end = Position::new(div, 0);
    assert_eq!(Range::new(&tree, start, end), Err(RangeError::WrongDocumentOrder));
    assert!(Range::new(&tree, end, start).is_ok());
}

#[test]
fn test_range_new_validates_offsets() {
    let (tree, div, ..) = two_paragraphs();
    assert_eq!(
        Range::new(&tree, Position::new(div, 0), Position::new(div, 3)),
        Err(RangeError::IndexSize { offset: 3, max: 2 })
    );
    assert_eq!(
        Range::new(&tree, Position::new(NodeId(99), 0), Position::new(div, 0)),
        Err(RangeError::UnknownNode(NodeId(99)))
    );
}

#[test]
fn test_compare_positions_descendant_between_offsets() {
    let (tree, div, first, _) = two_paragraphs();
    let one = tree.first_child(first).unwrap();
    let inside = Position::new(one, 2);
    assert_eq!(compare_positions(&tree, Position::new(div, 0), inside), Ordering::Less);
    assert_eq!(compare_positions(&tree, inside, Position::new(div, 1)), Ordering::Less);
    assert_eq!(compare_positions(&tree, inside, inside), Ordering::Equal);
}

#[test]
fn test_compare_positions_shadow_before_children() {
    let mut tree = DomTree::new();
    let host = tree.append_element(NodeId::ROOT, "span");
    let light = tree.append_text(host, "light");
    let root = tree.attach_shadow(host, ShadowRootKind::Author).unwrap();
    let shadow = tree.append_text(root, "shadow");
    assert_eq!(
        compare_positions(&tree, Position::new(shadow, 6), Position::new(light, 0)),
        Ordering::Less
    );
}

#[test]
fn test_first_node() {
    let (tree, div, first, second) = two_paragraphs();
    let one = tree.first_child(first).unwrap();
    let range = |container, offset| Range::collapsed_at(Position::new(container, offset));
    assert_eq!(range(one, 1).first_node(&tree), Some(one));
    assert_eq!(range(div, 1).first_node(&tree), Some(second));
    assert_eq!(range(first, 1).first_node(&tree), Some(second));
    assert_eq!(range(div, 2).first_node(&tree), None);
}

#[test]
fn test_set_start_past_end_collapses() {
    let (tree, div, ..) = two_paragraphs();
    let mut range = Range::select_node_contents(&tree, div);
    range.set_start(&tree, Position::new(NodeId::ROOT, 1));
    assert!(range.is_collapsed());
    assert_eq!(range.end, Position::new(NodeId::ROOT, 1));
}
