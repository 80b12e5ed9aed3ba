//! Integration tests for render tree construction.

use koala_dom::{DomTree, NodeId, Position};
use koala_layout::{InlineTextBox, LayoutOptions, RenderKind, RenderTree, Visibility};

fn layout(json: &str) -> (DomTree, RenderTree) {
    let dom = DomTree::from_json(json).unwrap();
    let tree = RenderTree::build(&dom, &LayoutOptions::default());
    (dom, tree)
}

fn by_id(dom: &DomTree, id: &str) -> NodeId {
    dom.get_element_by_id(id).unwrap()
}

fn first_text(dom: &DomTree, id: &str) -> NodeId {
    dom.first_child(by_id(dom, id)).unwrap()
}

fn boxes(tree: &RenderTree, node: NodeId) -> Vec<(usize, usize)> {
    tree.render_text(node)
        .unwrap()
        .text_boxes
        .iter()
        .map(|b| (b.start, b.len))
        .collect()
}

// ========== whitespace collapsing ==========

#[test]
fn test_collapsible_spaces_inside_text() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["a   b"]}"#);
    assert_eq!(boxes(&tree, first_text(&dom, "d")), vec![(0, 2), (4, 1)]);
}

#[test]
fn test_leading_and_trailing_spaces_removed() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["  foo  "]}"#);
    assert_eq!(boxes(&tree, first_text(&dom, "d")), vec![(2, 3)]);
}

#[test]
fn test_space_collapses_across_elements() {
    let (dom, tree) = layout(
        r#"{"tag": "p", "id": "p", "children": ["Hello ", {"tag": "b", "id": "b", "children": [" world"]}]}"#,
    );
    assert_eq!(boxes(&tree, first_text(&dom, "p")), vec![(0, 6)]);
    assert_eq!(boxes(&tree, first_text(&dom, "b")), vec![(1, 5)]);
}

#[test]
fn test_trailing_space_trimmed_in_earlier_node() {
    let (dom, tree) = layout(
        r#"{"tag": "div", "children": [{"tag": "span", "id": "s", "children": ["foo "]}, {"tag": "div", "children": ["bar"]}]}"#,
    );
    assert_eq!(boxes(&tree, first_text(&dom, "s")), vec![(0, 3)]);
}

#[test]
fn test_whitespace_between_blocks_is_not_rendered() {
    let (dom, tree) = layout(
        r#"{"tag": "body", "id": "body", "children": [{"tag": "div", "children": ["foo"]}, "\n  ", {"tag": "div", "children": ["bar"]}]}"#,
    );
    let whitespace = dom.children(by_id(&dom, "body"))[1];
    assert!(!tree.has_renderer(whitespace));
}

#[test]
fn test_pre_preserves_everything() {
    let (dom, tree) = layout(r#"{"tag": "pre", "id": "pre", "children": ["a  b\nc"]}"#);
    let text = tree.render_text(first_text(&dom, "pre")).unwrap();
    assert_eq!(
        text.text_boxes,
        vec![
            InlineTextBox { start: 0, len: 5, line: 0 },
            InlineTextBox { start: 5, len: 1, line: 1 },
        ]
    );
}

#[test]
fn test_wrapping_trims_space_at_break() {
    let dom = DomTree::from_json(r#"{"tag": "div", "id": "d", "children": ["aaaa bbbb"]}"#).unwrap();
    let options = LayoutOptions {
        available_width: Some(60.0),
        ..LayoutOptions::default()
    };
    let tree = RenderTree::build(&dom, &options);
    let text = tree.render_text(first_text(&dom, "d")).unwrap();
    assert_eq!(text.text_boxes.len(), 2);
    assert_eq!((text.text_boxes[0].start, text.text_boxes[0].len), (0, 4));
    assert_eq!((text.text_boxes[1].start, text.text_boxes[1].len), (5, 4));
    assert_ne!(text.text_boxes[0].line, text.text_boxes[1].line);
}

#[test]
fn test_text_transform_keeps_original() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "style": "text-transform: uppercase", "children": ["abc"]}"#);
    let text = tree.render_text(first_text(&dom, "d")).unwrap();
    assert_eq!(text.text.iter().collect::<String>(), "ABC");
    assert_eq!(text.original_text.iter().collect::<String>(), "abc");
}

// ========== boxes ==========

#[test]
fn test_display_none_subtree_not_rendered() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "style": "display: none", "children": ["gone"]}"#);
    assert!(!tree.has_renderer(by_id(&dom, "d")));
    assert!(!tree.has_renderer(first_text(&dom, "d")));
}

#[test]
fn test_classification() {
    let (dom, tree) = layout(
        r#"[{"tag": "img", "id": "img", "attrs": {"alt": "logo"}},
            {"tag": "br", "id": "br"},
            {"tag": "input", "id": "input", "value": "typed"},
            {"tag": "input", "id": "check", "attrs": {"type": "checkbox"}},
            {"tag": "iframe", "id": "frame"}]"#,
    );
    let image = tree.get(by_id(&dom, "img")).unwrap();
    assert!(image.is_image());
    assert_eq!(image.alt_text().unwrap().iter().collect::<String>(), "logo");
    assert!(tree.get(by_id(&dom, "br")).unwrap().is_br());
    assert!(tree.get(by_id(&dom, "input")).unwrap().is_text_control());
    assert!(matches!(tree.get(by_id(&dom, "check")).unwrap().kind, RenderKind::InlineBlock));
    assert!(tree.get(by_id(&dom, "frame")).unwrap().is_widget());
}

#[test]
fn test_text_control_renders_user_agent_tree() {
    let (dom, tree) = layout(r#"{"tag": "input", "id": "input", "value": "typed"}"#);
    let input = by_id(&dom, "input");
    let root = dom.user_agent_shadow_root(input).unwrap();
    let editor = dom.first_child(root).unwrap();
    let text = dom.first_child(editor).unwrap();
    assert!(tree.has_renderer(text));
    assert!(!tree.has_renderer(root));
}

#[test]
fn test_author_shadow_content_rendered() {
    let (dom, tree) = layout(
        r#"{"tag": "span", "id": "host", "children": ["light"], "shadow": [{"mode": "author", "children": ["shadow"]}]}"#,
    );
    let host = by_id(&dom, "host");
    let root = dom.youngest_author_shadow_root(host).unwrap();
    assert!(tree.has_renderer(dom.first_child(root).unwrap()));
    assert!(tree.has_renderer(dom.first_child(host).unwrap()));
}

#[test]
fn test_table_cell_positions() {
    let (dom, tree) = layout(
        r#"{"tag": "table", "children": [{"tag": "tbody", "children": [
            {"tag": "tr", "children": [{"tag": "td", "id": "a"}, {"tag": "td", "id": "b"}]},
            {"tag": "tr", "children": [{"tag": "td", "id": "c"}, {"tag": "td", "id": "d"}, {"tag": "td", "id": "e"}]}
        ]}]}"#,
    );
    let cell = |id| *tree.get(by_id(&dom, id)).unwrap().table_cell().unwrap();
    assert!(!cell("a").has_cell_before());
    assert!(cell("b").has_cell_before());
    assert!(!cell("b").has_cell_above);
    assert!(cell("d").has_cell_above);
    assert!(!cell("e").has_cell_above);
    assert_eq!(cell("e").row, 1);
}

#[test]
fn test_heights_and_margins() {
    let (dom, tree) = layout(
        r#"[{"tag": "p", "id": "p", "children": ["text"]},
            {"tag": "div", "id": "empty"},
            {"tag": "div", "id": "clip", "style": "height: 0; overflow: hidden", "children": ["hidden"]}]"#,
    );
    let p = tree.get(by_id(&dom, "p")).unwrap();
    assert!(p.height > 0.0);
    assert!((p.collapsed_margin_after - 16.0).abs() < f32::EPSILON);
    let empty = tree.get(by_id(&dom, "empty")).unwrap();
    assert!(empty.height.abs() < f32::EPSILON);
    let clip = tree.get(by_id(&dom, "clip")).unwrap();
    assert!(clip.has_overflow_clip());
    assert!(clip.content_box_is_empty);
}

#[test]
fn test_first_letter_splits_boxes() {
    let (dom, mut tree) = layout(r#"{"tag": "p", "id": "p", "children": ["\"Hello world"]}"#);
    let text = first_text(&dom, "p");
    assert!(tree.apply_first_letter(text, Visibility::Visible));
    let render_text = tree.render_text(text).unwrap();
    let letter = render_text.first_letter.as_ref().unwrap();
    assert_eq!(letter.length, 2);
    assert_eq!(letter.text_boxes[0].end(), 2);
    assert_eq!(render_text.text_boxes[0].start, 2);
    assert_eq!(render_text.fragment_start(), 2);
}

// ========== lines ==========

#[test]
fn test_line_queries() {
    let (dom, tree) = layout(
        r#"{"tag": "body", "id": "body", "children": [
            {"tag": "div", "id": "one", "children": ["foo ", {"tag": "b", "id": "b", "children": ["bar"]}]},
            {"tag": "div", "id": "two", "children": ["baz"]}]}"#,
    );
    let foo = first_text(&dom, "one");
    let bar = first_text(&dom, "b");
    let baz = first_text(&dom, "two");
    assert!(tree.in_same_line(&dom, Position::new(foo, 0), Position::new(bar, 2)));
    assert!(!tree.in_same_line(&dom, Position::new(foo, 0), Position::new(baz, 0)));
    let body = by_id(&dom, "body");
    assert_eq!(tree.line_at(&dom, Position::new(body, 1)), tree.line_at(&dom, Position::new(baz, 0)));
}
