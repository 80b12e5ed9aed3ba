//! Tests for backwards iteration, the character cursors and word-aware
//! chunking.

use koala_common::warning::has_warned;
use koala_dom::{DomTree, NodeId, Position, Range};
use koala_editing::{
    BackwardsCharacterIterator, BackwardsTextIterator, CharacterIterator, TextContext, TextIteratorBehavior,
    WordAwareIterator,
};
use koala_layout::{LayoutOptions, RenderTree};

fn layout(json: &str) -> (DomTree, RenderTree) {
    let dom = DomTree::from_json(json).unwrap();
    let tree = RenderTree::build(&dom, &LayoutOptions::default());
    (dom, tree)
}

fn text_node(dom: &DomTree, id: &str) -> NodeId {
    dom.first_child(dom.get_element_by_id(id).unwrap()).unwrap()
}

fn backwards_runs(dom: &DomTree, tree: &RenderTree, range: &Range) -> Vec<String> {
    let mut it = BackwardsTextIterator::new(TextContext::new(dom, tree), range, TextIteratorBehavior::empty());
    let mut runs = Vec::new();
    while !it.at_end() {
        runs.push(it.text().iter().collect());
        it.advance();
    }
    runs
}

// ========== backwards ==========

#[test]
fn test_backwards_single_text_node() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["abc"]}"#);
    let text = text_node(&dom, "d");
    let range = Range::new(&dom, Position::new(text, 0), Position::new(text, 3)).unwrap();

    let it = BackwardsTextIterator::new(TextContext::new(&dom, &tree), &range, TextIteratorBehavior::empty());
    assert_eq!(it.text(), ['a', 'b', 'c']);
    assert_eq!(it.range(), range);
    assert_eq!(backwards_runs(&dom, &tree, &range), vec!["abc"]);
}

#[test]
fn test_backwards_runs_in_reverse_order() {
    let (dom, tree) = layout(r#"[{"tag": "div", "children": ["foo"]}, {"tag": "div", "children": ["bar"]}]"#);
    let range = Range::select_node_contents(&dom, NodeId::ROOT);
    let runs = backwards_runs(&dom, &tree, &range);
    assert_eq!(runs[0], "bar");

    let text: String = runs.iter().rev().map(String::as_str).collect();
    let lines: Vec<&str> = text.split('\n').filter(|line| !line.is_empty()).collect();
    assert_eq!(lines, vec!["foo", "bar"]);
}

#[test]
fn test_backwards_collapsed_range_is_empty() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["abc"]}"#);
    let text = text_node(&dom, "d");
    let range = Range::collapsed_at(Position::new(text, 2));
    assert!(backwards_runs(&dom, &tree, &range).is_empty());
}

#[test]
fn test_backwards_range_starting_after_its_end_is_at_end() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["Hello world"]}"#);
    let text = text_node(&dom, "d");
    let inverted = Range { start: Position::new(text, 4), end: Position::new(text, 1) };

    let it = BackwardsTextIterator::new(TextContext::new(&dom, &tree), &inverted, TextIteratorBehavior::empty());
    assert!(it.at_end());
    assert!(has_warned("Editing", "backwards text iterator range starts after it ends"));
}

// ========== character iterator ==========

#[test]
fn test_character_iterator_crosses_runs() {
    let (dom, tree) = layout(r#"{"tag": "p", "children": ["Hello ", {"tag": "b", "id": "b", "children": ["world"]}]}"#);
    let range = Range::select_node_contents(&dom, NodeId::ROOT);
    let mut it = CharacterIterator::new(TextContext::new(&dom, &tree), &range, TextIteratorBehavior::empty());
    assert!(it.at_break());
    assert_eq!(it.character_offset(), 0);

    it.advance(6);
    let world = text_node(&dom, "b");
    assert_eq!(it.character_offset(), 6);
    assert_eq!(it.text().iter().collect::<String>(), "world");
    assert_eq!(it.range(), Range::new(&dom, Position::new(world, 0), Position::new(world, 1)).unwrap());

    it.advance(1);
    assert!(!it.at_break());
    assert_eq!(it.text().iter().collect::<String>(), "orld");
    assert_eq!(it.range().start, Position::new(world, 1));

    it.advance(100);
    assert!(it.at_end());
    assert!(it.at_break());
    assert_eq!(it.character_offset(), 11);
}

#[test]
fn test_character_iterator_within_one_run() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["Hello world"]}"#);
    let text = text_node(&dom, "d");
    let range = Range::select_node_contents(&dom, NodeId::ROOT);
    let mut it = CharacterIterator::new(TextContext::new(&dom, &tree), &range, TextIteratorBehavior::empty());
    it.advance(6);
    assert_eq!(it.length(), 5);
    assert_eq!(it.range(), Range::new(&dom, Position::new(text, 6), Position::new(text, 7)).unwrap());
}

#[test]
fn test_backwards_character_iterator() {
    let (dom, tree) = layout(r#"{"tag": "div", "id": "d", "children": ["abc"]}"#);
    let text = text_node(&dom, "d");
    let range = Range::new(&dom, Position::new(text, 0), Position::new(text, 3)).unwrap();
    let mut it =
        BackwardsCharacterIterator::new(TextContext::new(&dom, &tree), &range, TextIteratorBehavior::empty());
    assert_eq!(it.range(), Range::new(&dom, Position::new(text, 2), Position::new(text, 3)).unwrap());

    it.advance(1);
    assert_eq!(it.character_offset(), 1);
    assert_eq!(it.range(), Range::new(&dom, Position::new(text, 1), Position::new(text, 2)).unwrap());

    it.advance(2);
    assert_eq!(it.character_offset(), 3);
    assert!(it.at_end());
}

// ========== word aware ==========

fn chunks(json: &str) -> Vec<String> {
    let (dom, tree) = layout(json);
    let range = Range::select_node_contents(&dom, NodeId::ROOT);
    let mut it = WordAwareIterator::new(TextContext::new(&dom, &tree), &range);
    let mut chunks = Vec::new();
    while !it.at_end() {
        chunks.push(it.text().iter().collect());
        it.advance();
    }
    chunks
}

#[test]
fn test_word_aware_keeps_separate_words() {
    assert_eq!(
        chunks(r#"{"tag": "p", "children": ["Hello ", {"tag": "b", "children": ["world"]}]}"#),
        vec!["Hello ", "world"]
    );
}

#[test]
fn test_word_aware_joins_split_word() {
    let json = r#"{"tag": "div", "id": "d", "children": ["w", {"tag": "b", "children": ["or"]}, {"tag": "span", "id": "s", "children": ["d is"]}]}"#;
    assert_eq!(chunks(json), vec!["word is"]);

    let (dom, tree) = layout(json);
    let range = Range::select_node_contents(&dom, NodeId::ROOT);
    let it = WordAwareIterator::new(TextContext::new(&dom, &tree), &range);
    assert_eq!(it.length(), 7);
    assert_eq!(it.range().start, Position::new(text_node(&dom, "d"), 0));
    assert_eq!(it.range().end, Position::new(text_node(&dom, "s"), 4));
}
