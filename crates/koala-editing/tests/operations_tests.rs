//! Tests for the whole-range operations: plain text, length and subranges.

use koala_dom::{DomTree, NodeId, Position, Range, compare_positions};
use koala_editing::{
    FindOptions, TextContext, TextIteratorBehavior, find_plain_text, plain_text, plain_text_with_max_length,
    range_length, subrange,
};
use koala_layout::{LayoutOptions, RenderTree};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

fn layout(json: &str) -> (DomTree, RenderTree) {
    let dom = DomTree::from_json(json).unwrap();
    let tree = RenderTree::build(&dom, &LayoutOptions::default());
    (dom, tree)
}

fn document(dom: &DomTree) -> Range {
    Range::select_node_contents(dom, NodeId::ROOT)
}

const TWO_DIVS: &str = r#"[{"tag": "div", "children": ["foo"]}, {"tag": "div", "children": ["bar"]}]"#;
const HELLO_WORLD: &str = r#"{"tag": "p", "children": ["Hello ", {"tag": "b", "id": "b", "children": ["world"]}]}"#;

// ========== plain text ==========

#[test]
fn test_plain_text_with_max_length() {
    let (dom, tree) = layout(TWO_DIVS);
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    assert_eq!(plain_text_with_max_length(ctx, &range, 5), "foo\nb");
    assert_eq!(plain_text_with_max_length(ctx, &range, 0), "");
    assert_eq!(plain_text_with_max_length(ctx, &range, 100), "foo\nbar");
}

// ========== range length ==========

#[test]
fn test_range_length_for_selection_preservation() {
    let (dom, tree) = layout(r#"{"tag": "div", "children": ["x", {"tag": "img"}]}"#);
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    assert_eq!(range_length(ctx, &range, false), 1);
    assert_eq!(range_length(ctx, &range, true), 2);
}

#[test]
fn test_range_length_counts_collapsed_text() {
    let (dom, tree) = layout(r#"{"tag": "div", "children": ["a   b"]}"#);
    assert_eq!(range_length(TextContext::new(&dom, &tree), &document(&dom), false), 3);

    let (dom, tree) = layout(HELLO_WORLD);
    assert_eq!(range_length(TextContext::new(&dom, &tree), &document(&dom), false), 11);
}

// ========== subrange ==========

#[test]
fn test_subrange_maps_offsets_to_nodes() {
    let (dom, tree) = layout(HELLO_WORLD);
    let ctx = TextContext::new(&dom, &tree);
    let world = subrange(ctx, &document(&dom), 6, 5);
    let text = dom.first_child(dom.get_element_by_id("b").unwrap()).unwrap();
    assert_eq!(world.start, Position::new(text, 0));
    assert_eq!(world.end, Position::new(text, 5));
    assert_eq!(plain_text(ctx, &world, TextIteratorBehavior::empty()), "world");
}

#[test]
fn test_subrange_of_whole_text_reproduces_it() {
    let (dom, tree) = layout(TWO_DIVS);
    let ctx = TextContext::new(&dom, &tree);
    let whole = subrange(ctx, &document(&dom), 0, 7);
    assert_eq!(plain_text(ctx, &whole, TextIteratorBehavior::empty()), "foo\nbar");
}

#[test]
fn test_subrange_keeps_newlines_at_block_boundaries() {
    let (dom, tree) = layout(
        r#"[{"tag": "div", "id": "a", "children": ["foo   bar"]}, {"tag": "div", "id": "b", "children": ["baz  qux"]}]"#,
    );
    let ctx = TextContext::new(&dom, &tree);
    let a = dom.first_child(dom.get_element_by_id("a").unwrap()).unwrap();
    let b = dom.first_child(dom.get_element_by_id("b").unwrap()).unwrap();

    let ends_at_block = Range::new(&dom, Position::new(a, 0), Position::new(b, 0)).unwrap();
    assert_eq!(plain_text(ctx, &ends_at_block, TextIteratorBehavior::empty()), "foo bar\n");
    assert_eq!(range_length(ctx, &ends_at_block, false), 8);
    let rebuilt = subrange(ctx, &ends_at_block, 0, 8);
    assert_eq!(plain_text(ctx, &rebuilt, TextIteratorBehavior::empty()), "foo bar\n");

    let starts_at_block = Range::new(&dom, Position::new(a, 9), Position::new(b, 8)).unwrap();
    assert_eq!(plain_text(ctx, &starts_at_block, TextIteratorBehavior::empty()), "\nbaz qux");
    let rebuilt = subrange(ctx, &starts_at_block, 0, 8);
    assert_eq!(plain_text(ctx, &rebuilt, TextIteratorBehavior::empty()), "\nbaz qux");
}

#[test]
fn test_subrange_past_end_collapses() {
    let (dom, tree) = layout(TWO_DIVS);
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    assert!(subrange(ctx, &range, 50, 3).is_collapsed());
}

// ========== properties ==========

/// Divs of short words, each word its own text node followed by a space.
#[derive(Debug, Clone)]
struct Doc(Vec<Vec<String>>);

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        let letters = ['a', 'b', 'c', 'd', 'e'];
        let divs = usize::arbitrary(g) % 4 + 1;
        let doc = (0..divs)
            .map(|_| {
                let words = usize::arbitrary(g) % 5 + 1;
                (0..words)
                    .map(|_| {
                        let len = usize::arbitrary(g) % 4 + 1;
                        (0..len).map(|_| *g.choose(&letters).unwrap()).collect()
                    })
                    .collect()
            })
            .collect();
        Doc(doc)
    }
}

impl Doc {
    fn build(&self) -> (DomTree, RenderTree) {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, "html");
        let body = dom.append_element(html, "body");
        for words in &self.0 {
            let div = dom.append_element(body, "div");
            for word in words {
                let _ = dom.append_text(div, &format!("{word} "));
            }
        }
        let tree = RenderTree::build(&dom, &LayoutOptions::default());
        (dom, tree)
    }

    fn expected_text(&self) -> String {
        self.0.iter().map(|words| words.join(" ")).collect::<Vec<_>>().join("\n")
    }
}

#[quickcheck]
fn prop_plain_text_joins_words_and_blocks(doc: Doc) -> bool {
    let (dom, tree) = doc.build();
    plain_text(TextContext::new(&dom, &tree), &document(&dom), TextIteratorBehavior::empty()) == doc.expected_text()
}

#[quickcheck]
fn prop_range_length_matches_plain_text(doc: Doc) -> bool {
    let (dom, tree) = doc.build();
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    range_length(ctx, &range, false) == plain_text(ctx, &range, TextIteratorBehavior::empty()).chars().count()
}

#[quickcheck]
fn prop_every_word_is_found(doc: Doc) -> bool {
    let (dom, tree) = doc.build();
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    doc.0.iter().flatten().all(|word| {
        let found = find_plain_text(ctx, &range, word, FindOptions::empty()).unwrap();
        !found.is_collapsed() && plain_text(ctx, &found, TextIteratorBehavior::empty()) == *word
    })
}

#[quickcheck]
fn prop_whole_subrange_has_same_text(doc: Doc) -> bool {
    let (dom, tree) = doc.build();
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    let length = range_length(ctx, &range, false);
    let whole = subrange(ctx, &range, 0, length);
    plain_text(ctx, &whole, TextIteratorBehavior::empty()) == plain_text(ctx, &range, TextIteratorBehavior::empty())
}

/// Every boundary point under `node`, in tree order.
fn positions(dom: &DomTree, node: NodeId, out: &mut Vec<Position>) {
    for offset in 0..=dom.max_offset(node) {
        out.push(Position::new(node, offset));
    }
    for &child in dom.children(node) {
        positions(dom, child, out);
    }
}

#[quickcheck]
fn prop_any_subrange_round_trips(doc: Doc, first: usize, second: usize) -> bool {
    let (dom, tree) = doc.build();
    let ctx = TextContext::new(&dom, &tree);
    let html = dom.first_child(NodeId::ROOT).unwrap();
    let body = dom.first_child(html).unwrap();
    let mut candidates = Vec::new();
    positions(&dom, body, &mut candidates);

    let mut start = candidates[first % candidates.len()];
    let mut end = candidates[second % candidates.len()];
    if compare_positions(&dom, start, end).is_gt() {
        std::mem::swap(&mut start, &mut end);
    }
    let range = Range::new(&dom, start, end).unwrap();
    let length = range_length(ctx, &range, false);
    let rebuilt = subrange(ctx, &range, 0, length);
    plain_text(ctx, &rebuilt, TextIteratorBehavior::empty()) == plain_text(ctx, &range, TextIteratorBehavior::empty())
}

#[quickcheck]
fn prop_search_is_repeatable(doc: Doc, pick: usize) -> bool {
    let (dom, tree) = doc.build();
    let ctx = TextContext::new(&dom, &tree);
    let range = document(&dom);
    let words: Vec<&String> = doc.0.iter().flatten().collect();
    let word = words[pick % words.len()];
    let options = FindOptions::CASE_INSENSITIVE | FindOptions::AT_WORD_STARTS;
    find_plain_text(ctx, &range, word, options) == find_plain_text(ctx, &range, word, options)
}
