//! The render tree and its queries.

use std::collections::HashMap;

use koala_dom::{DomTree, NodeId, Position};

use crate::builder::LayoutBuilder;
use crate::metrics::{ApproximateFontMetrics, FontMetrics};
use crate::render_object::{FirstLetter, InlineTextBox, RenderKind, RenderObject, RenderText};
use crate::style::Visibility;

/// Layout configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Width available to lines, in px. `None` disables soft wrapping.
    pub available_width: Option<f32>,
    /// [§ 15.3.6](https://html.spec.whatwg.org/multipage/rendering.html)
    /// The `medium` font size in px.
    pub default_font_size: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            available_width: None,
            default_font_size: 16.0,
        }
    }
}

/// Layout results for a whole document, keyed by DOM node.
///
/// Nodes without an entry are not rendered: `display: none` subtrees,
/// comments, shadow roots and whitespace-only text swallowed at block
/// boundaries.
#[derive(Debug, Clone, Default)]
pub struct RenderTree {
    objects: HashMap<NodeId, RenderObject>,
    line_count: usize,
}

impl RenderTree {
    /// Lay out `dom` with approximate font metrics.
    #[must_use]
    pub fn build(dom: &DomTree, options: &LayoutOptions) -> Self {
        Self::build_with_metrics(dom, options, &ApproximateFontMetrics)
    }

    /// Lay out `dom`, measuring text with `metrics`.
    #[must_use]
    pub fn build_with_metrics(dom: &DomTree, options: &LayoutOptions, metrics: &dyn FontMetrics) -> Self {
        LayoutBuilder::new(dom, options, metrics).build()
    }

    pub(crate) const fn from_parts(objects: HashMap<NodeId, RenderObject>, line_count: usize) -> Self {
        RenderTree { objects, line_count }
    }

    /// The render object of `node`, if it is rendered.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&RenderObject> {
        self.objects.get(&node)
    }

    /// Whether `node` is rendered.
    #[must_use]
    pub fn has_renderer(&self, node: NodeId) -> bool {
        self.objects.contains_key(&node)
    }

    /// Text layout of a rendered text node.
    #[must_use]
    pub fn render_text(&self, node: NodeId) -> Option<&RenderText> {
        self.get(node).and_then(RenderObject::render_text)
    }

    /// Mutable text layout, for facts this layout does not derive itself
    /// (bidi reordering of boxes, for one).
    pub fn render_text_mut(&mut self, node: NodeId) -> Option<&mut RenderText> {
        match self.objects.get_mut(&node).map(|object| &mut object.kind) {
            Some(RenderKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Number of rendered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of lines laid out.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    /// [CSS Pseudo-Elements § 2.2](https://www.w3.org/TR/css-pseudo-4/#first-letter-pseudo)
    ///
    /// Style the first letter of the text node `node` as a `::first-letter`
    /// pseudo-element with the given visibility. "Punctuation ... that
    /// precedes or follows the first letter should be included", as do the
    /// collapsed spaces before it.
    ///
    /// Returns `false` when the node is not rendered text or has no letter.
    pub fn apply_first_letter(&mut self, node: NodeId, visibility: Visibility) -> bool {
        let Some(text) = self.render_text_mut(node) else {
            return false;
        };
        let Some(length) = first_letter_length(&text.text) else {
            return false;
        };
        let remaining = std::mem::take(&mut text.text_boxes);
        let mut boxes = text
            .first_letter
            .take()
            .map(|previous| previous.text_boxes)
            .unwrap_or_default();
        boxes.extend(remaining);
        let (letter_boxes, remaining_boxes) = split_boxes(&boxes, length);
        text.text_boxes = remaining_boxes;
        text.first_letter = Some(FirstLetter {
            length,
            text_boxes: letter_boxes,
            visibility,
        });
        true
    }

    /// The line a caret at `position` would sit on, or `None` when the
    /// position is not in rendered content.
    #[must_use]
    pub fn line_at(&self, dom: &DomTree, position: Position) -> Option<usize> {
        let container = self.get(position.container)?;
        if let Some(text) = container.render_text() {
            return Some(line_in_text(text, position.offset).unwrap_or(container.first_line));
        }
        let mut child = dom.child_at(position.container, position.offset);
        while let Some(node) = child {
            if let Some(object) = self.get(node) {
                return Some(match object.render_text() {
                    Some(text) => line_in_text(text, 0).unwrap_or(object.first_line),
                    None => object.first_line,
                });
            }
            child = dom.next_sibling(node);
        }
        Some(container.last_line)
    }

    /// Whether both positions are rendered on the same line.
    #[must_use]
    pub fn in_same_line(&self, dom: &DomTree, a: Position, b: Position) -> bool {
        match (self.line_at(dom, a), self.line_at(dom, b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

fn line_in_text(text: &RenderText, offset: usize) -> Option<usize> {
    let mut boxes: Vec<&InlineTextBox> = text.all_text_boxes().collect();
    boxes.sort_by_key(|b| b.start);
    boxes
        .iter()
        .find(|b| b.start <= offset && offset <= b.end())
        .or_else(|| boxes.iter().find(|b| b.start > offset))
        .or_else(|| boxes.last())
        .map(|b| b.line)
}

fn first_letter_length(text: &[char]) -> Option<usize> {
    let skippable = |c: char| c.is_whitespace() || is_punctuation(c);
    let letter = text.iter().position(|&c| !skippable(c))?;
    if !text[letter].is_alphanumeric() {
        return None;
    }
    let trailing = text[letter + 1..]
        .iter()
        .take_while(|&&c| is_punctuation(c))
        .count();
    Some(letter + 1 + trailing)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '\u{a1}' | '\u{ab}' | '\u{bb}' | '\u{bf}' | '\u{2018}'..='\u{201f}')
}

fn split_boxes(boxes: &[InlineTextBox], at: usize) -> (Vec<InlineTextBox>, Vec<InlineTextBox>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    for b in boxes {
        if b.end() <= at {
            before.push(*b);
        } else if b.start >= at {
            after.push(*b);
        } else {
            before.push(InlineTextBox {
                len: at - b.start,
                ..*b
            });
            after.push(InlineTextBox {
                start: at,
                len: b.end() - at,
                line: b.line,
            });
        }
    }
    (before, after)
}
