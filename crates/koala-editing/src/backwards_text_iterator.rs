//! Backwards text iteration, for finding boundaries before a position.
//!
//! Unlike [`TextIterator`](crate::TextIterator) this walks the light tree only
//! and makes no attempt at exact positioning of synthesized characters: every
//! block or cell boundary is reported as a newline, which is enough to break
//! words, sentences and paragraphs.

use koala_common::warning::warn_once;
use koala_dom::{NodeId, Position, Range, compare_positions};
use koala_layout::RenderObject;

use crate::behavior::{IteratorConfig, TextIteratorBehavior};
use crate::bit_stack::BitStack;
use crate::clipping::{push_fully_clipped_state, set_up_fully_clipped_stack};
use crate::context::TextContext;
use crate::heuristics::{
    can_have_children_for_editing, is_in_form_control, max_offset_including_collapsed_spaces,
    should_emit_newline_after_node, should_emit_newline_before_node, should_emit_newline_for_node,
    should_emit_tab_before_node,
};
use crate::run::{LazyRange, RunText};

/// Iterates the text of a range from its end towards its start.
///
/// Runs come out in reverse document order, but the characters of each run
/// are in document order.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackwardsTextIterator<'a> {
    ctx: TextContext<'a>,
    config: IteratorConfig,

    node: Option<NodeId>,
    offset: usize,
    handled_node: bool,
    handled_children: bool,
    fully_clipped_stack: BitStack,

    start: Position,
    end: Position,

    position: Option<LazyRange>,
    text: RunText<'a>,

    have_passed_start_node: bool,
    should_handle_first_letter: bool,
    should_stop: bool,
}

impl<'a> BackwardsTextIterator<'a> {
    /// Start iterating `range` backwards from its end.
    #[must_use]
    pub fn new(ctx: TextContext<'a>, range: &Range, behavior: TextIteratorBehavior) -> Self {
        let dom = ctx.dom;
        let mut it = BackwardsTextIterator {
            ctx,
            config: IteratorConfig::from(behavior),
            node: None,
            offset: 0,
            handled_node: false,
            handled_children: false,
            fully_clipped_stack: BitStack::new(),
            start: range.start,
            end: range.end,
            position: None,
            text: RunText::None,
            have_passed_start_node: false,
            should_handle_first_letter: false,
            should_stop: false,
        };
        if !dom.contains(range.start.container) || !dom.contains(range.end.container) {
            warn_once("Editing", "backwards text iterator given a range outside the document");
            return it;
        }
        if compare_positions(dom, range.start, range.end).is_gt() {
            warn_once("Editing", "backwards text iterator range starts after it ends");
            return it;
        }

        // Boundary points between children are moved onto the children.
        let mut start = range.start;
        if !dom.offset_in_characters(start.container)
            && let Some(child) = dom.child_at(start.container, start.offset)
        {
            start = Position::new(child, 0);
        }
        let mut end = range.end;
        if !dom.offset_in_characters(end.container)
            && end.offset > 0
            && let Some(child) = dom.child_at(end.container, end.offset - 1)
        {
            end = Position::new(child, dom.max_offset(child));
        }

        set_up_fully_clipped_stack(&mut it.fully_clipped_stack, ctx, end.container);
        it.node = Some(end.container);
        it.offset = end.offset;
        it.handled_children = end.offset == 0;
        it.start = start;
        it.end = end;
        it.advance();
        it
    }

    /// Whether iteration is over.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.position.is_none() || self.should_stop
    }

    /// Number of characters in the current run.
    #[must_use]
    pub fn length(&self) -> usize {
        self.text.len()
    }

    /// Characters of the current run, in document order.
    #[must_use]
    pub fn text(&self) -> &[char] {
        self.text.as_slice()
    }

    /// The document range of the current run, or the collapsed start of the
    /// iterated range once iteration is over.
    #[must_use]
    pub fn range(&self) -> Range {
        match &self.position {
            Some(position) => position.resolve(self.ctx.dom),
            None => Range::collapsed_at(self.start),
        }
    }

    /// Produce the previous run.
    pub fn advance(&mut self) {
        if self.should_stop {
            return;
        }
        let dom = self.ctx.dom;
        if self.config.stops_on_form_controls && self.node.is_some_and(|node| is_in_form_control(dom, node)) {
            self.should_stop = true;
            return;
        }

        self.position = None;
        self.text = RunText::None;

        while let Some(node) = self.node {
            if self.have_passed_start_node {
                break;
            }

            // [node, 0] as the end covers none of the node.
            if !self.handled_node && !(node == self.end.container && self.end.offset == 0) {
                match self.ctx.renderer(node) {
                    Some(renderer) if renderer.is_text() && dom.is_text(node) => {
                        if self.is_visible(renderer) && self.offset > 0 {
                            self.handled_node = self.handle_text_node(node, renderer);
                        }
                    }
                    Some(renderer) if renderer.is_image() || renderer.is_widget() => {
                        if self.is_visible(renderer) && self.offset > 0 {
                            self.handled_node = self.handle_replaced_element(node);
                        }
                    }
                    _ => self.handled_node = self.handle_non_text_node(node),
                }
                if self.position.is_some() {
                    return;
                }
            }

            if !self.handled_children && dom.has_children(node) {
                if let Some(last) = dom.last_child(node) {
                    self.node = Some(last);
                    push_fully_clipped_state(&mut self.fully_clipped_stack, self.ctx, last);
                }
            } else {
                // Exit empty containers as we pass over them, and the
                // container the range ended at offset 0 of.
                if !self.handled_node
                    && can_have_children_for_editing(dom, node)
                    && dom.parent(node).is_some()
                    && (dom.last_child(node).is_none() || (node == self.end.container && self.end.offset == 0))
                {
                    self.exit_node(node);
                    if self.position.is_some() {
                        self.handled_node = true;
                        self.handled_children = true;
                        return;
                    }
                }

                // Exit every other container.
                while let Some(current) = self.node {
                    if dom.prev_sibling(current).is_some() {
                        break;
                    }
                    if !self.advance_respecting_range(dom.parent_or_shadow_host(current)) {
                        break;
                    }
                    self.fully_clipped_stack.pop();
                    if let Some(parent) = self.node {
                        self.exit_node(parent);
                    }
                    if self.position.is_some() {
                        self.handled_node = true;
                        self.handled_children = true;
                        return;
                    }
                }

                self.fully_clipped_stack.pop();
                let previous = self.node.and_then(|current| dom.prev_sibling(current));
                if self.advance_respecting_range(previous) {
                    if let Some(previous) = self.node {
                        push_fully_clipped_state(&mut self.fully_clipped_stack, self.ctx, previous);
                    }
                } else {
                    self.node = None;
                }
            }

            // Trailing collapsed whitespace counts for boundary detection.
            self.offset = self
                .node
                .map_or(0, |node| max_offset_including_collapsed_spaces(self.ctx, node));
            self.handled_node = false;
            self.handled_children = false;
            if self.position.is_some() {
                return;
            }
        }
    }

    fn is_visible(&self, renderer: &RenderObject) -> bool {
        (renderer.is_visible() || self.config.ignores_style_visibility) && !self.fully_clipped_stack.top()
    }

    /// Where the run in the current text node starts, switching between the
    /// first-letter part and the rest of the node as needed.
    fn handle_first_letter(&mut self, node: NodeId, fragment_start: Option<usize>) -> usize {
        let start = if node == self.start.container {
            self.start.offset
        } else {
            0
        };
        let Some(fragment_start) = fragment_start else {
            return start;
        };
        if start >= fragment_start {
            debug_assert!(!self.should_handle_first_letter);
            return start;
        }
        if !self.should_handle_first_letter && fragment_start < self.offset {
            // The remaining fragment first; the letter on the next call.
            self.should_handle_first_letter = true;
            return fragment_start;
        }
        self.should_handle_first_letter = false;
        self.offset = self.offset.min(fragment_start);
        start
    }

    fn handle_text_node(&mut self, node: NodeId, renderer: &'a RenderObject) -> bool {
        let Some(text) = renderer.render_text() else {
            return true;
        };
        if text.all_text_boxes().next().is_none() && !text.is_empty() {
            return true;
        }

        let fragment_start = text.first_letter.as_ref().map(|letter| letter.length);
        let run_start = self.handle_first_letter(node, fragment_start);
        let run_end = self.offset.min(text.len());
        if run_start >= run_end {
            debug_assert!(!self.should_handle_first_letter);
            return true;
        }

        self.offset = run_start;
        self.position = Some(LazyRange::absolute(node, run_start, run_end));
        self.text = RunText::Slice(&text.text[run_start..run_end]);
        !self.should_handle_first_letter
    }

    fn handle_replaced_element(&mut self, node: NodeId) -> bool {
        // Replaced elements read as punctuation to boundary finding.
        if let Some(parent) = self.ctx.dom.parent(node) {
            let index = self.ctx.dom.node_index(node);
            self.emit_character(',', parent, index, index + 1);
        }
        true
    }

    fn handle_non_text_node(&mut self, node: NodeId) -> bool {
        // A newline stands in for tabs too; only boundaries matter here.
        if should_emit_newline_for_node(self.ctx, node, self.config.emits_original_text)
            || should_emit_newline_after_node(self.ctx, node)
            || should_emit_tab_before_node(self.ctx, node)
        {
            if let Some(parent) = self.ctx.dom.parent(node) {
                let index = self.ctx.dom.node_index(node);
                self.emit_character('\n', parent, index + 1, index + 1);
            }
        }
        true
    }

    fn exit_node(&mut self, node: NodeId) {
        if should_emit_newline_for_node(self.ctx, node, self.config.emits_original_text)
            || should_emit_newline_before_node(self.ctx, node)
            || should_emit_tab_before_node(self.ctx, node)
        {
            self.emit_character('\n', node, 0, 0);
        }
    }

    fn emit_character(&mut self, c: char, container: NodeId, start: usize, end: usize) {
        #[cfg(feature = "iterator-trace")]
        eprintln!("[BACKWARDS ITERATOR] emit {c:?} in {container:?} {start}..{end}");
        self.position = Some(LazyRange::absolute(container, start, end));
        self.text = RunText::Char(c);
    }

    fn advance_respecting_range(&mut self, next: Option<NodeId>) -> bool {
        let Some(next) = next else {
            return false;
        };
        self.have_passed_start_node |= self.node == Some(self.start.container);
        if self.have_passed_start_node {
            return false;
        }
        self.node = Some(next);
        true
    }
}
