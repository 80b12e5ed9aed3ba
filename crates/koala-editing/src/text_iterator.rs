//! Forward text iteration.
//!
//! [§ innerText](https://html.spec.whatwg.org/multipage/dom.html#the-innertext-idl-attribute)
//!
//! [`TextIterator`] walks a range of the document in tree order, shadow trees
//! included, and produces the text a reader would see: collapsed whitespace
//! comes out as single spaces, blocks are separated by newlines, table cells
//! by tabs, and invisible or clipped content is skipped. Each step yields one
//! run together with the part of the document it came from, so that offsets
//! into the text can be mapped back to boundary points.

use std::borrow::Cow;

use koala_common::warning::warn_once;
use koala_dom::{NodeId, Position, Range, ShadowRootKind, compare_positions};
use koala_layout::{InlineTextBox, RenderObject, RenderText, Visibility};

use crate::behavior::{IteratorConfig, TextIteratorBehavior};
use crate::bit_stack::BitStack;
use crate::clipping::{
    next_in_pre_order_crossing_shadow_boundaries, push_fully_clipped_state, set_up_fully_clipped_stack,
};
use crate::context::TextContext;
use crate::heuristics::{
    is_collapsible_whitespace, is_form_control_like, is_in_form_control, is_rendered_table,
    should_emit_extra_newline_for_node, should_emit_newline_after_node, should_emit_newline_before_node,
    should_emit_newline_for_node, should_emit_tab_before_node,
};
use crate::run::{LazyRange, RunText};

/// How far the current node's virtual children (shadow roots, then its own
/// children) have been explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum IterationProgress {
    HandledNone,
    HandledAuthorShadowRoots,
    HandledUserAgentShadowRoot,
    HandledNode,
    HandledChildren,
}

/// Which part of a text node a box walk covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    FirstLetter,
    Remaining,
}

/// A resumable walk over the inline text boxes of one part of a text node,
/// in logical order.
#[derive(Debug, Clone)]
struct TextBoxWalk<'a> {
    renderer: &'a RenderObject,
    text: &'a RenderText,
    source: TextSource,
    boxes: Cow<'a, [InlineTextBox]>,
    position: usize,
}

impl<'a> TextBoxWalk<'a> {
    fn new(renderer: &'a RenderObject, text: &'a RenderText, source: TextSource) -> Self {
        let boxes: &'a [InlineTextBox] = match (source, &text.first_letter) {
            (TextSource::FirstLetter, Some(letter)) => &letter.text_boxes,
            (TextSource::FirstLetter, None) => &[],
            (TextSource::Remaining, _) => &text.text_boxes,
        };
        // Bidi reordering puts boxes in visual order; iterate in logical order.
        let boxes = if text.contains_reversed_text {
            let mut sorted = boxes.to_vec();
            sorted.sort_by_key(|b| b.start);
            Cow::Owned(sorted)
        } else {
            Cow::Borrowed(boxes)
        };
        TextBoxWalk {
            renderer,
            text,
            source,
            boxes,
            position: 0,
        }
    }

    fn is_visible(&self) -> bool {
        match (self.source, &self.text.first_letter) {
            (TextSource::FirstLetter, Some(letter)) => letter.visibility == Visibility::Visible,
            _ => self.renderer.is_visible(),
        }
    }

    /// Offset where this part of the node's text begins.
    fn origin(&self) -> usize {
        match self.source {
            TextSource::FirstLetter => 0,
            TextSource::Remaining => self.text.fragment_start(),
        }
    }

    /// Offset where this part of the node's text ends.
    fn limit(&self) -> usize {
        match self.source {
            TextSource::FirstLetter => self.text.fragment_start(),
            TextSource::Remaining => self.text.len(),
        }
    }

    fn current(&self) -> Option<InlineTextBox> {
        self.boxes.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<InlineTextBox> {
        self.boxes.get(self.position + 1).copied()
    }

    fn step(&mut self) {
        self.position += 1;
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.boxes.len()
    }
}

/// Iterates the text of a range, one run at a time.
///
/// The iterator is primed on construction; call [`TextIterator::advance`]
/// until [`TextIterator::at_end`]. Runs may be empty: those mark a position
/// (a replaced element, the start of a block) without contributing text.
///
/// # Example
/// ```ignore
/// let mut it = TextIterator::new(ctx, &range, TextIteratorBehavior::empty());
/// while !it.at_end() {
///     print!("{}", it.text().iter().collect::<String>());
///     it.advance();
/// }
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct TextIterator<'a> {
    ctx: TextContext<'a>,
    config: IteratorConfig,

    start: Position,
    end: Position,

    node: Option<NodeId>,
    offset: usize,
    iteration_progress: IterationProgress,
    shadow_depth: usize,
    past_end_node: Option<NodeId>,
    fully_clipped_stack: BitStack,

    position: Option<LazyRange>,
    text: RunText<'a>,

    text_box: Option<TextBoxWalk<'a>>,
    remaining_text_box: Option<TextBoxWalk<'a>>,
    first_letter_text: bool,
    handled_first_letter: bool,

    needs_another_newline: bool,
    has_emitted: bool,
    last_text_node: Option<NodeId>,
    last_text_node_ended_with_collapsed_space: bool,
    last_character: Option<char>,
    should_stop: bool,
}

impl<'a> TextIterator<'a> {
    /// Start iterating `range`.
    ///
    /// A range whose containers are not in the document, or whose start
    /// comes after its end, yields an iterator that is immediately at its end.
    #[must_use]
    pub fn new(ctx: TextContext<'a>, range: &Range, behavior: TextIteratorBehavior) -> Self {
        let mut it = TextIterator {
            ctx,
            config: IteratorConfig::from(behavior),
            start: range.start,
            end: range.end,
            node: None,
            offset: 0,
            iteration_progress: IterationProgress::HandledNone,
            shadow_depth: 0,
            past_end_node: None,
            fully_clipped_stack: BitStack::new(),
            position: None,
            text: RunText::None,
            text_box: None,
            remaining_text_box: None,
            first_letter_text: false,
            handled_first_letter: false,
            needs_another_newline: false,
            has_emitted: false,
            last_text_node: None,
            last_text_node_ended_with_collapsed_space: false,
            last_character: None,
            should_stop: false,
        };

        let dom = ctx.dom;
        for boundary in [range.start, range.end] {
            if !dom.contains(boundary.container) {
                warn_once(
                    "Editing",
                    &format!("text iterator range boundary {:?} is not in the document", boundary.container),
                );
                return it;
            }
        }
        if compare_positions(dom, range.start, range.end).is_gt() {
            warn_once("Editing", "text iterator range starts after it ends");
            return it;
        }

        let Some(first) = range.first_node(dom) else {
            return it;
        };
        set_up_fully_clipped_stack(&mut it.fully_clipped_stack, ctx, first);
        it.node = Some(first);
        it.offset = if first == range.start.container {
            range.start.offset
        } else {
            0
        };
        it.past_end_node = next_in_pre_order_crossing_shadow_boundaries(dom, range.end);

        it.advance();
        it
    }

    /// Whether iteration is over. The last run has been consumed.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.position.is_none() || self.should_stop
    }

    /// Whether the next [`advance`](Self::advance) owes output that was
    /// decided earlier: the extra newline after a paragraph, or the rest of a
    /// text node whose boxes are only partly emitted.
    #[must_use]
    pub const fn has_pending_emission(&self) -> bool {
        self.needs_another_newline || self.text_box.is_some() || self.remaining_text_box.is_some()
    }

    /// Number of characters in the current run.
    #[must_use]
    pub fn length(&self) -> usize {
        self.text.len()
    }

    /// Characters of the current run.
    #[must_use]
    pub fn text(&self) -> &[char] {
        self.text.as_slice()
    }

    /// Character `index` of the current run.
    ///
    /// # Panics
    /// If `index` is not less than [`length`](Self::length).
    #[must_use]
    pub fn character_at(&self, index: usize) -> char {
        self.text()[index]
    }

    /// Append the current run to `out`.
    pub fn append_text_to(&self, out: &mut Vec<char>) {
        out.extend_from_slice(self.text());
    }

    /// The start of the iterated range.
    pub(crate) const fn range_start(&self) -> Position {
        self.start
    }

    pub(crate) const fn context(&self) -> TextContext<'a> {
        self.ctx
    }

    /// Where the current run came from, before node indices are resolved.
    #[must_use]
    pub const fn lazy_range(&self) -> Option<LazyRange> {
        self.position
    }

    /// The document range of the current run, or the collapsed end of the
    /// iterated range once iteration is over.
    #[must_use]
    pub fn range(&self) -> Range {
        match &self.position {
            Some(position) => position.resolve(self.ctx.dom),
            None => Range::collapsed_at(self.end),
        }
    }

    /// The node the current run is in, or the child it stands for.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        let start = self.range().start;
        if self.ctx.dom.offset_in_characters(start.container) {
            return Some(start.container);
        }
        self.ctx.dom.child_at(start.container, start.offset)
    }

    /// Produce the next run.
    pub fn advance(&mut self) {
        if self.should_stop {
            return;
        }

        self.position = None;
        self.text = RunText::None;

        // The second newline after a paragraph with a large bottom margin,
        // positioned like the first one.
        if self.needs_another_newline {
            if let Some(node) = self.node {
                self.emit_after_contents('\n', node);
            }
            self.needs_another_newline = false;
            return;
        }

        if self.text_box.is_none() {
            self.resume_remaining_text_box();
        }
        if self.text_box.is_some() {
            self.handle_text_box();
            if self.position.is_some() {
                return;
            }
        }

        let dom = self.ctx.dom;
        while let Some(node) = self.node {
            if node_is_past_end(node, self.past_end_node) && self.shadow_depth == 0 {
                break;
            }
            if !self.should_stop && self.config.stops_on_form_controls && is_in_form_control(dom, node) {
                self.should_stop = true;
            }

            // A range ending at offset 0 of an element covers none of its
            // content, but its position is still represented.
            if node == self.end.container && self.end.offset == 0 {
                self.represent_node_offset_zero(node);
                self.node = None;
                return;
            }

            match self.ctx.renderer(node) {
                None => {
                    // Shadow roots have no box, but their children may.
                    self.iteration_progress = if dom.is_shadow_root(node) {
                        self.iteration_progress.max(IterationProgress::HandledNode)
                    } else {
                        IterationProgress::HandledChildren
                    };
                }
                Some(renderer) => {
                    if self.iteration_progress < IterationProgress::HandledAuthorShadowRoots {
                        if self.config.enters_author_shadow_roots
                            && let Some(root) = dom.youngest_author_shadow_root(node)
                        {
                            self.enter_shadow_root(root);
                            continue;
                        }
                        self.iteration_progress = IterationProgress::HandledAuthorShadowRoots;
                    }

                    if self.iteration_progress < IterationProgress::HandledUserAgentShadowRoot {
                        if self.config.enters_text_controls
                            && renderer.is_text_control()
                            && let Some(root) = dom.user_agent_shadow_root(node)
                        {
                            self.enter_shadow_root(root);
                            continue;
                        }
                        self.iteration_progress = IterationProgress::HandledUserAgentShadowRoot;
                    }

                    if self.iteration_progress < IterationProgress::HandledNode {
                        let handled = if renderer.is_text() && dom.is_text(node) {
                            self.handle_text_node(node, renderer)
                        } else if renderer.is_image() || renderer.is_widget() || is_form_control_like(dom, node) {
                            self.handle_replaced_element(node, renderer)
                        } else {
                            self.handle_non_text_node(node)
                        };
                        if handled {
                            self.iteration_progress = IterationProgress::HandledNode;
                        }
                        if self.position.is_some() {
                            return;
                        }
                    }
                }
            }

            // STEP 1: Children, unless they are done or unavailable.
            let mut next = if self.iteration_progress < IterationProgress::HandledChildren {
                dom.first_child(node)
            } else {
                None
            };
            self.offset = 0;
            if next.is_none() {
                // STEP 2: The next sibling.
                next = dom.next_sibling(node);
                if next.is_none() {
                    // STEP 3: Climb until some ancestor has a next sibling.
                    let past_end = dom.next_in_pre_order(node) == self.past_end_node;
                    let mut current = node;
                    let mut parent = dom.parent(current);
                    while next.is_none() {
                        let Some(parent_node) = parent else {
                            break;
                        };
                        if (past_end && parent_node == self.end.container)
                            || dom.is_descendant_of(self.end.container, parent_node)
                        {
                            self.node = None;
                            return;
                        }
                        let had_renderer = self.ctx.layout.has_renderer(current);
                        current = parent_node;
                        self.node = Some(current);
                        self.fully_clipped_stack.pop();
                        parent = dom.parent(current);
                        if had_renderer {
                            self.exit_node(current);
                        }
                        if self.position.is_some() {
                            self.iteration_progress = IterationProgress::HandledChildren;
                            return;
                        }
                        next = dom.next_sibling(current);
                    }

                    // STEP 4: At the top of a shadow tree: move on to the next
                    // older author root, or back to the host.
                    if next.is_none() && parent.is_none() && self.shadow_depth > 0 {
                        self.leave_shadow_root(current);
                        continue;
                    }
                }
                self.fully_clipped_stack.pop();
            }

            self.node = next;
            if let Some(next) = next {
                push_fully_clipped_state(&mut self.fully_clipped_stack, self.ctx, next);
            }
            self.iteration_progress = IterationProgress::HandledNone;
            self.handled_first_letter = false;
            self.first_letter_text = false;
        }
    }

    fn enter_shadow_root(&mut self, root: NodeId) {
        #[cfg(feature = "iterator-trace")]
        eprintln!("[TEXT ITERATOR] entering shadow root {root:?} at depth {}", self.shadow_depth + 1);
        self.node = Some(root);
        self.iteration_progress = IterationProgress::HandledNone;
        self.shadow_depth += 1;
        push_fully_clipped_state(&mut self.fully_clipped_stack, self.ctx, root);
    }

    fn leave_shadow_root(&mut self, root: NodeId) {
        let dom = self.ctx.dom;
        let Some(host) = dom.shadow_host(root) else {
            debug_assert!(false, "shadow depth is positive outside a shadow tree");
            self.node = None;
            return;
        };
        match dom.shadow_root_kind(root) {
            Some(ShadowRootKind::Author) => {
                let older = dom
                    .older_shadow_root(root)
                    .filter(|&older| dom.shadow_root_kind(older) == Some(ShadowRootKind::Author));
                if let Some(older) = older {
                    // Same depth: one shadow tree left, its sibling entered.
                    self.fully_clipped_stack.pop();
                    self.node = Some(older);
                    self.iteration_progress = IterationProgress::HandledNone;
                    push_fully_clipped_state(&mut self.fully_clipped_stack, self.ctx, older);
                } else {
                    self.node = Some(host);
                    self.iteration_progress = IterationProgress::HandledAuthorShadowRoots;
                    self.shadow_depth -= 1;
                    self.fully_clipped_stack.pop();
                }
            }
            _ => {
                self.node = Some(host);
                self.iteration_progress = IterationProgress::HandledUserAgentShadowRoot;
                self.shadow_depth -= 1;
                self.fully_clipped_stack.pop();
            }
        }
        self.handled_first_letter = false;
        self.first_letter_text = false;
    }

    fn resume_remaining_text_box(&mut self) {
        if let Some(remaining) = self.remaining_text_box.take() {
            self.text_box = Some(remaining);
            self.first_letter_text = false;
            self.offset = 0;
        }
    }

    fn is_visible(&self, renderer: &RenderObject) -> bool {
        renderer.is_visible() || self.config.ignores_style_visibility
    }

    // ========== text ==========

    fn handle_text_node(&mut self, node: NodeId, renderer: &'a RenderObject) -> bool {
        if self.fully_clipped_stack.top() && !self.config.ignores_style_visibility {
            return false;
        }
        let Some(text) = renderer.render_text() else {
            return false;
        };
        self.last_text_node = Some(node);

        // Preformatted text: every character is rendered, so emit the node's
        // text in one run.
        if !renderer.style.white_space.collapses_white_space() {
            let run_start = self.offset;
            if self.last_text_node_ended_with_collapsed_space && has_visible_text_node(renderer, text) {
                self.emit_character(' ', node, None, run_start, run_start);
                return false;
            }
            if !self.handled_first_letter && text.first_letter.is_some() && self.offset == 0 {
                self.handle_text_node_first_letter(renderer, text);
                if self.first_letter_text {
                    let length = text.fragment_start().min(self.end_offset_in(node));
                    self.emit_text(node, text, 0, length);
                    self.offset = text.fragment_start();
                    self.first_letter_text = false;
                    self.text_box = None;
                    self.remaining_text_box = None;
                    return false;
                }
            }
            if !self.is_visible(renderer) {
                return false;
            }
            let run_end = text.len().min(self.end_offset_in(node));
            if run_start >= run_end {
                return true;
            }
            self.emit_text(node, text, run_start, run_end);
            return true;
        }

        if !text.text_boxes.is_empty() {
            self.text_box = Some(TextBoxWalk::new(renderer, text, TextSource::Remaining));
        }

        let should_handle_first_letter = !self.handled_first_letter && text.first_letter.is_some() && self.offset == 0;
        if should_handle_first_letter {
            self.handle_text_node_first_letter(renderer, text);
        }

        if text.text_boxes.is_empty() && !text.is_empty() && !should_handle_first_letter {
            if !self.is_visible(renderer) {
                return false;
            }
            // Everything in the node collapsed away.
            self.last_text_node_ended_with_collapsed_space = true;
            return true;
        }

        self.handle_text_box();
        true
    }

    fn handle_text_node_first_letter(&mut self, renderer: &'a RenderObject, text: &'a RenderText) {
        if let Some(letter) = &text.first_letter
            && (letter.visibility == Visibility::Visible || self.config.ignores_style_visibility)
        {
            self.remaining_text_box = self.text_box.take();
            let walk = TextBoxWalk::new(renderer, text, TextSource::FirstLetter);
            self.text_box = (!walk.is_exhausted()).then_some(walk);
            self.first_letter_text = true;
        }
        self.handled_first_letter = true;
    }

    fn end_offset_in(&self, node: NodeId) -> usize {
        if node == self.end.container {
            self.end.offset
        } else {
            usize::MAX
        }
    }

    fn handle_text_box(&mut self) {
        let Some(mut walk) = self.text_box.take() else {
            return;
        };
        let Some(node) = self.node else {
            return;
        };
        if !walk.is_visible() && !self.config.ignores_style_visibility {
            return;
        }

        let text = walk.text;
        let chars = &text.text;
        let start = self.offset;
        let end = self.end_offset_in(node);
        while let Some(text_box) = walk.current() {
            let run_start = text_box.start.max(start);

            // Collapsed space before this run, either carried over from an
            // earlier node or leading whitespace of this one.
            let need_space = self.last_text_node_ended_with_collapsed_space
                || (walk.position == 0 && text_box.start == run_start && run_start > walk.origin());
            if need_space && self.last_character.is_some_and(|c| !is_collapsible_whitespace(c)) {
                if self.last_text_node == Some(node) && run_start > 0 && chars.get(run_start - 1) == Some(&' ') {
                    let mut space_run_start = run_start - 1;
                    while space_run_start > 0 && chars[space_run_start - 1] == ' ' {
                        space_run_start -= 1;
                    }
                    self.emit_text(node, text, space_run_start, space_run_start + 1);
                } else {
                    self.emit_character(' ', node, None, run_start, run_start);
                }
                self.text_box = Some(walk);
                return;
            }

            let text_box_end = text_box.end();
            let run_end = text_box_end.min(end).min(walk.limit());
            let next_text_box = walk.peek_next();

            if run_start < run_end {
                // A newline becomes a single space; anything else is emitted
                // up to the next newline.
                if chars[run_start] == '\n' {
                    self.emit_character(' ', node, None, run_start, run_start + 1);
                    self.offset = run_start + 1;
                } else {
                    let subrun_end = chars[run_start..run_end]
                        .iter()
                        .position(|&c| c == '\n')
                        .map_or(run_end, |i| run_start + i);
                    self.offset = subrun_end;
                    self.emit_text(node, text, run_start, subrun_end);
                }

                // Come back for the rest of this box.
                let position_end = self.position.map_or(text_box_end, |p| p.end);
                if position_end < text_box_end {
                    self.text_box = Some(walk);
                    return;
                }

                let next_run_start = next_text_box.map_or(walk.limit(), |b| b.start);
                if next_run_start > run_end {
                    // Collapsed space between boxes or at the end.
                    self.last_text_node_ended_with_collapsed_space = true;
                }
                walk.step();
                self.text_box = (!walk.is_exhausted()).then_some(walk);
                return;
            }
            walk.step();
        }

        if self.remaining_text_box.is_some() {
            self.resume_remaining_text_box();
            self.handle_text_box();
        }
    }

    // ========== replaced and other elements ==========

    fn handle_replaced_element(&mut self, node: NodeId, renderer: &'a RenderObject) -> bool {
        if self.fully_clipped_stack.top() {
            return false;
        }
        if !self.is_visible(renderer) {
            return false;
        }

        if self.last_text_node_ended_with_collapsed_space {
            if let Some(last) = self.last_text_node {
                self.emit_after_node(' ', last);
            }
            return false;
        }

        // The shadow tree has been visited already.
        if self.config.enters_text_controls && renderer.is_text_control() {
            return true;
        }

        self.has_emitted = true;
        let Some(parent) = self.ctx.dom.parent(node) else {
            return true;
        };

        if self.config.emits_characters_between_all_visible_positions {
            // Replaced elements read as punctuation to boundary finding.
            self.emit_character(',', parent, Some(node), 0, 1);
            return true;
        }

        self.position = Some(LazyRange {
            container: parent,
            offset_base: Some(node),
            start: 0,
            end: 1,
        });
        if self.config.emits_image_alt_text
            && let Some(alt) = renderer.alt_text().filter(|alt| !alt.is_empty())
        {
            self.text = RunText::Slice(alt);
            self.last_character = alt.last().copied();
            return true;
        }
        self.text = RunText::None;
        self.last_character = None;
        true
    }

    fn handle_non_text_node(&mut self, node: NodeId) -> bool {
        if should_emit_newline_for_node(self.ctx, node, self.config.emits_original_text) {
            self.emit_at_node('\n', node, 0, 1);
        } else if self.config.emits_characters_between_all_visible_positions
            && self.ctx.renderer(node).is_some_and(RenderObject::is_hr)
        {
            self.emit_at_node(' ', node, 0, 1);
        } else {
            self.represent_node_offset_zero(node);
        }
        true
    }

    /// Whether entering `node` (or hitting it, if atomic) should emit a
    /// character to mark its position.
    fn should_represent_node_offset_zero(&self, node: NodeId) -> bool {
        if self.config.emits_characters_between_all_visible_positions && is_rendered_table(self.ctx, node) {
            return true;
        }

        // Flush with the start of a paragraph: no tab before a leading cell.
        if self.last_character == Some('\n') {
            return false;
        }
        if self.has_emitted {
            return true;
        }

        // Nothing emitted yet. Only a node on another line than the range
        // start needs positioning; check the cheap cases first.
        let dom = self.ctx.dom;
        if node == self.start.container {
            return false;
        }
        if !dom.is_descendant_of(node, self.start.container) {
            return true;
        }
        if self.start.offset == 0 {
            return false;
        }

        let Some(renderer) = self.ctx.renderer(node) else {
            return false;
        };
        if !renderer.is_visible()
            || (renderer.is_render_block_flow() && renderer.height <= 0.0 && !dom.has_tag(node, "body"))
        {
            return false;
        }

        let Some(parent) = dom.parent(node) else {
            return false;
        };
        let before_node = Position::new(parent, dom.node_index(node));
        match (
            self.ctx.layout.line_at(dom, self.start),
            self.ctx.layout.line_at(dom, before_node),
        ) {
            (Some(start_line), Some(node_line)) => start_line != node_line,
            _ => false,
        }
    }

    fn should_emit_space_before_and_after_node(&self, node: NodeId) -> bool {
        is_rendered_table(self.ctx, node)
            && (self.ctx.renderer(node).is_some_and(RenderObject::is_inline)
                || self.config.emits_characters_between_all_visible_positions)
    }

    fn represent_node_offset_zero(&mut self, node: NodeId) {
        // The cheap classification runs before the possibly expensive line
        // comparison.
        let c = if should_emit_tab_before_node(self.ctx, node) {
            '\t'
        } else if should_emit_newline_before_node(self.ctx, node) {
            '\n'
        } else if self.should_emit_space_before_and_after_node(node) {
            ' '
        } else {
            return;
        };
        if self.should_represent_node_offset_zero(node) {
            self.emit_at_node(c, node, 0, 0);
        }
    }

    fn exit_node(&mut self, node: NodeId) {
        // A collapsed block at the start of the range emits nothing.
        if !self.has_emitted {
            return;
        }

        if self.last_text_node.is_some() && should_emit_newline_after_node(self.ctx, node) {
            // An extra newline stands in for a large bottom margin.
            let add_newline = should_emit_extra_newline_for_node(self.ctx, node);
            if self.last_character != Some('\n') {
                self.emit_after_contents('\n', node);
                debug_assert!(!self.needs_another_newline);
                self.needs_another_newline = add_newline;
            } else if add_newline {
                self.emit_after_contents('\n', node);
            }
        }

        if self.position.is_none() && self.should_emit_space_before_and_after_node(node) {
            self.emit_after_contents(' ', node);
        }
    }

    // ========== emission ==========

    /// Emit `c` positioned after the contents of `node`, where a block's
    /// trailing line break visually begins.
    fn emit_after_contents(&mut self, c: char, node: NodeId) {
        let base = self.ctx.dom.last_child(node).unwrap_or(node);
        self.emit_after_node(c, base);
    }

    fn emit_after_node(&mut self, c: char, node: NodeId) {
        if let Some(parent) = self.ctx.dom.parent(node) {
            self.emit_character(c, parent, Some(node), 1, 1);
        }
    }

    fn emit_at_node(&mut self, c: char, node: NodeId, start: usize, end: usize) {
        if let Some(parent) = self.ctx.dom.parent(node) {
            self.emit_character(c, parent, Some(node), start, end);
        }
    }

    fn emit_character(&mut self, c: char, container: NodeId, offset_base: Option<NodeId>, start: usize, end: usize) {
        #[cfg(feature = "iterator-trace")]
        eprintln!("[TEXT ITERATOR] emit {c:?} in {container:?} (base {offset_base:?}) {start}..{end}");
        self.has_emitted = true;
        self.position = Some(LazyRange {
            container,
            offset_base,
            start,
            end,
        });
        self.text = RunText::Char(c);
        self.last_text_node_ended_with_collapsed_space = false;
        self.last_character = Some(c);
    }

    fn emit_text(&mut self, node: NodeId, text: &'a RenderText, start: usize, end: usize) {
        let chars: &'a [char] = if self.config.emits_original_text {
            &text.original_text
        } else {
            &text.text
        };
        debug_assert!(start <= end && end <= chars.len());
        let end = end.min(chars.len());
        let start = start.min(end);
        #[cfg(feature = "iterator-trace")]
        eprintln!("[TEXT ITERATOR] emit text of {node:?} {start}..{end}");

        self.position = Some(LazyRange::absolute(node, start, end));
        self.text = RunText::Slice(&chars[start..end]);
        if end > start {
            self.last_character = Some(chars[end - 1]);
        }
        self.last_text_node_ended_with_collapsed_space = false;
        self.has_emitted = true;
    }
}

fn node_is_past_end(node: NodeId, past_end_node: Option<NodeId>) -> bool {
    past_end_node == Some(node)
}

fn has_visible_text_node(renderer: &RenderObject, text: &RenderText) -> bool {
    renderer.is_visible()
        || text
            .first_letter
            .as_ref()
            .is_some_and(|letter| letter.visibility == Visibility::Visible)
}
