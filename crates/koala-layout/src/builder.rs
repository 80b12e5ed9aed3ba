//! Render tree construction.
//!
//! [CSS Display § 2](https://www.w3.org/TR/css-display-3/#the-display-properties)
//! [CSS Text § 4 White Space Processing](https://www.w3.org/TR/css-text-3/#white-space-processing)
//!
//! The builder walks the flat tree once, in tree order, assigning every
//! rendered node a [`RenderObject`]. Line breaking is tracked by a single
//! line counter: blocks, `<br>`, preserved newlines and wrapping start new
//! lines, and whitespace collapses across node boundaries within a line.

use std::collections::HashMap;

use koala_dom::{DomTree, NodeId, NodeType, ShadowRootKind};

use crate::metrics::FontMetrics;
use crate::render_object::{
    InlineTextBox, RenderImage, RenderKind, RenderObject, RenderText, TableCellPosition,
};
use crate::style::{DisplayType, RenderStyle, TextTransform, compute_style};
use crate::tree::{LayoutOptions, RenderTree};

/// Line being filled.
#[derive(Debug, Default)]
struct LineState {
    /// Index of the current line.
    index: usize,
    /// Horizontal position in px.
    x: f32,
    /// Whether anything has been placed on the current line.
    has_content: bool,
    /// Whether the last placed character was a collapsible space.
    after_collapsible_space: bool,
    /// The collapsible space ending the current line, if any, as
    /// (text node, character offset). Removed when the line ends.
    trailing_space: Option<(NodeId, usize)>,
    /// Count of everything ever placed, to tell whether a block got content.
    placed: usize,
}

/// Row bookkeeping for the innermost table.
#[derive(Debug, Default)]
struct TableState {
    /// Index of the row being laid out.
    row: usize,
    /// Cells placed so far in the current row.
    column: usize,
    /// Cell count of every finished row.
    row_widths: Vec<usize>,
}

pub(crate) struct LayoutBuilder<'a> {
    dom: &'a DomTree,
    options: &'a LayoutOptions,
    metrics: &'a dyn FontMetrics,
    objects: HashMap<NodeId, RenderObject>,
    line: LineState,
    tables: Vec<TableState>,
    /// Nesting depth of inline-level block containers, whose block children
    /// do not break the surrounding line.
    atomic_inline_depth: usize,
    /// The text node being laid out and the line of each of its characters.
    pending_text: Option<(NodeId, Vec<Option<usize>>)>,
}

impl<'a> LayoutBuilder<'a> {
    pub(crate) fn new(dom: &'a DomTree, options: &'a LayoutOptions, metrics: &'a dyn FontMetrics) -> Self {
        LayoutBuilder {
            dom,
            options,
            metrics,
            objects: HashMap::new(),
            line: LineState::default(),
            tables: Vec::new(),
            atomic_inline_depth: 0,
            pending_text: None,
        }
    }

    pub(crate) fn build(mut self) -> RenderTree {
        let root = self.dom.root();
        let mut style = RenderStyle::initial(self.options.default_font_size);
        style.display = DisplayType::Block;

        let first_line = self.line.index;
        let placed = self.line.placed;
        let dom = self.dom;
        for &child in dom.children(root) {
            self.layout_node(child, &style);
        }
        let last_line = self.current_last_line(first_line);
        self.end_line();

        let height = self.block_height(&style, first_line, last_line, placed);
        let _ = self.objects.insert(
            root,
            RenderObject {
                node: root,
                kind: RenderKind::View,
                style,
                first_line,
                last_line,
                height,
                collapsed_margin_after: 0.0,
                content_box_is_empty: false,
            },
        );
        RenderTree::from_parts(self.objects, self.line.index)
    }

    fn layout_node(&mut self, node: NodeId, parent_style: &RenderStyle) {
        match self.dom.get(node).map(|n| &n.node_type) {
            Some(NodeType::Text(_)) => self.layout_text(node, parent_style),
            Some(NodeType::Element(_)) => self.layout_element(node, parent_style),
            Some(NodeType::ShadowRoot(_)) => self.layout_children_of(node, parent_style),
            _ => {}
        }
    }

    fn layout_children_of(&mut self, node: NodeId, style: &RenderStyle) {
        let dom = self.dom;
        for &child in dom.children(node) {
            self.layout_node(child, style);
        }
    }

    /// [CSS Scoping § 2.2 Shadow Trees and the Cascade](https://www.w3.org/TR/css-scoping-1/#flat-tree)
    ///
    /// Children in the flat tree: author shadow trees youngest first, then
    /// the light children. Text controls render only their user-agent tree.
    fn layout_flat_children(&mut self, node: NodeId, style: &RenderStyle, kind: &RenderKind) {
        if matches!(kind, RenderKind::TextControl) {
            if let Some(root) = self.dom.user_agent_shadow_root(node) {
                self.layout_children_of(root, style);
            }
            return;
        }
        let author_roots: Vec<NodeId> = self
            .dom
            .shadow_roots(node)
            .iter()
            .rev()
            .copied()
            .filter(|&root| self.dom.shadow_root_kind(root) == Some(ShadowRootKind::Author))
            .collect();
        for root in author_roots {
            self.layout_children_of(root, style);
        }
        self.layout_children_of(node, style);
    }

    // ========== elements ==========

    fn element_style(&self, node: NodeId, parent_style: &RenderStyle) -> Option<RenderStyle> {
        let tag = self.dom.tag_name(node)?;
        let mut style = compute_style(tag, self.dom.attribute(node, "style"), parent_style);
        // [§ 15.3.1](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
        // "[hidden] ... { display: none; }"
        let hidden_input = tag == "input" && self.dom.attribute(node, "type") == Some("hidden");
        if self.dom.attribute(node, "hidden").is_some() || hidden_input {
            style.display = DisplayType::None;
        }
        Some(style)
    }

    fn classify(&mut self, node: NodeId, style: &RenderStyle) -> RenderKind {
        let dom = self.dom;
        let tag = dom.tag_name(node).unwrap_or_default();
        match tag {
            "br" => return RenderKind::LineBreak,
            "hr" => return RenderKind::HorizontalRule,
            "img" | "video" => {
                let alt = dom.attribute(node, "alt").unwrap_or_default();
                return RenderKind::Image(RenderImage {
                    alt_text: alt.chars().collect(),
                });
            }
            "iframe" | "embed" | "object" | "applet" | "canvas" | "audio" => return RenderKind::Widget,
            "textarea" => return RenderKind::TextControl,
            "input" => {
                // [§ 4.10.5.1](https://html.spec.whatwg.org/multipage/input.html#states-of-the-type-attribute)
                let text_like = matches!(
                    dom.attribute(node, "type").map(str::to_ascii_lowercase).as_deref(),
                    None | Some("text" | "search" | "password" | "email" | "url" | "tel" | "number")
                );
                return if text_like {
                    RenderKind::TextControl
                } else {
                    RenderKind::InlineBlock
                };
            }
            _ => {}
        }
        match style.display {
            DisplayType::ListItem => RenderKind::ListItem,
            DisplayType::Inline => RenderKind::Inline,
            DisplayType::InlineBlock => RenderKind::InlineBlock,
            DisplayType::Table => RenderKind::Table { inline: false },
            DisplayType::InlineTable => RenderKind::Table { inline: true },
            DisplayType::TableRowGroup | DisplayType::TableHeaderGroup | DisplayType::TableFooterGroup => {
                RenderKind::TableSection
            }
            DisplayType::TableRow => RenderKind::TableRow,
            DisplayType::TableCell => RenderKind::TableCell(self.next_cell_position()),
            DisplayType::Block | DisplayType::None => RenderKind::Block,
        }
    }

    fn next_cell_position(&mut self) -> TableCellPosition {
        let Some(table) = self.tables.last_mut() else {
            return TableCellPosition {
                row: 0,
                column: 0,
                has_cell_above: false,
            };
        };
        let column = table.column;
        table.column += 1;
        let has_cell_above = table
            .row
            .checked_sub(1)
            .and_then(|previous| table.row_widths.get(previous))
            .is_some_and(|&width| width > column);
        TableCellPosition {
            row: table.row,
            column,
            has_cell_above,
        }
    }

    fn is_block_level(kind: &RenderKind, style: &RenderStyle) -> bool {
        match kind {
            RenderKind::Block
            | RenderKind::ListItem
            | RenderKind::HorizontalRule
            | RenderKind::TableSection
            | RenderKind::TableRow
            | RenderKind::Table { inline: false } => true,
            RenderKind::Image(_)
            | RenderKind::Widget
            | RenderKind::InlineBlock
            | RenderKind::TextControl
            | RenderKind::Table { inline: true } => style.display == DisplayType::Block,
            _ => false,
        }
    }

    fn layout_element(&mut self, node: NodeId, parent_style: &RenderStyle) {
        let Some(style) = self.element_style(node, parent_style) else {
            return;
        };
        if style.display == DisplayType::None {
            return;
        }
        let kind = self.classify(node, &style);
        let breaks_lines = Self::is_block_level(&kind, &style) && self.atomic_inline_depth == 0;

        if breaks_lines {
            self.end_line();
        }
        if matches!(kind, RenderKind::TableCell(_)) {
            self.trim_trailing_space();
            self.line.after_collapsible_space = true;
        }

        let first_line = self.line.index;
        let placed = self.line.placed;
        let mut last_child_margin = 0.0_f32;

        match &kind {
            RenderKind::LineBreak => {
                self.line.placed += 1;
                self.force_break();
            }
            RenderKind::HorizontalRule => self.place_atom(0.0),
            RenderKind::Image(_) | RenderKind::Widget => self.place_atom(style.font_size),
            RenderKind::InlineBlock | RenderKind::TextControl => {
                self.atomic_inline_depth += 1;
                self.place_atom(0.0);
                self.layout_flat_children(node, &style, &kind);
                self.atomic_inline_depth -= 1;
            }
            RenderKind::Table { .. } => {
                self.tables.push(TableState::default());
                self.layout_flat_children(node, &style, &kind);
                let _ = self.tables.pop();
            }
            RenderKind::TableRow => {
                self.layout_flat_children(node, &style, &kind);
                if let Some(table) = self.tables.last_mut() {
                    table.row_widths.push(table.column);
                    table.row += 1;
                    table.column = 0;
                }
            }
            _ => {
                self.layout_flat_children(node, &style, &kind);
                last_child_margin = self.last_block_child_margin(node);
            }
        }

        if matches!(kind, RenderKind::TableCell(_)) {
            self.trim_trailing_space();
        }
        let last_line = if breaks_lines || kind.is_block_container() {
            self.current_last_line(first_line)
        } else {
            self.line.index
        };
        if breaks_lines {
            self.end_line();
        }

        let height = match kind {
            RenderKind::Inline | RenderKind::LineBreak => 0.0,
            _ => self.block_height(&style, first_line, last_line, placed),
        };
        let content_box_is_empty = style.width.is_some_and(|width| width <= 0.0) || height <= 0.0;
        let collapsed_margin_after = style.margin_bottom.max(last_child_margin);
        let _ = self.objects.insert(
            node,
            RenderObject {
                node,
                kind,
                style,
                first_line,
                last_line,
                height,
                collapsed_margin_after,
                content_box_is_empty,
            },
        );
    }

    /// [CSS 2 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "The bottom margin of a last in-flow child and bottom margin of its
    /// parent if the parent has 'auto' computed height" are adjoining.
    fn last_block_child_margin(&self, node: NodeId) -> f32 {
        self.dom
            .children(node)
            .iter()
            .rev()
            .find_map(|child| self.objects.get(child))
            .filter(|child| !child.is_inline() && !child.is_floating_or_out_of_flow_positioned())
            .map_or(0.0, |child| child.collapsed_margin_after)
    }

    fn block_height(&self, style: &RenderStyle, first_line: usize, last_line: usize, placed: usize) -> f32 {
        if let Some(height) = style.height {
            return height;
        }
        if self.line.placed == placed {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let lines = (last_line + 1).saturating_sub(first_line) as f32;
        lines * self.metrics.line_height(style.font_size)
    }

    /// The last line holding content since `first_line`.
    fn current_last_line(&self, first_line: usize) -> usize {
        if self.line.has_content {
            self.line.index
        } else {
            self.line.index.saturating_sub(1).max(first_line)
        }
    }

    // ========== lines ==========

    fn place_atom(&mut self, width: f32) {
        if let Some(available) = self.options.available_width
            && self.line.has_content
            && self.line.x + width > available
        {
            self.end_line();
        }
        self.line.has_content = true;
        self.line.after_collapsible_space = false;
        self.line.trailing_space = None;
        self.line.x += width;
        self.line.placed += 1;
    }

    /// End the current line if it holds anything.
    fn end_line(&mut self) {
        if self.line.has_content {
            self.force_break();
        } else {
            self.line.after_collapsible_space = false;
            self.line.trailing_space = None;
        }
    }

    /// End the current line unconditionally.
    fn force_break(&mut self) {
        self.trim_trailing_space();
        self.line.index += 1;
        self.line.x = 0.0;
        self.line.has_content = false;
        self.line.after_collapsible_space = false;
    }

    /// [§ 4.1.3](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
    ///
    /// "A sequence of collapsible spaces at the end of a line is removed."
    fn trim_trailing_space(&mut self) {
        let Some((node, offset)) = self.line.trailing_space.take() else {
            return;
        };
        if let Some((pending, lines)) = self.pending_text.as_mut()
            && *pending == node
        {
            if let Some(line) = lines.get_mut(offset) {
                *line = None;
            }
            return;
        }
        let Some(RenderKind::Text(text)) = self.objects.get_mut(&node).map(|object| &mut object.kind) else {
            return;
        };
        if let Some(last) = text.text_boxes.last_mut()
            && last.end() == offset + 1
        {
            last.len -= 1;
            if last.len == 0 {
                let _ = text.text_boxes.pop();
            }
        }
    }

    // ========== text ==========

    fn layout_text(&mut self, node: NodeId, style: &RenderStyle) {
        let original: Vec<char> = self.dom.as_text(node).unwrap_or_default().chars().collect();
        let text = transform(&original, style.text_transform);
        let collapse = style.white_space.collapses_white_space();
        let preserve_newlines = style.white_space.preserves_newlines();
        let wrap_width = self.options.available_width.filter(|_| style.white_space.wraps());
        let started_at_line_start = !self.line.has_content;
        let first_line = self.line.index;

        self.pending_text = Some((node, vec![None; text.len()]));

        for (offset, &c) in text.iter().enumerate() {
            if c == '\n' && preserve_newlines {
                if collapse {
                    self.trim_trailing_space();
                }
                self.place_char(offset, c, style);
                self.force_break();
                continue;
            }
            if collapse && is_collapsible_space(c) {
                if !self.line.has_content || self.line.after_collapsible_space {
                    continue;
                }
                self.place_char(offset, ' ', style);
                self.line.after_collapsible_space = true;
                self.line.trailing_space = Some((node, offset));
                continue;
            }
            if let Some(available) = wrap_width {
                let word_start = offset == 0 || is_collapsible_space(text[offset - 1]);
                if word_start && self.line.has_content {
                    let word_len = text[offset..]
                        .iter()
                        .take_while(|&&ch| !is_collapsible_space(ch))
                        .count();
                    let width = self.metrics.text_width(&text[offset..offset + word_len], style.font_size);
                    if self.line.x + width > available {
                        self.force_break();
                    }
                }
            }
            self.place_char(offset, c, style);
            self.line.after_collapsible_space = false;
            self.line.trailing_space = None;
        }

        let Some((_, lines)) = self.pending_text.take() else {
            return;
        };
        let text_boxes = group_into_boxes(&lines);

        // [§ 4.1.1](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
        // Whitespace-only text that renders nothing next to block boundaries
        // gets no box at all.
        if text_boxes.is_empty()
            && collapse
            && text.iter().all(|&c| is_collapsible_space(c))
            && (started_at_line_start || self.next_is_block_boundary(node, style))
        {
            return;
        }

        let last_line = text_boxes.last().map_or(first_line, |b| b.line);
        let first_line = text_boxes.first().map_or(first_line, |b| b.line);
        let _ = self.objects.insert(
            node,
            RenderObject {
                node,
                kind: RenderKind::Text(RenderText {
                    text,
                    original_text: original,
                    text_boxes,
                    contains_reversed_text: false,
                    first_letter: None,
                }),
                style: style.clone(),
                first_line,
                last_line,
                height: 0.0,
                collapsed_margin_after: 0.0,
                content_box_is_empty: true,
            },
        );
    }

    fn place_char(&mut self, offset: usize, c: char, style: &RenderStyle) {
        if let Some((_, lines)) = self.pending_text.as_mut()
            && let Some(line) = lines.get_mut(offset)
        {
            *line = Some(self.line.index);
        }
        self.line.has_content = true;
        self.line.x += self.metrics.text_width(&[c], style.font_size);
        self.line.placed += 1;
    }

    /// Whether the next flat-tree sibling of `node` starts a block, or `node`
    /// is the last child of a block.
    fn next_is_block_boundary(&self, node: NodeId, parent_style: &RenderStyle) -> bool {
        let mut next = self.dom.next_sibling(node);
        while let Some(sibling) = next {
            match self.dom.get(sibling).map(|n| &n.node_type) {
                Some(NodeType::Element(_)) => {
                    let Some(style) = self.element_style(sibling, parent_style) else {
                        return false;
                    };
                    match style.display {
                        DisplayType::None => {}
                        DisplayType::Inline | DisplayType::InlineBlock | DisplayType::InlineTable => {
                            return false;
                        }
                        _ => return true,
                    }
                }
                Some(NodeType::Text(_)) => return false,
                _ => {}
            }
            next = self.dom.next_sibling(sibling);
        }
        parent_style.display != DisplayType::Inline
    }
}

impl RenderKind {
    /// Whether the box lays its content out in its own lines.
    const fn is_block_container(&self) -> bool {
        matches!(
            self,
            Self::Block | Self::ListItem | Self::TableSection | Self::TableRow | Self::Table { .. }
        )
    }
}

/// [§ 4.1.1](https://www.w3.org/TR/css-text-3/#collapsible-white-space)
///
/// Spaces, tabs and segment breaks.
const fn is_collapsible_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

/// Consecutive placed characters on the same line form one box.
fn group_into_boxes(lines: &[Option<usize>]) -> Vec<InlineTextBox> {
    let mut boxes: Vec<InlineTextBox> = Vec::new();
    for (offset, line) in lines.iter().enumerate() {
        let Some(line) = *line else {
            continue;
        };
        match boxes.last_mut() {
            Some(last) if last.end() == offset && last.line == line => last.len += 1,
            _ => boxes.push(InlineTextBox {
                start: offset,
                len: 1,
                line,
            }),
        }
    }
    boxes
}

/// [CSS Text § 2.1](https://www.w3.org/TR/css-text-3/#text-transform-property)
///
/// Characters whose case mapping is not a single character are left alone
/// so that rendered and original offsets stay aligned.
fn transform(text: &[char], transform: TextTransform) -> Vec<char> {
    fn single(mut mapped: impl Iterator<Item = char>, fallback: char) -> char {
        match (mapped.next(), mapped.next()) {
            (Some(c), None) => c,
            _ => fallback,
        }
    }
    let mut at_word_start = true;
    text.iter()
        .map(|&c| {
            let mapped = match transform {
                TextTransform::None => c,
                TextTransform::Uppercase => single(c.to_uppercase(), c),
                TextTransform::Lowercase => single(c.to_lowercase(), c),
                TextTransform::Capitalize if at_word_start && c.is_alphanumeric() => single(c.to_uppercase(), c),
                TextTransform::Capitalize => c,
            };
            at_word_start = !c.is_alphanumeric();
            mapped
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_into_boxes_splits_on_gaps_and_lines() {
        let lines = [Some(0), Some(0), None, Some(0), Some(1)];
        let boxes = group_into_boxes(&lines);
        assert_eq!(
            boxes,
            vec![
                InlineTextBox { start: 0, len: 2, line: 0 },
                InlineTextBox { start: 3, len: 1, line: 0 },
                InlineTextBox { start: 4, len: 1, line: 1 },
            ]
        );
    }

    #[test]
    fn test_transform_keeps_length() {
        let text: Vec<char> = "straße ok".chars().collect();
        let upper = transform(&text, TextTransform::Uppercase);
        assert_eq!(upper.len(), text.len());
        assert_eq!(upper.iter().collect::<String>(), "STRAßE OK");
        let capitalized = transform(&text, TextTransform::Capitalize);
        assert_eq!(capitalized.iter().collect::<String>(), "Straße Ok");
    }
}
