//! Render objects: what layout decided about each rendered DOM node.

use koala_dom::NodeId;

use crate::style::{RenderStyle, Visibility};

/// [CSS Text § 9](https://www.w3.org/TR/css-text-3/#line-breaking)
///
/// One line's worth of a text node: the characters `start..start + len` of the
/// node's text, all placed on line `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineTextBox {
    /// Offset of the first character, in the node's characters.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
    /// Index of the line box the characters sit on.
    pub line: usize,
}

impl InlineTextBox {
    /// Offset just past the last character.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// [CSS Pseudo-Elements § 2.2 ::first-letter](https://www.w3.org/TR/css-pseudo-4/#first-letter-pseudo)
///
/// The first-letter part of a text node, rendered separately from the rest
/// (the "remaining fragment"). It covers the node's characters
/// `0..length`; the remaining text boxes start at `length` or later.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstLetter {
    /// Number of leading characters that belong to the first letter.
    pub length: usize,
    /// Boxes of the first-letter part, in the node's offsets.
    pub text_boxes: Vec<InlineTextBox>,
    /// The pseudo-element's own `visibility`.
    pub visibility: Visibility,
}

/// Layout state of a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderText {
    /// Rendered characters, after `text-transform`.
    pub text: Vec<char>,
    /// The node's characters as written.
    pub original_text: Vec<char>,
    /// Boxes in line order. With a first letter these are the remaining
    /// fragment's boxes only.
    pub text_boxes: Vec<InlineTextBox>,
    /// Whether any box was laid out right-to-left, so that line order and
    /// logical order differ.
    pub contains_reversed_text: bool,
    /// The `::first-letter` part, when the text starts its block.
    pub first_letter: Option<FirstLetter>,
}

impl RenderText {
    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the node has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset where the remaining fragment starts (0 without a first letter).
    #[must_use]
    pub fn fragment_start(&self) -> usize {
        self.first_letter.as_ref().map_or(0, |letter| letter.length)
    }

    /// The boxes of every part of the node, first letter first.
    pub fn all_text_boxes(&self) -> impl Iterator<Item = &InlineTextBox> {
        self.first_letter
            .iter()
            .flat_map(|letter| letter.text_boxes.iter())
            .chain(self.text_boxes.iter())
    }
}

/// A replaced image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderImage {
    /// The `alt` attribute, used as the image's text equivalent.
    pub alt_text: Vec<char>,
}

/// Where a table cell sits in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCellPosition {
    /// Row index within the table, counted across row groups.
    pub row: usize,
    /// Column index within the row.
    pub column: usize,
    /// Whether the previous row has a cell in this column.
    pub has_cell_above: bool,
}

impl TableCellPosition {
    /// Whether another cell precedes this one in its row.
    #[must_use]
    pub const fn has_cell_before(&self) -> bool {
        self.column > 0
    }
}

/// What kind of box a node generated.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderKind {
    /// The document's initial containing block.
    View,
    /// Block container.
    Block,
    /// Block container with a marker.
    ListItem,
    /// Inline box.
    Inline,
    /// Inline-level block container (buttons, checkboxes, `inline-block`).
    InlineBlock,
    /// Text.
    Text(RenderText),
    /// `<img>` or `<video>`.
    Image(RenderImage),
    /// Embedded content: `<iframe>`, `<embed>`, `<object>`, `<canvas>`.
    Widget,
    /// `<textarea>` or a text-like `<input>`, rendered through its user-agent
    /// shadow tree.
    TextControl,
    /// `<br>`.
    LineBreak,
    /// `<hr>`.
    HorizontalRule,
    /// Table wrapper.
    Table {
        /// `display: inline-table`.
        inline: bool,
    },
    /// Row group.
    TableSection,
    /// Row.
    TableRow,
    /// Cell.
    TableCell(TableCellPosition),
}

/// The layout facts for one rendered node.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    /// The node this renders.
    pub node: NodeId,
    /// Box classification.
    pub kind: RenderKind,
    /// Computed style. For text this is the parent element's style.
    pub style: RenderStyle,
    /// First line the box's content occupies.
    pub first_line: usize,
    /// Last line the box's content occupies.
    pub last_line: usize,
    /// Border-box height in px.
    pub height: f32,
    /// [CSS 2 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// The bottom margin after collapsing with the last in-flow child's.
    pub collapsed_margin_after: f32,
    /// Whether the content box has zero width or zero height.
    pub content_box_is_empty: bool,
}

impl RenderObject {
    /// Text layout state, for text renderers.
    #[must_use]
    pub const fn render_text(&self) -> Option<&RenderText> {
        match &self.kind {
            RenderKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this renders text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, RenderKind::Text(_))
    }

    /// Whether this is a replaced image.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self.kind, RenderKind::Image(_))
    }

    /// The image's `alt` text.
    #[must_use]
    pub fn alt_text(&self) -> Option<&[char]> {
        match &self.kind {
            RenderKind::Image(image) => Some(&image.alt_text),
            _ => None,
        }
    }

    /// Whether this is embedded content.
    #[must_use]
    pub const fn is_widget(&self) -> bool {
        matches!(self.kind, RenderKind::Widget)
    }

    /// Whether this is a text control.
    #[must_use]
    pub const fn is_text_control(&self) -> bool {
        matches!(self.kind, RenderKind::TextControl)
    }

    /// Whether this is a `<br>`.
    #[must_use]
    pub const fn is_br(&self) -> bool {
        matches!(self.kind, RenderKind::LineBreak)
    }

    /// Whether this is an `<hr>`.
    #[must_use]
    pub const fn is_hr(&self) -> bool {
        matches!(self.kind, RenderKind::HorizontalRule)
    }

    /// Whether this is a table wrapper (block or inline).
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self.kind, RenderKind::Table { .. })
    }

    /// Whether this is a table row.
    #[must_use]
    pub const fn is_table_row(&self) -> bool {
        matches!(self.kind, RenderKind::TableRow)
    }

    /// Whether this is a table cell.
    #[must_use]
    pub const fn is_table_cell(&self) -> bool {
        matches!(self.kind, RenderKind::TableCell(_))
    }

    /// The cell's place in its table.
    #[must_use]
    pub const fn table_cell(&self) -> Option<&TableCellPosition> {
        match &self.kind {
            RenderKind::TableCell(position) => Some(position),
            _ => None,
        }
    }

    /// [CSS Display § 2.1](https://www.w3.org/TR/css-display-3/#inline-level)
    ///
    /// Whether the box participates in an inline formatting context.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        match self.kind {
            RenderKind::Text(_) | RenderKind::Inline | RenderKind::LineBreak => true,
            RenderKind::Image(_)
            | RenderKind::Widget
            | RenderKind::InlineBlock
            | RenderKind::TextControl
            | RenderKind::Table { inline: true } => !self.is_floating_or_out_of_flow_positioned(),
            _ => false,
        }
    }

    /// Whether this is a block container (including tables).
    #[must_use]
    pub const fn is_render_block(&self) -> bool {
        self.is_render_block_flow() || matches!(self.kind, RenderKind::Table { .. })
    }

    /// Whether this is a block container holding lines or blocks.
    #[must_use]
    pub const fn is_render_block_flow(&self) -> bool {
        matches!(
            self.kind,
            RenderKind::View
                | RenderKind::Block
                | RenderKind::ListItem
                | RenderKind::InlineBlock
                | RenderKind::TextControl
                | RenderKind::HorizontalRule
                | RenderKind::TableCell(_)
        )
    }

    /// Whether the box generates a box (as opposed to inline content).
    #[must_use]
    pub const fn is_box(&self) -> bool {
        !matches!(
            self.kind,
            RenderKind::Text(_) | RenderKind::Inline | RenderKind::LineBreak
        )
    }

    /// Whether the box is floated or absolutely positioned.
    #[must_use]
    pub fn is_floating_or_out_of_flow_positioned(&self) -> bool {
        !self.is_text() && (self.style.is_floating() || self.style.is_out_of_flow_positioned())
    }

    /// Whether the box is absolutely positioned.
    #[must_use]
    pub fn is_out_of_flow_positioned(&self) -> bool {
        !self.is_text() && self.style.is_out_of_flow_positioned()
    }

    /// Whether the box clips its overflowing content.
    #[must_use]
    pub fn has_overflow_clip(&self) -> bool {
        self.is_box() && self.style.clips_overflow()
    }

    /// Whether the box is painted.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.style.is_visible()
    }
}
