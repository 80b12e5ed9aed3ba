//! The computed-style subset the text engine reads.
//!
//! [CSS Cascading § 4 Value processing](https://www.w3.org/TR/css-cascade-4/#value-stages)
//!
//! Styles come from three places, lowest priority first: the user-agent
//! defaults of [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html),
//! inheritance from the parent, and the element's `style` attribute.

use std::str::FromStr;

use koala_common::warning::warn_once;
use strum_macros::{Display, EnumString};

/// [§ 2 Box layout modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DisplayType {
    /// "The element and its descendants generate no boxes"
    None,
    /// Block-level block container.
    Block,
    /// Inline box.
    Inline,
    /// Inline-level block container.
    InlineBlock,
    /// Block box with a marker.
    ListItem,
    /// Block-level table wrapper.
    Table,
    /// Inline-level table wrapper.
    InlineTable,
    /// `tbody`.
    TableRowGroup,
    /// `thead`.
    TableHeaderGroup,
    /// `tfoot`.
    TableFooterGroup,
    /// `tr`.
    TableRow,
    /// `td`, `th`.
    TableCell,
}

/// [CSS 2 § 11.2 Visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    /// "The generated box is visible."
    Visible,
    /// "The generated box is invisible (fully transparent, nothing is
    /// drawn), but still affects layout."
    Hidden,
    /// Like hidden outside tables.
    Collapse,
}

/// [CSS Text § 3 White Space and Wrapping](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse, wrap.
    Normal,
    /// Preserve, no wrap.
    Pre,
    /// Collapse, no wrap.
    Nowrap,
    /// Preserve, wrap.
    PreWrap,
    /// Collapse spaces, preserve newlines, wrap.
    PreLine,
}

impl WhiteSpace {
    /// Whether spaces and tabs collapse.
    #[must_use]
    pub const fn collapses_white_space(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Whether segment breaks are preserved as forced line breaks.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Whether lines may wrap at soft wrap opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

/// [CSS Text § 2.1 Case Transforms](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TextTransform {
    /// No effect.
    None,
    /// First typographic letter of each word uppercased.
    Capitalize,
    /// All characters uppercased.
    Uppercase,
    /// All characters lowercased.
    Lowercase,
}

/// [CSS Positioned Layout § 2](https://www.w3.org/TR/css-position-3/#position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PositionType {
    /// Normal flow.
    Static,
    /// Normal flow, offset.
    Relative,
    /// Normal flow, stuck to the scrollport.
    Sticky,
    /// Out of flow, containing block is the nearest positioned ancestor.
    Absolute,
    /// Out of flow, containing block is the viewport.
    Fixed,
}

/// [CSS 2 § 9.5.1 The float property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Float {
    /// Not floated.
    None,
    /// Floated left.
    Left,
    /// Floated right.
    Right,
}

/// [CSS Overflow § 3](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Overflow {
    /// Content is not clipped.
    Visible,
    /// Clipped, scrollable programmatically.
    Hidden,
    /// Clipped, with scrollbars.
    Scroll,
    /// Clipped, scrollbars when needed.
    Auto,
    /// Clipped, not scrollable.
    Clip,
}

/// Computed values for one element (or the parent of one text node).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    /// `display`
    pub display: DisplayType,
    /// `visibility` (inherited)
    pub visibility: Visibility,
    /// `white-space` (inherited)
    pub white_space: WhiteSpace,
    /// `text-transform` (inherited)
    pub text_transform: TextTransform,
    /// `position`
    pub position: PositionType,
    /// `float`
    pub float: Float,
    /// `overflow`
    pub overflow: Overflow,
    /// `width` in px, `None` for `auto`.
    pub width: Option<f32>,
    /// `height` in px, `None` for `auto`.
    pub height: Option<f32>,
    /// `font-size` in px (inherited)
    pub font_size: f32,
    /// `margin-bottom` in px.
    pub margin_bottom: f32,
}

impl RenderStyle {
    /// Initial values for the root, with `font_size` as the medium font size.
    #[must_use]
    pub const fn initial(font_size: f32) -> Self {
        RenderStyle {
            display: DisplayType::Inline,
            visibility: Visibility::Visible,
            white_space: WhiteSpace::Normal,
            text_transform: TextTransform::None,
            position: PositionType::Static,
            float: Float::None,
            overflow: Overflow::Visible,
            width: None,
            height: None,
            font_size,
            margin_bottom: 0.0,
        }
    }

    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Inherited properties copied from `self`, everything else at its
    /// initial value.
    #[must_use]
    pub fn inherit(&self) -> Self {
        RenderStyle {
            visibility: self.visibility,
            white_space: self.white_space,
            text_transform: self.text_transform,
            font_size: self.font_size,
            ..RenderStyle::initial(self.font_size)
        }
    }

    /// Whether the box is painted.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Whether overflowing content is clipped.
    #[must_use]
    pub fn clips_overflow(&self) -> bool {
        self.overflow != Overflow::Visible
    }

    /// Whether the box is taken out of normal flow by `position`.
    #[must_use]
    pub fn is_out_of_flow_positioned(&self) -> bool {
        matches!(self.position, PositionType::Absolute | PositionType::Fixed)
    }

    /// Whether the box is floated.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.float != Float::None
    }

    /// [CSS 2 § 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'float' has a value other than 'none', the box is
    /// floated and 'display' is set according to the table below."
    pub(crate) fn blockify(&mut self) {
        if !(self.is_floating() || self.is_out_of_flow_positioned()) {
            return;
        }
        self.display = match self.display {
            DisplayType::Inline | DisplayType::InlineBlock => DisplayType::Block,
            DisplayType::InlineTable => DisplayType::Table,
            other => other,
        };
    }
}

/// Returns the default display value for an HTML element.
///
/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
/// [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
/// [§ 15.3.8 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2)
#[must_use]
pub fn default_display_for_element(tag_name: &str) -> DisplayType {
    // "The following elements must have their display set to none:"
    let hidden = [
        "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
        "param", "rp", "script", "style", "template", "title",
    ];
    if hidden.contains(&tag_name) {
        return DisplayType::None;
    }

    let block_elements = [
        "address", "article", "aside", "blockquote", "body", "caption", "center", "dd",
        "details", "dialog", "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure",
        "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html",
        "legend", "listing", "main", "menu", "nav", "ol", "p", "plaintext", "pre", "search",
        "section", "summary", "ul", "xmp",
    ];
    if block_elements.contains(&tag_name) {
        return DisplayType::Block;
    }

    match tag_name {
        // "li { display: list-item; }"
        "li" => DisplayType::ListItem,
        // "table { display: table; }" and friends
        "table" => DisplayType::Table,
        "thead" => DisplayType::TableHeaderGroup,
        "tbody" => DisplayType::TableRowGroup,
        "tfoot" => DisplayType::TableFooterGroup,
        "tr" => DisplayType::TableRow,
        "td" | "th" => DisplayType::TableCell,
        // Form controls are inline-block by default.
        "input" | "button" | "textarea" | "select" => DisplayType::InlineBlock,
        _ => DisplayType::Inline,
    }
}

/// Font size and bottom margin, both in `em` of the element's own font size,
/// from the suggested default style sheet.
fn default_font_and_margin(tag_name: &str) -> (f32, f32) {
    match tag_name {
        // "h1 { font-size: 2.00em; margin-block-end: 0.67em; }"
        "h1" => (2.0, 0.67),
        "h2" => (1.5, 0.83),
        "h3" => (1.17, 1.0),
        "h4" => (1.0, 1.33),
        "h5" => (0.83, 1.67),
        "h6" => (0.67, 2.33),
        // "p, blockquote, figure, listing, plaintext, pre, xmp, dl, ol, ul, menu
        //  { margin-block-end: 1em; }"
        "p" | "blockquote" | "figure" | "listing" | "plaintext" | "pre" | "xmp" | "dl" | "ol"
        | "ul" | "menu" => (1.0, 1.0),
        _ => (1.0, 0.0),
    }
}

/// Compute the style of an element named `tag_name` under `parent`.
#[must_use]
pub fn compute_style(tag_name: &str, inline_style: Option<&str>, parent: &RenderStyle) -> RenderStyle {
    let mut style = parent.inherit();

    // STEP 1: User-agent defaults.
    style.display = default_display_for_element(tag_name);
    let (font_scale, margin_em) = default_font_and_margin(tag_name);
    style.font_size = parent.font_size * font_scale;
    style.margin_bottom = style.font_size * margin_em;
    match tag_name {
        // "listing, plaintext, pre, xmp { white-space: pre; }"
        "listing" | "plaintext" | "pre" | "xmp" => style.white_space = WhiteSpace::Pre,
        // "textarea { white-space: pre-wrap; }"
        "textarea" => style.white_space = WhiteSpace::PreWrap,
        // "nobr { white-space: nowrap; }"
        "nobr" => style.white_space = WhiteSpace::Nowrap,
        _ => {}
    }

    // STEP 2: The style attribute.
    if let Some(declarations) = inline_style {
        apply_declarations(&mut style, declarations, parent.font_size);
    }

    style.blockify();
    style
}

/// Apply a `style` attribute's declarations.
///
/// `font-size` is resolved first so that `em` lengths in other declarations
/// refer to the element's own font size.
pub fn apply_declarations(style: &mut RenderStyle, declarations: &str, parent_font_size: f32) {
    let parsed: Vec<(String, &str)> = declarations
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim()))
        })
        .collect();

    for (_, value) in parsed.iter().filter(|(name, _)| name == "font-size") {
        match parse_length(value, parent_font_size) {
            Some(size) => style.font_size = size,
            None => unsupported("font-size", value),
        }
    }

    for (name, value) in parsed.iter().filter(|(name, _)| name != "font-size") {
        let keyword = value.to_ascii_lowercase();
        let applied = match name.as_str() {
            "display" => set_keyword(&mut style.display, &keyword),
            "visibility" => set_keyword(&mut style.visibility, &keyword),
            "white-space" => set_keyword(&mut style.white_space, &keyword),
            "text-transform" => set_keyword(&mut style.text_transform, &keyword),
            "position" => set_keyword(&mut style.position, &keyword),
            "float" => set_keyword(&mut style.float, &keyword),
            "overflow" => set_keyword(&mut style.overflow, &keyword),
            "width" => set_auto_length(&mut style.width, &keyword, style.font_size),
            "height" => set_auto_length(&mut style.height, &keyword, style.font_size),
            "margin-bottom" | "margin-block-end" => parse_length(&keyword, style.font_size)
                .map(|margin| style.margin_bottom = margin)
                .is_some(),
            // [CSS 2 § 8.3](https://www.w3.org/TR/CSS2/box.html#margin-properties)
            // "If there is only one component value, it applies to all sides. If
            // there are two or three values, the top is set to the first value and
            // the bottom is set to the third or, with two, the first."
            "margin" => {
                let parts: Vec<&str> = keyword.split_whitespace().collect();
                let bottom = match parts.len() {
                    1 | 2 => parts.first(),
                    _ => parts.get(2),
                };
                bottom
                    .and_then(|part| parse_length(part, style.font_size))
                    .map(|margin| style.margin_bottom = margin)
                    .is_some()
            }
            _ => false,
        };
        if !applied {
            unsupported(name, value);
        }
    }
}

fn unsupported(name: &str, value: &str) {
    warn_once("Layout", &format!("unsupported declaration '{name}: {value}'"));
}

fn set_keyword<T: FromStr>(slot: &mut T, keyword: &str) -> bool {
    keyword.parse().map(|parsed| *slot = parsed).is_ok()
}

fn set_auto_length(slot: &mut Option<f32>, value: &str, font_size: f32) -> bool {
    if value == "auto" {
        *slot = None;
        return true;
    }
    parse_length(value, font_size).map(|px| *slot = Some(px)).is_some()
}

/// [CSS Values § 5 Distance units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Unitless zero, `px`, `em` (of `font_size`) and `%` (of `font_size`, as for
/// `font-size`).
fn parse_length(value: &str, font_size: f32) -> Option<f32> {
    let value = value.trim();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok();
    }
    if let Some(number) = value.strip_suffix("em") {
        return number.trim().parse::<f32>().ok().map(|em| em * font_size);
    }
    if let Some(number) = value.strip_suffix('%') {
        return number.trim().parse::<f32>().ok().map(|pct| pct / 100.0 * font_size);
    }
    value.parse::<f32>().ok().filter(|&number| number == 0.0)
}
