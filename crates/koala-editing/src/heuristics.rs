//! Node predicates shared by the forward and backwards iterators: where the
//! text stream gets synthetic newlines, tabs and spaces.

use koala_dom::{DomTree, NodeId};
use koala_layout::{RenderObject, WhiteSpace};

use crate::context::TextContext;

/// Elements that behave as paragraphs even when they are not rendered.
const BLOCK_TAGS: &[&str] = &[
    "blockquote", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "listing",
    "ol", "p", "pre", "tr", "ul",
];

/// Headings and paragraphs get an extra newline for a large bottom margin.
const MARGIN_NEWLINE_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p"];

/// [§ 4.10.2 Categories](https://html.spec.whatwg.org/multipage/forms.html#categories)
///
/// "Listed elements", plus the few others that render like controls.
const FORM_CONTROL_TAGS: &[&str] = &["button", "fieldset", "input", "keygen", "output", "select", "textarea"];

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn has_any_tag(dom: &DomTree, node: NodeId, tags: &[&str]) -> bool {
    dom.tag_name(node).is_some_and(|tag| tags.contains(&tag))
}

/// Whether `node` is a form control element.
pub(crate) fn is_form_control(dom: &DomTree, node: NodeId) -> bool {
    has_any_tag(dom, node, FORM_CONTROL_TAGS)
}

/// Elements handled like replaced content even though they have children.
pub(crate) fn is_form_control_like(dom: &DomTree, node: NodeId) -> bool {
    is_form_control(dom, node) || has_any_tag(dom, node, &["legend", "meter", "progress"])
}

/// Whether `node` or one of its ancestors (in the same tree) is a form
/// control.
pub(crate) fn is_in_form_control(dom: &DomTree, node: NodeId) -> bool {
    is_form_control(dom, node) || dom.ancestors(node).any(|ancestor| is_form_control(dom, ancestor))
}

/// Whether editing could put children inside `node`.
pub(crate) fn can_have_children_for_editing(dom: &DomTree, node: NodeId) -> bool {
    !dom.offset_in_characters(node) && !has_any_tag(dom, node, VOID_TAGS)
}

fn is_table_cell(ctx: TextContext<'_>, node: NodeId) -> bool {
    match ctx.renderer(node) {
        Some(renderer) => renderer.is_table_cell(),
        None => ctx.dom.has_tag(node, "td") || ctx.dom.has_tag(node, "th"),
    }
}

pub(crate) fn is_rendered_table(ctx: TextContext<'_>, node: NodeId) -> bool {
    ctx.dom.is_element(node) && ctx.renderer(node).is_some_and(RenderObject::is_table)
}

fn enclosing_table(ctx: TextContext<'_>, node: NodeId) -> Option<&RenderObject> {
    ctx.dom
        .ancestors(node)
        .filter_map(|ancestor| ctx.renderer(ancestor))
        .find(|renderer| renderer.is_table())
}

/// Table cells after the first in their row, or below another cell, are
/// delimited by a tab.
pub(crate) fn should_emit_tab_before_node(ctx: TextContext<'_>, node: NodeId) -> bool {
    ctx.renderer(node)
        .and_then(RenderObject::table_cell)
        .is_some_and(|cell| cell.has_cell_before() || cell.has_cell_above)
}

/// `<br>` is a newline, except inside the shadow tree of an `<input>`,
/// whose value is a single line.
pub(crate) fn should_emit_newline_for_node(ctx: TextContext<'_>, node: NodeId, emits_original_text: bool) -> bool {
    let is_br = ctx
        .renderer(node)
        .map_or_else(|| ctx.dom.has_tag(node, "br"), RenderObject::is_br);
    if !is_br {
        return false;
    }
    emits_original_text
        || !ctx
            .dom
            .containing_shadow_host(node)
            .is_some_and(|host| ctx.dom.has_tag(host, "input"))
}

/// Block flow is represented by a newline both before and after the block.
pub(crate) fn should_emit_newlines_before_and_after_node(ctx: TextContext<'_>, node: NodeId) -> bool {
    let Some(renderer) = ctx.renderer(node) else {
        return has_any_tag(ctx.dom, node, BLOCK_TAGS);
    };
    // Cells are tab-delimited instead.
    if is_table_cell(ctx, node) {
        return false;
    }
    if renderer.is_table_row() {
        return enclosing_table(ctx, node).is_some_and(|table| !table.is_inline());
    }
    !renderer.is_inline()
        && renderer.is_render_block()
        && !renderer.is_floating_or_out_of_flow_positioned()
        && !ctx.dom.has_tag(node, "body")
}

/// A block gets a trailing newline unless it is the last rendered thing in
/// its tree.
pub(crate) fn should_emit_newline_after_node(ctx: TextContext<'_>, node: NodeId) -> bool {
    if !should_emit_newlines_before_and_after_node(ctx, node) {
        return false;
    }
    std::iter::successors(ctx.dom.next_skipping_children(node), |&n| ctx.dom.next_skipping_children(n))
        .any(|next| ctx.layout.has_renderer(next))
}

pub(crate) fn should_emit_newline_before_node(ctx: TextContext<'_>, node: NodeId) -> bool {
    should_emit_newlines_before_and_after_node(ctx, node)
}

/// [CSS 2 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// Paragraphs and headings whose collapsed bottom margin is at least half
/// their font size read as separated by a blank line.
pub(crate) fn should_emit_extra_newline_for_node(ctx: TextContext<'_>, node: NodeId) -> bool {
    let Some(renderer) = ctx.renderer(node) else {
        return false;
    };
    renderer.is_box()
        && has_any_tag(ctx.dom, node, MARGIN_NEWLINE_TAGS)
        && renderer.collapsed_margin_after * 2.0 >= renderer.style.font_size
}

/// Space characters that CSS collapses in `normal` white-space.
pub(crate) const fn is_collapsible_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n')
}

/// [CSS Text § 4.1.1](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Whether `c` is collapsible under `white_space`.
pub(crate) const fn is_collapsible_under(white_space: WhiteSpace, c: char) -> bool {
    match c {
        ' ' | '\t' => white_space.collapses_white_space(),
        '\n' => !white_space.preserves_newlines(),
        _ => false,
    }
}

/// Caret offset after the last rendered character of `node` (or the node's
/// length when nothing is rendered), plus the collapsed spaces that follow it.
pub(crate) fn max_offset_including_collapsed_spaces(ctx: TextContext<'_>, node: NodeId) -> usize {
    let Some(renderer) = ctx.renderer(node) else {
        return ctx.dom.max_offset(node);
    };
    if let Some(text) = renderer.render_text() {
        let offset = text.all_text_boxes().map(|b| b.end()).max().unwrap_or_else(|| text.len());
        let white_space = renderer.style.white_space;
        let collapsed = text.text[offset.min(text.len())..]
            .iter()
            .take_while(|&&c| is_collapsible_under(white_space, c))
            .count();
        return offset + collapsed;
    }
    if renderer.is_image() || renderer.is_widget() {
        return ctx.dom.children(node).len().max(1);
    }
    usize::from(renderer.is_hr())
}

/// [Unicode Bidi class WS](https://www.unicode.org/reports/tr9/#Bidirectional_Character_Types),
/// plus ASCII line breaks.
pub(crate) fn is_space_or_newline(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_whitespace() || c == '\u{b}';
    }
    matches!(c, '\u{1680}' | '\u{2000}'..='\u{200a}' | '\u{2028}' | '\u{205f}' | '\u{3000}')
}
