//! Tree cursor helpers shared by both iteration directions.
//!
//! [CSS Overflow § 3](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
//!
//! A box that clips its overflow and has an empty content box hides all of
//! its descendants, except those that are absolutely positioned and so escape
//! the clip. Iterators track this per tree level in a [`BitStack`] whose depth
//! always equals the traversal depth, shadow boundaries included.

use koala_dom::{DomTree, NodeId, Position};

use crate::bit_stack::BitStack;
use crate::context::TextContext;

/// Whether `node`'s box clips its overflow and has no room for content.
#[must_use]
pub fn fully_clips_contents(ctx: TextContext<'_>, node: NodeId) -> bool {
    ctx.renderer(node)
        .is_some_and(|renderer| renderer.has_overflow_clip() && renderer.content_box_is_empty)
}

/// Whether `node` escapes the clip of its containers (a non-text box that is
/// absolutely positioned).
#[must_use]
pub fn ignores_container_clip(ctx: TextContext<'_>, node: NodeId) -> bool {
    ctx.renderer(node)
        .is_some_and(koala_layout::RenderObject::is_out_of_flow_positioned)
}

/// Number of ancestors of `node`, counting shadow hosts as parents.
#[must_use]
pub fn depth_crossing_shadow_boundaries(dom: &DomTree, node: NodeId) -> usize {
    std::iter::successors(dom.parent_or_shadow_host(node), |&n| dom.parent_or_shadow_host(n)).count()
}

/// Push the clipped state of `node`, one level below the current top.
pub fn push_fully_clipped_state(stack: &mut BitStack, ctx: TextContext<'_>, node: NodeId) {
    debug_assert_eq!(stack.size(), depth_crossing_shadow_boundaries(ctx.dom, node));
    stack.push(fully_clips_contents(ctx, node) || (stack.top() && !ignores_container_clip(ctx, node)));
}

/// Fill `stack` with the clipped state of every ancestor of `node` (outermost
/// first, crossing shadow boundaries) and then of `node` itself.
pub fn set_up_fully_clipped_stack(stack: &mut BitStack, ctx: TextContext<'_>, node: NodeId) {
    let mut ancestry: Vec<NodeId> =
        std::iter::successors(ctx.dom.parent_or_shadow_host(node), |&n| ctx.dom.parent_or_shadow_host(n)).collect();
    ancestry.reverse();
    for ancestor in ancestry {
        push_fully_clipped_state(stack, ctx, ancestor);
    }
    push_fully_clipped_state(stack, ctx, node);
}

/// The first node, in preorder, that is entirely after `end`. Unlike plain
/// tree order this climbs out of shadow trees into the host's siblings.
#[must_use]
pub fn next_in_pre_order_crossing_shadow_boundaries(dom: &DomTree, end: Position) -> Option<NodeId> {
    if !dom.offset_in_characters(end.container)
        && let Some(next) = dom.child_at(end.container, end.offset)
    {
        return Some(next);
    }
    std::iter::successors(Some(end.container), |&n| dom.parent_or_shadow_host(n)).find_map(|n| dom.next_sibling(n))
}
