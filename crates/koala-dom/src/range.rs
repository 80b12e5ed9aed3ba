//! [§ 5 Ranges](https://dom.spec.whatwg.org/#ranges)
//!
//! Boundary points and static ranges over a [`DomTree`]. Ranges are plain
//! values: they are not updated when the tree changes, and the text engine
//! never mutates the tree while holding one.

use std::cmp::Ordering;

use thiserror::Error;

use crate::{DomTree, NodeId};

/// [§ 5.1 Boundary points](https://dom.spec.whatwg.org/#boundary-points)
///
/// "A boundary point is a tuple consisting of a node and an offset."
///
/// For character data the offset counts Unicode scalar values; for every other
/// node it counts children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// The boundary point's node.
    pub container: NodeId,
    /// The boundary point's offset.
    pub offset: usize,
}

impl Position {
    /// Create a boundary point.
    #[must_use]
    pub const fn new(container: NodeId, offset: usize) -> Self {
        Position { container, offset }
    }
}

/// Why a boundary point or range was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The boundary point's node is not in the tree.
    #[error("node {0:?} is not in the tree")]
    UnknownNode(NodeId),
    /// [§ 5.5](https://dom.spec.whatwg.org/#concept-range-bp-set)
    /// "If offset is greater than node's length, then throw an
    /// IndexSizeError."
    #[error("offset {offset} is greater than the node's length {max}")]
    IndexSize {
        /// The offending offset.
        offset: usize,
        /// The node's length.
        max: usize,
    },
    /// The start boundary point is after the end boundary point.
    #[error("range start is after range end")]
    WrongDocumentOrder,
}

/// [§ 5.3 Interface AbstractRange](https://dom.spec.whatwg.org/#interface-abstractrange)
///
/// A pair of boundary points. A well-formed range has `start <= end` in tree
/// order; [`Range::new`] enforces this, the struct literal does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// "start"
    pub start: Position,
    /// "end"
    pub end: Position,
}

impl Range {
    /// Create a validated range.
    ///
    /// # Errors
    /// Fails when either container is missing from `tree`, an offset is past the
    /// container's length, or `start` comes after `end`.
    pub fn new(tree: &DomTree, start: Position, end: Position) -> Result<Self, RangeError> {
        check_boundary_point(tree, start)?;
        check_boundary_point(tree, end)?;
        if compare_positions(tree, start, end) == Ordering::Greater {
            return Err(RangeError::WrongDocumentOrder);
        }
        Ok(Range { start, end })
    }

    /// A collapsed range at `position`.
    #[must_use]
    pub const fn collapsed_at(position: Position) -> Self {
        Range {
            start: position,
            end: position,
        }
    }

    /// [§ 5.5 selectNodeContents](https://dom.spec.whatwg.org/#dom-range-selectnodecontents)
    ///
    /// "Let length be the length of node. Set start to the boundary point
    /// (node, 0). Set end to the boundary point (node, length)."
    #[must_use]
    pub fn select_node_contents(tree: &DomTree, node: NodeId) -> Self {
        Range {
            start: Position::new(node, 0),
            end: Position::new(node, tree.max_offset(node)),
        }
    }

    /// [§ 5.3](https://dom.spec.whatwg.org/#range-collapsed)
    /// "A range is collapsed if its start node is its end node and its start
    /// offset is its end offset."
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// This range collapsed to its start (`to_start`) or its end.
    #[must_use]
    pub const fn collapsed_to(&self, to_start: bool) -> Self {
        if to_start {
            Range::collapsed_at(self.start)
        } else {
            Range::collapsed_at(self.end)
        }
    }

    /// Move the start, collapsing onto it if it passes the end.
    pub fn set_start(&mut self, tree: &DomTree, start: Position) {
        self.start = start;
        if compare_positions(tree, start, self.end) == Ordering::Greater {
            self.end = start;
        }
    }

    /// Move the end, collapsing onto it if it precedes the start.
    pub fn set_end(&mut self, tree: &DomTree, end: Position) {
        self.end = end;
        if compare_positions(tree, self.start, end) == Ordering::Greater {
            self.start = end;
        }
    }

    /// The first node whose contents the range covers: the start container
    /// itself for character data, else the child at the start offset, else
    /// whatever follows the start container once its children are skipped.
    #[must_use]
    pub fn first_node(&self, tree: &DomTree) -> Option<NodeId> {
        let container = self.start.container;
        if !tree.contains(container) {
            return None;
        }
        if tree.offset_in_characters(container) {
            return Some(container);
        }
        if let Some(child) = tree.child_at(container, self.start.offset) {
            return Some(child);
        }
        if self.start.offset == 0 {
            return Some(container);
        }
        tree.next_skipping_children(container)
    }
}

fn check_boundary_point(tree: &DomTree, position: Position) -> Result<(), RangeError> {
    if !tree.contains(position.container) {
        return Err(RangeError::UnknownNode(position.container));
    }
    let max = tree.max_offset(position.container);
    if position.offset > max {
        return Err(RangeError::IndexSize {
            offset: position.offset,
            max,
        });
    }
    Ok(())
}

/// One step on the way from a tree root down to a node. Shadow roots sort
/// before the host's children, youngest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    Root(usize),
    Shadow(usize),
    Child(usize),
}

fn path_to(tree: &DomTree, node: NodeId) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut current = node;
    loop {
        if let Some(parent) = tree.parent(current) {
            steps.push(Step::Child(tree.node_index(current)));
            current = parent;
        } else if let Some(host) = tree.shadow_host(current) {
            let roots = tree.shadow_roots(host);
            let age = roots.iter().rev().position(|&r| r == current).unwrap_or(roots.len());
            steps.push(Step::Shadow(age));
            current = host;
        } else {
            steps.push(Step::Root(current.0));
            break;
        }
    }
    steps.reverse();
    steps
}

/// [§ 5.1](https://dom.spec.whatwg.org/#concept-range-bp-position)
///
/// The position of boundary point `a` relative to `b`, in tree order extended
/// across shadow boundaries (a host's shadow trees come before its children).
#[must_use]
pub fn compare_positions(tree: &DomTree, a: Position, b: Position) -> Ordering {
    let mut path_a = path_to(tree, a.container);
    path_a.push(Step::Child(a.offset));
    let mut path_b = path_to(tree, b.container);
    path_b.push(Step::Child(b.offset));
    path_a.cmp(&path_b)
}
