//! Emitted runs: what an iterator step produced and where it came from.

use koala_dom::{DomTree, NodeId, Position, Range};

/// The text of the current run.
///
/// Text from the document is borrowed straight out of the render tree;
/// characters the iterator synthesizes (newlines between blocks, tabs between
/// cells, collapsed spaces) are held inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RunText<'a> {
    /// A position marker with no text.
    #[default]
    None,
    /// One synthesized character.
    Char(char),
    /// Characters of a text node or an image's alt text.
    Slice(&'a [char]),
}

impl RunText<'_> {
    pub(crate) fn as_slice(&self) -> &[char] {
        match self {
            RunText::None => &[],
            RunText::Char(c) => std::slice::from_ref(c),
            RunText::Slice(chars) => chars,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.as_slice().len()
    }
}

/// The source range of a run, before node indices are resolved.
///
/// Runs that stand for a whole node (a replaced element, a line break) are
/// positioned in the node's parent around the node, but the node's index is
/// only computed if someone asks for the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LazyRange {
    /// The container of both boundary points.
    pub container: NodeId,
    /// When set, `start` and `end` are relative to this child's index.
    pub offset_base: Option<NodeId>,
    /// Start offset (relative when `offset_base` is set).
    pub start: usize,
    /// End offset (relative when `offset_base` is set).
    pub end: usize,
}

impl LazyRange {
    /// A range with absolute offsets.
    #[must_use]
    pub const fn absolute(container: NodeId, start: usize, end: usize) -> Self {
        LazyRange {
            container,
            offset_base: None,
            start,
            end,
        }
    }

    /// Turn relative offsets into boundary points.
    #[must_use]
    pub fn resolve(&self, dom: &DomTree) -> Range {
        let base = self.offset_base.map_or(0, |node| dom.node_index(node));
        Range {
            start: Position::new(self.container, self.start + base),
            end: Position::new(self.container, self.end + base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_adds_base_index() {
        let mut dom = DomTree::new();
        let div = dom.append_element(NodeId::ROOT, "div");
        let _ = dom.append_text(div, "a");
        let br = dom.append_element(div, "br");
        let lazy = LazyRange {
            container: div,
            offset_base: Some(br),
            start: 0,
            end: 1,
        };
        let range = lazy.resolve(&dom);
        assert_eq!(range.start, Position::new(div, 1));
        assert_eq!(range.end, Position::new(div, 2));
        assert_eq!(lazy.offset_base, Some(br));
    }

    #[test]
    fn test_run_text_lengths() {
        let chars = ['a', 'b'];
        assert_eq!(RunText::None.len(), 0);
        assert_eq!(RunText::Char('\n').as_slice(), &['\n']);
        assert_eq!(RunText::Slice(&chars).len(), 2);
    }
}
