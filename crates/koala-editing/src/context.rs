use koala_dom::{DomTree, NodeId};
use koala_layout::{RenderObject, RenderTree};

/// The two trees every text operation reads: the document and its layout.
///
/// Both are borrowed for the lifetime of an iterator; nothing here mutates
/// either tree, so any number of iterators may share one context.
#[derive(Debug, Clone, Copy)]
pub struct TextContext<'a> {
    /// The document.
    pub dom: &'a DomTree,
    /// Layout results for `dom`. Must be up to date.
    pub layout: &'a RenderTree,
}

impl<'a> TextContext<'a> {
    /// Pair a document with its render tree.
    #[must_use]
    pub const fn new(dom: &'a DomTree, layout: &'a RenderTree) -> Self {
        TextContext { dom, layout }
    }

    pub(crate) fn renderer(self, node: NodeId) -> Option<&'a RenderObject> {
        self.layout.get(node)
    }
}
