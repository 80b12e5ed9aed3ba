//! Find-in-page: stepping from match to match over a scope, and listing every
//! match for highlighting.

use koala_dom::{DomTree, NodeId, Position, Range};

use crate::behavior::FindOptions;
use crate::context::TextContext;
use crate::error::FindError;
use crate::operations::find_plain_text;

/// Searches a fixed scope, usually the whole document.
///
/// Searches that start inside a shadow tree stay in it first, then continue
/// in the tree around it. Matches inside shadow trees are found from the
/// outside as well, since searching enters author shadow roots and text
/// controls.
#[derive(Debug, Clone, Copy)]
pub struct TextFinder<'a> {
    ctx: TextContext<'a>,
    scope: Range,
}

impl<'a> TextFinder<'a> {
    /// A finder over `scope`.
    #[must_use]
    pub const fn new(ctx: TextContext<'a>, scope: Range) -> Self {
        TextFinder { ctx, scope }
    }

    /// A finder over the whole document of `ctx`.
    #[must_use]
    pub fn for_document(ctx: TextContext<'a>) -> Self {
        let scope = Range::select_node_contents(ctx.dom, ctx.dom.root());
        TextFinder { ctx, scope }
    }

    /// The searched scope.
    #[must_use]
    pub const fn scope(&self) -> Range {
        self.scope
    }

    /// The match after `active_match`, or before it with
    /// [`FindOptions::BACKWARDS`]. Without an active match the search covers
    /// the whole scope.
    ///
    /// With [`FindOptions::WRAP_AROUND`] a search that runs off the end of the
    /// scope starts over from the other end, so the active match itself may
    /// come back when it is the only one.
    ///
    /// # Errors
    /// [`FindError::EmptyTarget`] when `target` is empty.
    pub fn find_next(
        &self,
        active_match: Option<&Range>,
        target: &str,
        options: FindOptions,
    ) -> Result<Option<Range>, FindError> {
        if target.is_empty() {
            return Err(FindError::EmptyTarget);
        }
        let dom = self.ctx.dom;
        let forward = !options.contains(FindOptions::BACKWARDS);

        let mut search_range = self.scope;
        if let Some(active) = active_match {
            if forward {
                search_range.set_start(dom, active.end);
            } else {
                search_range.set_end(dom, active.start);
            }
        }

        // Stay inside the shadow tree of the active match.
        let shadow_tree_root = active_match.and_then(|active| self.shadow_tree_root(active.start.container));
        if let Some(root) = shadow_tree_root {
            if forward {
                search_range.set_end(dom, Position::new(root, dom.max_offset(root)));
            } else {
                search_range.set_start(dom, Position::new(root, 0));
            }
        }

        let mut result = find_plain_text(self.ctx, &search_range, target, options)?;

        // Nothing left in the shadow tree: continue around its host.
        if result.is_collapsed() {
            let host = shadow_tree_root.and_then(|root| dom.shadow_host(root));
            let boundary = host.and_then(|host| {
                if forward {
                    position_after(dom, host)
                } else {
                    position_before(dom, host)
                }
            });
            if let Some(boundary) = boundary {
                let mut search_range = self.scope;
                if forward {
                    search_range.set_start(dom, boundary);
                } else {
                    search_range.set_end(dom, boundary);
                }
                result = find_plain_text(self.ctx, &search_range, target, options)?;
            }
        }

        if result.is_collapsed() && options.contains(FindOptions::WRAP_AROUND) {
            result = find_plain_text(self.ctx, &self.scope, target, options)?;
        }

        Ok((!result.is_collapsed()).then_some(result))
    }

    /// Every match in the scope, in document order.
    ///
    /// Each search resumes at the end of the previous match, so matches do
    /// not overlap. `BACKWARDS` and `WRAP_AROUND` are ignored.
    ///
    /// # Errors
    /// [`FindError::EmptyTarget`] when `target` is empty.
    pub fn find_all(&self, target: &str, options: FindOptions) -> Result<Vec<Range>, FindError> {
        let dom = self.ctx.dom;
        let options = options.difference(FindOptions::BACKWARDS | FindOptions::WRAP_AROUND);
        let mut matches = Vec::new();
        let mut search_range = self.scope;

        loop {
            let result = find_plain_text(self.ctx, &search_range, target, options)?;
            if result.is_collapsed() {
                // A search that started in a shadow tree only covers that
                // tree; pick up again after its host.
                let Some(host) = dom.containing_shadow_host(result.start.container) else {
                    break;
                };
                let Some(after_host) = position_after(dom, host) else {
                    break;
                };
                let previous = search_range;
                search_range = self.scope;
                search_range.set_start(dom, after_host);
                if search_range == previous {
                    break;
                }
                continue;
            }

            matches.push(result);
            search_range.set_start(dom, result.end);
            if search_range.is_collapsed()
                && let Some(root) = self.shadow_tree_root(search_range.start.container)
            {
                search_range.set_end(dom, Position::new(root, dom.max_offset(root)));
            }
        }

        Ok(matches)
    }

    /// The root of the shadow tree `node` is in, if any.
    fn shadow_tree_root(&self, node: NodeId) -> Option<NodeId> {
        let dom = self.ctx.dom;
        dom.is_in_shadow_tree(node).then(|| dom.tree_root(node))
    }
}

/// The boundary point just after `node` in its parent.
fn position_after(dom: &DomTree, node: NodeId) -> Option<Position> {
    let parent = dom.parent(node)?;
    Some(Position::new(parent, dom.node_index(node) + 1))
}

/// The boundary point just before `node` in its parent.
fn position_before(dom: &DomTree, node: NodeId) -> Option<Position> {
    let parent = dom.parent(node)?;
    Some(Position::new(parent, dom.node_index(node)))
}
