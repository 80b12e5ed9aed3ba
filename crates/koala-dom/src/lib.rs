//! DOM tree implementation for the Koala text engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), extended with the
//! pieces text iteration needs: shadow trees, tree-order traversal, node
//! indices, boundary points and ranges.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Shadow
//! roots live in the same arena; they have no parent and point back at their
//! host instead.

mod fixture;
mod range;

pub use fixture::DomError;
pub use range::{Position, Range, RangeError, compare_positions};

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    ///
    /// Always `None` for shadow roots; see [`DomTree::shadow_host`].
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,

    /// Shadow roots hosted by this element, in attachment order (youngest last).
    pub shadow_roots: Vec<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
    /// "A shadow root is always attached to another node tree through its host."
    ShadowRoot(ShadowRootData),
}

/// Element-specific data.
///
/// NOTE: We only store tag_name (local name) and attrs for simplicity.
/// Full spec compliance would require namespace handling, custom elements, etc.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Returns the element's id attribute value if present.
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Returns the set of class names from the class attribute.
    pub fn classes(&self) -> HashSet<&str> {
        match self.attrs.get("class") {
            Some(classlist) => classlist.split(' ').collect(),
            None => HashSet::new(),
        }
    }
}

/// Who created a shadow root.
///
/// Author roots come from page script; user-agent roots hold the internal
/// structure of controls such as `<input>` and `<textarea>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowRootKind {
    /// Created by the page.
    Author,
    /// Created by the engine for a built-in control.
    UserAgent,
}

/// Shadow-root-specific data.
#[derive(Debug, Clone, Copy)]
pub struct ShadowRootData {
    /// "A shadow root's mode"
    pub kind: ShadowRootKind,
    /// [§ 4.8](https://dom.spec.whatwg.org/#concept-documentfragment-host)
    /// "its host is the element it is attached to"
    pub host: NodeId,
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document node is always at index 0 (NodeId::ROOT).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    pub fn new() -> Self {
        DomTree {
            nodes: vec![Node::detached(NodeType::Document)],
        }
    }

    /// Get the root document node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Whether `id` refers to a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    // ========== builders ==========

    /// Allocate a detached element with no attributes.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData {
            tag_name: tag.to_ascii_lowercase(),
            attrs: AttributesMap::new(),
        }))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, data: &str) -> NodeId {
        let id = self.create_text(data);
        self.append_child(parent, id);
        id
    }

    /// Set an attribute on an element. Does nothing for other node types.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeType::Element(data)) = self.get_mut(id).map(|n| &mut n.node_type) {
            let _ = data.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    /// [§ 4.10.5 The input element](https://html.spec.whatwg.org/multipage/input.html#the-input-element)
    ///
    /// Append an `<input>` or `<textarea>` whose value is rendered through a
    /// user-agent shadow tree (`#shadow-root > div > #text`), the way engines
    /// build the inner editor of text controls.
    ///
    /// # Errors
    /// Returns [`DomError::DuplicateUserAgentShadowRoot`] only if the freshly
    /// created control already had one, which cannot happen.
    pub fn append_text_control(
        &mut self,
        parent: NodeId,
        tag: &str,
        value: &str,
    ) -> Result<NodeId, DomError> {
        let control = self.append_element(parent, tag);
        self.fill_text_control(control, value)?;
        Ok(control)
    }

    pub(crate) fn fill_text_control(&mut self, control: NodeId, value: &str) -> Result<(), DomError> {
        self.set_attribute(control, "value", value);
        let root = self.attach_shadow(control, ShadowRootKind::UserAgent)?;
        let inner_editor = self.append_element(root, "div");
        if !value.is_empty() {
            let _ = self.append_text(inner_editor, value);
        }
        Ok(())
    }

    // ========== shadow trees ==========

    /// [§ 4.9 attachShadow](https://dom.spec.whatwg.org/#dom-element-attachshadow)
    ///
    /// Attach a new, empty shadow root of `kind` to `host` and return it.
    /// Author roots stack up (the newest is the youngest); a host has at most
    /// one user-agent root and it is always the oldest.
    ///
    /// # Errors
    /// [`DomError::NotAnElement`] if `host` is not an element, and
    /// [`DomError::DuplicateUserAgentShadowRoot`] for a second user-agent root.
    pub fn attach_shadow(&mut self, host: NodeId, kind: ShadowRootKind) -> Result<NodeId, DomError> {
        if self.as_element(host).is_none() {
            return Err(DomError::NotAnElement(host));
        }
        if kind == ShadowRootKind::UserAgent && self.user_agent_shadow_root(host).is_some() {
            return Err(DomError::DuplicateUserAgentShadowRoot(host));
        }
        let root = self.alloc(NodeType::ShadowRoot(ShadowRootData { kind, host }));
        let roots = &mut self.nodes[host.0].shadow_roots;
        match kind {
            ShadowRootKind::UserAgent => roots.insert(0, root),
            ShadowRootKind::Author => roots.push(root),
        }
        Ok(root)
    }

    fn shadow_root_data(&self, id: NodeId) -> Option<ShadowRootData> {
        match self.get(id)?.node_type {
            NodeType::ShadowRoot(data) => Some(data),
            _ => None,
        }
    }

    /// Whether `id` is a shadow root.
    #[must_use]
    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        self.shadow_root_data(id).is_some()
    }

    /// The kind of the shadow root `id`, or `None` for other nodes.
    #[must_use]
    pub fn shadow_root_kind(&self, id: NodeId) -> Option<ShadowRootKind> {
        self.shadow_root_data(id).map(|data| data.kind)
    }

    /// The host of the shadow root `id`, or `None` for other nodes.
    #[must_use]
    pub fn shadow_host(&self, id: NodeId) -> Option<NodeId> {
        self.shadow_root_data(id).map(|data| data.host)
    }

    /// All shadow roots of `host`, in attachment order.
    pub fn shadow_roots(&self, host: NodeId) -> &[NodeId] {
        self.get(host).map_or(&[], |n| n.shadow_roots.as_slice())
    }

    /// The most recently attached author shadow root of `host`.
    #[must_use]
    pub fn youngest_author_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow_roots(host)
            .iter()
            .rev()
            .copied()
            .find(|&root| self.shadow_root_kind(root) == Some(ShadowRootKind::Author))
    }

    /// The user-agent shadow root of `host`, if any.
    #[must_use]
    pub fn user_agent_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow_roots(host)
            .iter()
            .copied()
            .find(|&root| self.shadow_root_kind(root) == Some(ShadowRootKind::UserAgent))
    }

    /// The shadow root attached to the same host just before `root`.
    #[must_use]
    pub fn older_shadow_root(&self, root: NodeId) -> Option<NodeId> {
        let host = self.shadow_host(root)?;
        let roots = self.shadow_roots(host);
        let index = roots.iter().position(|&r| r == root)?;
        index.checked_sub(1).map(|older| roots[older])
    }

    /// The parent, or for a shadow root, its host.
    #[must_use]
    pub fn parent_or_shadow_host(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.shadow_host(id))
    }

    /// [§ 4.2.2 Root](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// The root of the tree `id` participates in, without crossing shadow
    /// boundaries.
    #[must_use]
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Whether `id` is a shadow root or lives inside a shadow tree.
    #[must_use]
    pub fn is_in_shadow_tree(&self, id: NodeId) -> bool {
        self.is_shadow_root(self.tree_root(id))
    }

    /// The host of the shadow tree containing `id`, if it is in one.
    #[must_use]
    pub fn containing_shadow_host(&self, id: NodeId) -> Option<NodeId> {
        self.shadow_host(self.tree_root(id))
    }

    // ========== navigation ==========

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether the node has at least one child.
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Get the first child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// The child at `index`, if there is one.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// [§ 4.2.1 Index](https://dom.spec.whatwg.org/#concept-tree-index)
    ///
    /// "The index of an object is its number of preceding siblings, or 0 if
    /// it has none."
    #[must_use]
    pub fn node_index(&self, id: NodeId) -> usize {
        self.preceding_siblings(id).count()
    }

    /// Get the next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The node following `id` in tree order once its subtree is skipped.
    /// Does not leave the tree `id` is in.
    #[must_use]
    pub fn next_skipping_children(&self, id: NodeId) -> Option<NodeId> {
        if let Some(next) = self.next_sibling(id) {
            return Some(next);
        }
        self.ancestors(id).find_map(|ancestor| self.next_sibling(ancestor))
    }

    /// [§ 4.2 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
    ///
    /// The node following `id` in preorder, depth-first traversal.
    #[must_use]
    pub fn next_in_pre_order(&self, id: NodeId) -> Option<NodeId> {
        self.first_child(id).or_else(|| self.next_skipping_children(id))
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`. Does not cross
    /// shadow boundaries.
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    // ========== node data ==========

    /// Get element data if this node is an element.
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Whether this is a text node.
    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.as_text(id).is_some()
    }

    /// Whether this is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// The lowercase local name of an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Whether `id` is an element named `tag` (ASCII case-insensitive).
    #[must_use]
    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    /// The value of attribute `name` on an element.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    /// [§ 4.5 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// The first element (in creation order) whose id is `id`. Shadow trees
    /// are searched too, after the light tree.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&node| self.as_element(node).and_then(ElementData::id).is_some_and(|v| v == id))
            .min_by_key(|&node| self.is_in_shadow_tree(node))
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-length)
    ///
    /// "The length of a node node is ... CharacterData: node's data's length;
    /// any other node: the number of node's children."
    ///
    /// Character data lengths are counted in Unicode scalar values.
    #[must_use]
    pub fn max_offset(&self, id: NodeId) -> usize {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::Text(data) | NodeType::Comment(data)) => data.chars().count(),
            Some(_) => self.children(id).len(),
            None => 0,
        }
    }

    /// Whether offsets into this node count characters rather than children.
    #[must_use]
    pub fn offset_in_characters(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(|n| &n.node_type),
            Some(NodeType::Text(_) | NodeType::Comment(_))
        )
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.is_element(id))
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;

        self.children(html)
            .iter()
            .find(|&&id| self.has_tag(id, "body") || self.has_tag(id, "frameset"))
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    fn detached(node_type: NodeType) -> Self {
        Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            shadow_roots: Vec::new(),
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}
