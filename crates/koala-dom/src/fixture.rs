//! JSON document fixtures.
//!
//! Koala has no HTML parser in this workspace; documents for tests and the CLI
//! are written as JSON instead. A node is either a string (a text node) or an
//! object:
//!
//! ```json
//! { "tag": "p", "id": "intro", "style": "white-space: pre",
//!   "attrs": { "alt": "logo" }, "value": "for text controls",
//!   "children": ["Hello ", { "tag": "b", "children": ["world"] }],
//!   "shadow": [ { "mode": "author", "children": ["shadow text"] } ] }
//! ```
//!
//! `{ "comment": "..." }` creates a comment. The document itself is either a
//! single node or an array of nodes, appended to the Document node.

use std::collections::BTreeMap;

use koala_common::warning::warn_once;
use serde::Deserialize;
use thiserror::Error;

use crate::{DomTree, NodeId, NodeType, ShadowRootKind};

/// Errors from building or loading a DOM tree.
#[derive(Debug, Error)]
pub enum DomError {
    /// Shadow roots can only be attached to elements.
    #[error("node {0:?} is not an element and cannot host a shadow root")]
    NotAnElement(NodeId),
    /// A host has at most one user-agent shadow root.
    #[error("element {0:?} already has a user-agent shadow root")]
    DuplicateUserAgentShadowRoot(NodeId),
    /// The document fixture is not valid JSON or not a valid node description.
    #[error("invalid document fixture: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentJson {
    Many(Vec<NodeJson>),
    One(NodeJson),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeJson {
    Text(String),
    Comment(CommentJson),
    Element(ElementJson),
}

#[derive(Debug, Deserialize)]
struct CommentJson {
    comment: String,
}

#[derive(Debug, Deserialize)]
struct ElementJson {
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    children: Vec<NodeJson>,
    #[serde(default)]
    shadow: Vec<ShadowJson>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ShadowJson {
    #[serde(default = "author")]
    mode: ShadowRootKind,
    #[serde(default)]
    children: Vec<NodeJson>,
}

const fn author() -> ShadowRootKind {
    ShadowRootKind::Author
}

impl DomTree {
    /// Build a document from a JSON fixture (see the module docs for the format).
    ///
    /// # Errors
    /// Returns [`DomError::Json`] for malformed input and the shadow-root
    /// errors of [`DomTree::attach_shadow`] for impossible shadow trees.
    pub fn from_json(json: &str) -> Result<Self, DomError> {
        let document: DocumentJson = serde_json::from_str(json)?;
        let mut tree = DomTree::new();
        let nodes = match document {
            DocumentJson::Many(nodes) => nodes,
            DocumentJson::One(node) => vec![node],
        };
        for node in &nodes {
            tree.build_node(NodeId::ROOT, node)?;
        }
        Ok(tree)
    }

    fn build_node(&mut self, parent: NodeId, node: &NodeJson) -> Result<(), DomError> {
        match node {
            NodeJson::Text(data) => {
                let _ = self.append_text(parent, data);
            }
            NodeJson::Comment(CommentJson { comment }) => {
                let id = self.alloc(NodeType::Comment(comment.clone()));
                self.append_child(parent, id);
            }
            NodeJson::Element(element) => self.build_element(parent, element)?,
        }
        Ok(())
    }

    fn build_element(&mut self, parent: NodeId, element: &ElementJson) -> Result<(), DomError> {
        let id = self.append_element(parent, &element.tag);
        for (name, value) in &element.attrs {
            self.set_attribute(id, name, value);
        }
        if let Some(element_id) = &element.id {
            self.set_attribute(id, "id", element_id);
        }
        if let Some(style) = &element.style {
            self.set_attribute(id, "style", style);
        }
        for key in element.unknown.keys() {
            warn_once("DOM", &format!("ignoring unknown fixture field '{key}'"));
        }

        if let Some(value) = &element.value {
            if self.has_tag(id, "input") || self.has_tag(id, "textarea") {
                self.fill_text_control(id, value)?;
            } else {
                warn_once("DOM", &format!("'value' is only used on text controls, not <{}>", element.tag));
            }
        }

        for shadow in &element.shadow {
            let root = self.attach_shadow(id, shadow.mode)?;
            for child in &shadow.children {
                self.build_node(root, child)?;
            }
        }
        for child in &element.children {
            self.build_node(id, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_elements() {
        let tree = DomTree::from_json(r#"[{"tag": "p", "children": ["Hello ", {"tag": "b", "children": ["world"]}]}]"#)
            .unwrap();
        let p = tree.first_child(NodeId::ROOT).unwrap();
        assert!(tree.has_tag(p, "p"));
        assert_eq!(tree.children(p).len(), 2);
        assert_eq!(tree.as_text(tree.children(p)[0]), Some("Hello "));
    }

    #[test]
    fn test_single_node_document() {
        let tree = DomTree::from_json(r#"{"tag": "div", "id": "main"}"#).unwrap();
        assert_eq!(tree.get_element_by_id("main"), tree.first_child(NodeId::ROOT));
    }

    #[test]
    fn test_value_builds_user_agent_shadow_tree() {
        let tree = DomTree::from_json(r#"{"tag": "input", "value": "typed"}"#).unwrap();
        let input = tree.first_child(NodeId::ROOT).unwrap();
        let root = tree.user_agent_shadow_root(input).unwrap();
        let editor = tree.first_child(root).unwrap();
        assert_eq!(tree.as_text(tree.first_child(editor).unwrap()), Some("typed"));
    }

    #[test]
    fn test_comment_node() {
        let tree = DomTree::from_json(r#"[{"comment": "note"}, "text"]"#).unwrap();
        let comment = tree.first_child(NodeId::ROOT).unwrap();
        assert!(matches!(tree.get(comment).unwrap().node_type, NodeType::Comment(_)));
        assert!(tree.offset_in_characters(comment));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(DomTree::from_json("{"), Err(DomError::Json(_))));
    }
}
