use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xi_rope::Rope;

use crate::model::PropertyPath;

string_id!(
    /// Unique identifier of a node in a document
    NodeId
);

/// A document node.
///
/// Text nodes own exactly one text property (`content`), stored as a rope.
/// Structural nodes (figures, tables, ...) have no text content.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub node_type: String,
    content: Option<Rope>,
    pub properties: BTreeMap<String, String>,
}

impl Node {
    /// Create a text node
    pub fn text(id: impl Into<NodeId>, node_type: impl Into<String>, content: &str) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: Some(Rope::from(content)),
            properties: BTreeMap::new(),
        }
    }

    /// Create a node without text content
    pub fn structural(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn is_text(&self) -> bool {
        self.content.is_some()
    }

    /// True for text nodes without any content
    pub fn is_empty(&self) -> bool {
        self.content.as_ref().is_some_and(|rope| rope.len() == 0)
    }

    pub fn text_content(&self) -> Option<String> {
        self.content.as_ref().map(|rope| rope.to_string())
    }

    pub fn text_len(&self) -> Option<usize> {
        self.content.as_ref().map(Rope::len)
    }

    pub fn text_path(&self) -> PropertyPath {
        PropertyPath::text(&self.id)
    }

    pub(crate) fn content(&self) -> Option<&Rope> {
        self.content.as_ref()
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut Rope> {
        self.content.as_mut()
    }

    /// Copy of everything but the identity, used when splitting a node
    pub fn to_spec(&self) -> NodeSpec {
        NodeSpec {
            id: None,
            node_type: self.node_type.clone(),
            content: self.text_content(),
            properties: self.properties.clone(),
        }
    }
}

impl From<NodeSpec> for Node {
    fn from(spec: NodeSpec) -> Self {
        Self {
            id: spec.id.unwrap_or_else(|| NodeId::generate(&spec.node_type)),
            node_type: spec.node_type,
            content: spec.content.map(Rope::from),
            properties: spec.properties,
        }
    }
}

/// Description of a node to create.
///
/// Also the serialized form of nodes in document data files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl NodeSpec {
    pub fn text(node_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            node_type: node_type.into(),
            content: Some(content.into()),
            properties: BTreeMap::new(),
        }
    }
}

impl From<&Node> for NodeSpec {
    fn from(node: &Node) -> Self {
        Self {
            id: Some(node.id.clone()),
            ..node.to_spec()
        }
    }
}
