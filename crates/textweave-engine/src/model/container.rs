use serde::{Deserialize, Serialize};

use crate::model::NodeId;

string_id!(
    /// Unique identifier of a container
    ContainerId
);

/// Ordered list of the node ids that make up a visible flow.
///
/// A node may exist in the document without being shown in any container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    #[serde(default)]
    nodes: Vec<NodeId>,
}

impl Container {
    pub fn new(id: impl Into<ContainerId>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
        }
    }

    pub fn with_nodes<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains(node_id)
    }

    pub fn position(&self, node_id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|id| id == node_id)
    }

    /// Show a node at `position` (clamped to the end).
    ///
    /// A node that is already shown is moved. Returns the final position.
    pub fn show(&mut self, node_id: NodeId, position: usize) -> usize {
        if let Some(current) = self.position(&node_id) {
            self.nodes.remove(current);
        }
        let position = position.min(self.nodes.len());
        self.nodes.insert(position, node_id);
        position
    }

    /// Hide a node; returns whether it was shown
    pub fn hide(&mut self, node_id: &NodeId) -> bool {
        match self.position(node_id) {
            Some(position) => {
                self.nodes.remove(position);
                true
            }
            None => false,
        }
    }

    /// Nodes directly before and after `node_id`
    pub fn neighbours(&self, node_id: &NodeId) -> (Option<&NodeId>, Option<&NodeId>) {
        match self.position(node_id) {
            Some(position) => (
                position.checked_sub(1).and_then(|p| self.nodes.get(p)),
                self.nodes.get(position + 1),
            ),
            None => (None, None),
        }
    }
}
