use serde::{Deserialize, Serialize};

use crate::model::{ContainerId, Coordinate, NodeId, PropertyPath, TextRange};

/// Where a node selection sits relative to the node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelectionMode {
    Before,
    After,
    Full,
}

/// Selection inside a single text property
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySelection {
    pub path: PropertyPath,
    pub start_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<ContainerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,
}

impl PropertySelection {
    /// A caret at `offset`
    pub fn collapsed(path: PropertyPath, offset: usize) -> Self {
        Self {
            path,
            start_offset: offset,
            end_offset: None,
            container_id: None,
            surface_id: None,
        }
    }

    pub fn range(path: PropertyPath, start_offset: usize, end_offset: usize) -> Self {
        Self {
            end_offset: Some(end_offset),
            ..Self::collapsed(path, start_offset)
        }
    }

    pub fn with_container(mut self, container_id: Option<ContainerId>) -> Self {
        self.container_id = container_id;
        self
    }

    pub fn with_surface(mut self, surface_id: Option<String>) -> Self {
        self.surface_id = surface_id;
        self
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset.unwrap_or(self.start_offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset()
    }
}

/// Selection that may span several properties of a container
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSelection {
    pub start: Coordinate,
    pub end: Coordinate,
    pub container_id: ContainerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,
}

/// Selection of a whole node, or the gap before/after it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSelection {
    pub node_id: NodeId,
    pub mode: NodeSelectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<ContainerId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Property(PropertySelection),
    Container(ContainerSelection),
    Node(NodeSelection),
}

impl Selection {
    pub fn caret(path: PropertyPath, offset: usize, container_id: Option<ContainerId>) -> Self {
        Selection::Property(PropertySelection::collapsed(path, offset).with_container(container_id))
    }

    pub fn node(node_id: NodeId, mode: NodeSelectionMode, container_id: Option<ContainerId>) -> Self {
        Selection::Node(NodeSelection {
            node_id,
            mode,
            container_id,
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn container_id(&self) -> Option<&ContainerId> {
        match self {
            Selection::None => None,
            Selection::Property(sel) => sel.container_id.as_ref(),
            Selection::Container(sel) => Some(&sel.container_id),
            Selection::Node(sel) => sel.container_id.as_ref(),
        }
    }

    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Selection::Property(sel) => sel.surface_id.as_deref(),
            Selection::Container(sel) => sel.surface_id.as_deref(),
            Selection::None | Selection::Node(_) => None,
        }
    }

    /// Text range covered by this selection, start before end.
    ///
    /// Node selections and the empty selection have no text range.
    pub fn text_range(&self) -> Option<TextRange> {
        match self {
            Selection::Property(sel) => {
                let (start, end) = ordered(sel.start_offset, sel.end_offset());
                Some(TextRange::new(
                    Coordinate::new(sel.path.clone(), start),
                    Coordinate::new(sel.path.clone(), end),
                ))
            }
            Selection::Container(sel) => {
                if sel.start.path == sel.end.path && sel.start.offset > sel.end.offset {
                    Some(TextRange::new(sel.end.clone(), sel.start.clone()))
                } else {
                    Some(TextRange::new(sel.start.clone(), sel.end.clone()))
                }
            }
            Selection::None | Selection::Node(_) => None,
        }
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
