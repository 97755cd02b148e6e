use serde::Serialize;

use crate::document::TextEdit;
use crate::model::{AnnotationId, ContainerId, NodeId, PropertyPath, Selection};

/// One recorded mutation of a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    UpdateText {
        path: PropertyPath,
        edit: TextEdit,
    },
    CreateNode {
        id: NodeId,
    },
    DeleteNode {
        id: NodeId,
    },
    CreateAnnotation {
        id: AnnotationId,
        path: PropertyPath,
        start: usize,
        end: usize,
    },
    /// Annotation placement after the update
    UpdateAnnotation {
        id: AnnotationId,
        path: PropertyPath,
        start: usize,
        end: usize,
    },
    DeleteAnnotation {
        id: AnnotationId,
    },
    Show {
        container: ContainerId,
        node: NodeId,
        position: usize,
    },
    Hide {
        container: ContainerId,
        node: NodeId,
    },
}

/// Result of a committed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub operations: Vec<Operation>,
    pub new_selection: Selection,
    pub version: u64,
}

impl Patch {
    /// True when the transaction changed nothing but (maybe) the selection
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Text properties whose content changed, in first-touched order
    pub fn changed_paths(&self) -> Vec<&PropertyPath> {
        let mut paths: Vec<&PropertyPath> = Vec::new();
        for op in &self.operations {
            if let Operation::UpdateText { path, .. } = op {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}
