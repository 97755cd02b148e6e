use crate::model::{AnnotationId, ContainerId, NodeId, PropertyPath};

/// Failures of an edit operation.
///
/// Every variant aborts the enclosing transaction: nothing the operation did
/// before failing is committed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Selection must lie within a single text property")]
    InvalidSelection,

    #[error("Expected a text node: {0}")]
    NotATextNode(NodeId),

    #[error("Cannot merge {first} with {second}")]
    UnsupportedMerge { first: NodeId, second: NodeId },

    #[error(
        "Unhandled relationship between annotation {annotation} [{start}, {end}) and edit [{edit_start}, {edit_end})"
    )]
    UnhandledAnnotationRelationship {
        annotation: AnnotationId,
        start: usize,
        end: usize,
        edit_start: usize,
        edit_end: usize,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node already exists: {0}")]
    NodeAlreadyExists(NodeId),

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    #[error("Annotation already exists: {0}")]
    AnnotationAlreadyExists(AnnotationId),

    #[error("Container not found: {0}")]
    ContainerNotFound(ContainerId),

    #[error("Node {node} is not shown in container {container}")]
    NodeNotInContainer { node: NodeId, container: ContainerId },

    #[error("Offset {offset} is out of bounds for {path} (length {len})")]
    OffsetOutOfBounds {
        path: PropertyPath,
        offset: usize,
        len: usize,
    },

    #[error("Offset {offset} in {path} is not on a character boundary")]
    InvalidOffset { path: PropertyPath, offset: usize },

    #[error("Path does not address a text property: {0}")]
    InvalidPath(PropertyPath),
}
