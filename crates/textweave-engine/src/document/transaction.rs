use std::collections::BTreeMap;

use serde::Serialize;
use xi_rope::delta::Builder;
use xi_rope::Rope;

use crate::document::Operation;
use crate::error::EditError;
use crate::model::{
    Annotation, AnnotationId, CONTENT_PROPERTY, Container, ContainerId, DocumentSchema, Node,
    NodeId, NodeSpec, PropertyPath, Selection,
};

/// A change to one text property
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextEdit {
    Insert { at: usize, text: String },
    Delete { start: usize, end: usize },
}

/// A change to one annotation's placement
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationEdit {
    Shift { start_delta: isize, end_delta: isize },
    SetRange { start: usize, end: usize },
    /// Re-anchor onto another property
    MoveTo {
        path: PropertyPath,
        start: usize,
        end: usize,
    },
}

/// Read/write capability the edit operations run against.
///
/// Every mutation is staged; whoever opened the transaction decides whether
/// the staged state is committed or dropped.
pub trait Transaction {
    fn schema(&self) -> &DocumentSchema;

    fn get(&self, id: &NodeId) -> Option<&Node>;

    /// Resolve a path to the text property it designates.
    ///
    /// A bare node id resolves to that node's `content` property.
    fn real_path(&self, path: &PropertyPath) -> Result<PropertyPath, EditError>;

    /// Byte length of the text at `path`
    fn text_len(&self, path: &PropertyPath) -> Result<usize, EditError>;

    fn text(&self, path: &PropertyPath) -> Result<String, EditError>;

    fn update_text(&mut self, path: &PropertyPath, edit: TextEdit) -> Result<(), EditError>;

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, EditError>;

    /// Delete a node together with every annotation anchored to it
    fn delete(&mut self, id: &NodeId) -> Result<(), EditError>;

    /// Annotations anchored to `path`, ordered by start offset
    fn annotations(&self, path: &PropertyPath) -> Vec<Annotation>;

    fn get_annotation(&self, id: &AnnotationId) -> Option<&Annotation>;

    fn create_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId, EditError>;

    fn update_annotation(&mut self, id: &AnnotationId, edit: AnnotationEdit)
    -> Result<(), EditError>;

    fn delete_annotation(&mut self, id: &AnnotationId) -> Result<(), EditError>;

    fn container(&self, id: &ContainerId) -> Result<&Container, EditError>;

    /// Show a node in a container; returns the position it ended up at
    fn show(
        &mut self,
        container: &ContainerId,
        node: &NodeId,
        position: usize,
    ) -> Result<usize, EditError>;

    fn hide(&mut self, container: &ContainerId, node: &NodeId) -> Result<(), EditError>;

    fn selection(&self) -> &Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Type given to nodes created by breaking a text node at its end
    fn default_text_type(&self) -> &str {
        self.schema().default_text_type()
    }
}

/// Everything a document holds apart from its schema and version
#[derive(Clone, Debug, Default)]
pub(crate) struct DocumentState {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) annotations: BTreeMap<AnnotationId, Annotation>,
    pub(crate) containers: BTreeMap<ContainerId, Container>,
    pub(crate) selection: Selection,
}

impl DocumentState {
    pub(crate) fn rope(&self, path: &PropertyPath) -> Result<&Rope, EditError> {
        let node_id = path
            .node_id()
            .ok_or_else(|| EditError::InvalidPath(path.clone()))?;
        if path.len() != 2 || path.property() != Some(CONTENT_PROPERTY) {
            return Err(EditError::InvalidPath(path.clone()));
        }
        let node = self
            .nodes
            .get(&node_id)
            .ok_or_else(|| EditError::NodeNotFound(node_id.clone()))?;
        node.content().ok_or(EditError::NotATextNode(node_id))
    }

    pub(crate) fn annotations_on(&self, path: &PropertyPath) -> Vec<Annotation> {
        let mut found: Vec<Annotation> = self
            .annotations
            .values()
            .filter(|annotation| &annotation.path == path)
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.start, a.end, &a.id).cmp(&(b.start, b.end, &b.id)));
        found
    }

    /// Check an annotation fits the text it is anchored to
    pub(crate) fn validate_annotation(&self, annotation: &Annotation) -> Result<(), EditError> {
        let rope = self.rope(&annotation.path)?;
        if annotation.start > annotation.end {
            return Err(EditError::UnhandledAnnotationRelationship {
                annotation: annotation.id.clone(),
                start: annotation.start,
                end: annotation.end,
                edit_start: annotation.start,
                edit_end: annotation.start,
            });
        }
        check_offset(rope, &annotation.path, annotation.start)?;
        check_offset(rope, &annotation.path, annotation.end)
    }
}

fn check_offset(rope: &Rope, path: &PropertyPath, offset: usize) -> Result<(), EditError> {
    let len = rope.len();
    if offset > len {
        return Err(EditError::OffsetOutOfBounds {
            path: path.clone(),
            offset,
            len,
        });
    }
    if !rope.slice_to_cow(0..len).is_char_boundary(offset) {
        return Err(EditError::InvalidOffset {
            path: path.clone(),
            offset,
        });
    }
    Ok(())
}

/// Staged copy of a document's state plus the log of what changed.
///
/// Created by [`Document::transaction`](crate::document::Document::transaction).
pub struct DocumentTransaction<'a> {
    schema: &'a DocumentSchema,
    state: DocumentState,
    operations: Vec<Operation>,
}

impl<'a> DocumentTransaction<'a> {
    pub(crate) fn new(schema: &'a DocumentSchema, state: DocumentState) -> Self {
        Self {
            schema,
            state,
            operations: Vec::new(),
        }
    }

    /// Operations recorded so far
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn into_parts(self) -> (DocumentState, Vec<Operation>) {
        (self.state, self.operations)
    }

    fn annotation_mut(&mut self, id: &AnnotationId) -> Result<&mut Annotation, EditError> {
        self.state
            .annotations
            .get_mut(id)
            .ok_or_else(|| EditError::AnnotationNotFound(id.clone()))
    }

    fn container_mut(&mut self, id: &ContainerId) -> Result<&mut Container, EditError> {
        self.state
            .containers
            .get_mut(id)
            .ok_or_else(|| EditError::ContainerNotFound(id.clone()))
    }
}

impl Transaction for DocumentTransaction<'_> {
    fn schema(&self) -> &DocumentSchema {
        self.schema
    }

    fn get(&self, id: &NodeId) -> Option<&Node> {
        self.state.nodes.get(id)
    }

    fn real_path(&self, path: &PropertyPath) -> Result<PropertyPath, EditError> {
        let node_id = path
            .node_id()
            .ok_or_else(|| EditError::InvalidPath(path.clone()))?;
        let real = match path.len() {
            1 => PropertyPath::text(&node_id),
            2 if path.property() == Some(CONTENT_PROPERTY) => path.clone(),
            _ => return Err(EditError::InvalidPath(path.clone())),
        };
        self.state.rope(&real)?;
        Ok(real)
    }

    fn text_len(&self, path: &PropertyPath) -> Result<usize, EditError> {
        self.state.rope(path).map(Rope::len)
    }

    fn text(&self, path: &PropertyPath) -> Result<String, EditError> {
        self.state.rope(path).map(|rope| rope.to_string())
    }

    fn update_text(&mut self, path: &PropertyPath, edit: TextEdit) -> Result<(), EditError> {
        let rope = self.state.rope(path)?;
        let mut builder = Builder::new(rope.len());
        match &edit {
            TextEdit::Insert { at, text } => {
                check_offset(rope, path, *at)?;
                builder.replace(*at..*at, Rope::from(text));
            }
            TextEdit::Delete { start, end } => {
                check_offset(rope, path, *start)?;
                check_offset(rope, path, *end)?;
                if start > end {
                    return Err(EditError::InvalidOffset {
                        path: path.clone(),
                        offset: *start,
                    });
                }
                builder.delete(*start..*end);
            }
        }
        let updated = builder.build().apply(rope);

        let node_id = path
            .node_id()
            .ok_or_else(|| EditError::InvalidPath(path.clone()))?;
        if let Some(content) = self
            .state
            .nodes
            .get_mut(&node_id)
            .and_then(Node::content_mut)
        {
            *content = updated;
        }
        self.operations.push(Operation::UpdateText {
            path: path.clone(),
            edit,
        });
        Ok(())
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, EditError> {
        let node = Node::from(spec);
        if self.state.nodes.contains_key(&node.id) {
            return Err(EditError::NodeAlreadyExists(node.id));
        }
        let id = node.id.clone();
        self.state.nodes.insert(id.clone(), node);
        self.operations.push(Operation::CreateNode { id: id.clone() });
        Ok(id)
    }

    fn delete(&mut self, id: &NodeId) -> Result<(), EditError> {
        if self.state.nodes.remove(id).is_none() {
            return Err(EditError::NodeNotFound(id.clone()));
        }
        let anchored: Vec<AnnotationId> = self
            .state
            .annotations
            .values()
            .filter(|annotation| annotation.path.node_id().as_ref() == Some(id))
            .map(|annotation| annotation.id.clone())
            .collect();
        for annotation in anchored {
            self.delete_annotation(&annotation)?;
        }
        self.operations.push(Operation::DeleteNode { id: id.clone() });
        Ok(())
    }

    fn annotations(&self, path: &PropertyPath) -> Vec<Annotation> {
        self.state.annotations_on(path)
    }

    fn get_annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.state.annotations.get(id)
    }

    fn create_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId, EditError> {
        if self.state.annotations.contains_key(&annotation.id) {
            return Err(EditError::AnnotationAlreadyExists(annotation.id));
        }
        self.state.validate_annotation(&annotation)?;
        let id = annotation.id.clone();
        self.operations.push(Operation::CreateAnnotation {
            id: id.clone(),
            path: annotation.path.clone(),
            start: annotation.start,
            end: annotation.end,
        });
        self.state.annotations.insert(id.clone(), annotation);
        Ok(id)
    }

    fn update_annotation(
        &mut self,
        id: &AnnotationId,
        edit: AnnotationEdit,
    ) -> Result<(), EditError> {
        let mut updated = self.annotation_mut(id)?.clone();
        match edit {
            AnnotationEdit::Shift {
                start_delta,
                end_delta,
            } => {
                updated.start = shift(updated.start, start_delta, &updated)?;
                updated.end = shift(updated.end, end_delta, &updated)?;
            }
            AnnotationEdit::SetRange { start, end } => {
                updated.start = start;
                updated.end = end;
            }
            AnnotationEdit::MoveTo { path, start, end } => {
                updated.path = path;
                updated.start = start;
                updated.end = end;
            }
        }
        self.state.validate_annotation(&updated)?;

        self.operations.push(Operation::UpdateAnnotation {
            id: id.clone(),
            path: updated.path.clone(),
            start: updated.start,
            end: updated.end,
        });
        *self.annotation_mut(id)? = updated;
        Ok(())
    }

    fn delete_annotation(&mut self, id: &AnnotationId) -> Result<(), EditError> {
        self.state
            .annotations
            .remove(id)
            .ok_or_else(|| EditError::AnnotationNotFound(id.clone()))?;
        self.operations
            .push(Operation::DeleteAnnotation { id: id.clone() });
        Ok(())
    }

    fn container(&self, id: &ContainerId) -> Result<&Container, EditError> {
        self.state
            .containers
            .get(id)
            .ok_or_else(|| EditError::ContainerNotFound(id.clone()))
    }

    fn show(
        &mut self,
        container: &ContainerId,
        node: &NodeId,
        position: usize,
    ) -> Result<usize, EditError> {
        if !self.state.nodes.contains_key(node) {
            return Err(EditError::NodeNotFound(node.clone()));
        }
        let position = self.container_mut(container)?.show(node.clone(), position);
        self.operations.push(Operation::Show {
            container: container.clone(),
            node: node.clone(),
            position,
        });
        Ok(position)
    }

    fn hide(&mut self, container: &ContainerId, node: &NodeId) -> Result<(), EditError> {
        if !self.container_mut(container)?.hide(node) {
            return Err(EditError::NodeNotInContainer {
                node: node.clone(),
                container: container.clone(),
            });
        }
        self.operations.push(Operation::Hide {
            container: container.clone(),
            node: node.clone(),
        });
        Ok(())
    }

    fn selection(&self) -> &Selection {
        &self.state.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.state.selection = selection;
    }
}

fn shift(offset: usize, delta: isize, annotation: &Annotation) -> Result<usize, EditError> {
    offset
        .checked_add_signed(delta)
        .ok_or_else(|| EditError::InvalidOffset {
            path: annotation.path.clone(),
            offset,
        })
}
