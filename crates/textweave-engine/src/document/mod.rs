use std::fmt::Write as _;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::editing::{Cmd, run_command};
use crate::error::EditError;
use crate::model::{
    Annotation, AnnotationId, Container, ContainerId, DocumentSchema, Node, NodeId, NodeSpec,
    PropertyPath, Selection,
};

pub mod patch;
pub mod transaction;

pub use patch::{Operation, Patch};
pub use transaction::{AnnotationEdit, DocumentTransaction, TextEdit, Transaction};

use transaction::DocumentState;

/// In-memory document: nodes, annotations, containers and the current
/// selection.
///
/// All edits go through [`Document::transaction`] (or [`Document::apply`],
/// which wraps one command in a transaction). A transaction works on a staged
/// copy of the state; it is committed only if the edit succeeds, so a failed
/// edit leaves the document and its version exactly as they were.
///
/// ## Usage Pattern
///
/// ```rust
/// # use textweave_engine::document::Document;
/// # use textweave_engine::editing::Cmd;
/// # use textweave_engine::model::{Container, Coordinate, Node, NodeId, PropertyPath};
/// let mut doc = Document::default();
/// doc.add_node(Node::text("p1", "paragraph", "abcdef")).unwrap();
/// doc.add_container(Container::new("body").with_nodes(["p1"])).unwrap();
/// let path = PropertyPath::text(&NodeId::new("p1"));
///
/// doc.apply(Cmd::DeleteRange {
///     start: Some(Coordinate::new(path.clone(), 2)),
///     end: Some(Coordinate::new(path.clone(), 5)),
///     container_id: None,
/// })
/// .unwrap();
///
/// assert_eq!(doc.text(&path).unwrap(), "abf");
/// # assert_eq!(doc.version(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Document {
    schema: DocumentSchema,
    state: DocumentState,
    /// Incremented by every committed transaction that changed content
    version: u64,
}

/// Serialized form of a document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub selection: Selection,
}

impl Document {
    pub fn new(schema: DocumentSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Build a document from its serialized form.
    ///
    /// Nodes listed without an id get a generated one; annotations are
    /// checked against the text they point into.
    pub fn from_data(schema: DocumentSchema, data: DocumentData) -> anyhow::Result<Self> {
        let mut doc = Self::new(schema);
        for spec in data.nodes {
            doc.add_node(Node::from(spec))?;
        }
        for annotation in data.annotations {
            doc.add_annotation(annotation)?;
        }
        for container in data.containers {
            doc.add_container(container)?;
        }
        doc.state.selection = data.selection;
        Ok(doc)
    }

    /// Parse a document from JSON bytes
    pub fn from_json(schema: DocumentSchema, bytes: &[u8]) -> anyhow::Result<Self> {
        let data: DocumentData = serde_json::from_slice(bytes)?;
        Self::from_data(schema, data)
    }

    pub fn to_data(&self) -> DocumentData {
        DocumentData {
            nodes: self.state.nodes.values().map(NodeSpec::from).collect(),
            annotations: self.state.annotations.values().cloned().collect(),
            containers: self.state.containers.values().cloned().collect(),
            selection: self.state.selection.clone(),
        }
    }

    pub fn schema(&self) -> &DocumentSchema {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: DocumentSchema) {
        self.schema = schema;
    }

    /// Run `edit` against a staged copy of the document and commit it when
    /// it succeeds.
    ///
    /// Returns the edit's own result together with the patch describing what
    /// was committed.
    pub fn transaction<F, R>(&mut self, edit: F) -> Result<(R, Patch), EditError>
    where
        F: FnOnce(&mut DocumentTransaction<'_>) -> Result<R, EditError>,
    {
        let mut tx = DocumentTransaction::new(&self.schema, self.state.clone());
        let value = match edit(&mut tx) {
            Ok(value) => value,
            Err(err) => {
                warn!("Rolling back transaction: {err}");
                return Err(err);
            }
        };

        let (state, operations) = tx.into_parts();
        self.state = state;
        if !operations.is_empty() {
            self.version += 1;
        }
        debug!(
            "Committed {} operations, document version {}",
            operations.len(),
            self.version
        );
        Ok((
            value,
            Patch {
                operations,
                new_selection: self.state.selection.clone(),
                version: self.version,
            },
        ))
    }

    /// Apply a command in its own transaction
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        self.transaction(|tx| run_command(tx, &cmd))
            .map(|((), patch)| patch)
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), EditError> {
        if self.state.nodes.contains_key(&node.id) {
            return Err(EditError::NodeAlreadyExists(node.id));
        }
        self.state.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<(), EditError> {
        if self.state.annotations.contains_key(&annotation.id) {
            return Err(EditError::AnnotationAlreadyExists(annotation.id));
        }
        self.state.validate_annotation(&annotation)?;
        self.state
            .annotations
            .insert(annotation.id.clone(), annotation);
        Ok(())
    }

    pub fn add_container(&mut self, container: Container) -> Result<(), EditError> {
        if let Some(missing) = container
            .nodes()
            .iter()
            .find(|id| !self.state.nodes.contains_key(*id))
        {
            return Err(EditError::NodeNotFound(missing.clone()));
        }
        self.state.containers.insert(container.id.clone(), container);
        Ok(())
    }

    /// Show an existing node in a container outside of any edit
    pub fn show(
        &mut self,
        container_id: &ContainerId,
        node_id: &NodeId,
        position: usize,
    ) -> Result<usize, EditError> {
        if !self.state.nodes.contains_key(node_id) {
            return Err(EditError::NodeNotFound(node_id.clone()));
        }
        let container = self
            .state
            .containers
            .get_mut(container_id)
            .ok_or_else(|| EditError::ContainerNotFound(container_id.clone()))?;
        Ok(container.show(node_id.clone(), position))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.state.nodes.get(id)
    }

    pub fn annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.state.annotations.get(id)
    }

    /// Annotations on `path`, ordered by start offset
    pub fn annotations(&self, path: &PropertyPath) -> Vec<Annotation> {
        self.state.annotations_on(path)
    }

    pub fn container(&self, id: &ContainerId) -> Option<&Container> {
        self.state.containers.get(id)
    }

    /// All containers, ordered by id
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.state.containers.values()
    }

    pub fn text(&self, path: &PropertyPath) -> Result<String, EditError> {
        self.state.rope(path).map(|rope| rope.to_string())
    }

    /// Get the current selection
    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    /// Set the selection
    pub fn set_selection(&mut self, selection: Selection) {
        self.state.selection = selection;
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Text nodes of a container in display order, with their paths
    pub fn visible_text(&self, container_id: &ContainerId) -> Vec<(PropertyPath, String)> {
        let Some(container) = self.container(container_id) else {
            return Vec::new();
        };
        container
            .nodes()
            .iter()
            .filter_map(|id| self.node(id))
            .filter_map(|node| Some((node.text_path(), node.text_content()?)))
            .collect()
    }

    /// Plain-text rendering of a container: one line per node, annotations
    /// listed underneath the text they cover.
    pub fn render(&self, container_id: &ContainerId) -> String {
        let mut out = String::new();
        let Some(container) = self.container(container_id) else {
            return out;
        };
        for node in container.nodes().iter().filter_map(|id| self.node(id)) {
            match node.text_content() {
                Some(text) => {
                    let _ = writeln!(out, "{} [{}] {text:?}", node.id, node.node_type);
                    for annotation in self.annotations(&node.text_path()) {
                        let covered = text.get(annotation.range()).unwrap_or_default();
                        let _ = writeln!(
                            out,
                            "  {} {} [{}, {}) {covered:?}",
                            annotation.annotation_type,
                            annotation.id,
                            annotation.start,
                            annotation.end
                        );
                    }
                }
                None => {
                    let _ = writeln!(out, "{} [{}]", node.id, node.node_type);
                }
            }
        }
        out
    }
}
