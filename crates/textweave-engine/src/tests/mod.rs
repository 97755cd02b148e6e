//! Shared fixtures for unit tests.

use std::ops::Range;

use crate::document::Document;
use crate::model::{Annotation, Container, ContainerId, Node, NodeId, PropertyPath, Selection};

pub fn p1() -> PropertyPath {
    PropertyPath::text(&NodeId::new("p1"))
}

pub fn body() -> ContainerId {
    ContainerId::new("body")
}

/// Caret on `p1` inside `body`
pub fn caret(offset: usize) -> Selection {
    Selection::caret(p1(), offset, Some(body()))
}

/// A `body` container showing one paragraph `p1` holding `text`, with a
/// `strong` annotation per `(id, range)`.
pub fn sample_document(text: &str, annotations: &[(&str, Range<usize>)]) -> Document {
    let mut doc = Document::default();
    doc.add_node(Node::text("p1", "paragraph", text)).unwrap();
    doc.add_container(Container::new("body").with_nodes(["p1"]))
        .unwrap();
    for (id, range) in annotations {
        doc.add_annotation(Annotation::new(*id, "strong", p1(), range.clone()))
            .unwrap();
    }
    doc
}

pub(crate) fn sample_state(text: &str) -> crate::document::transaction::DocumentState {
    let mut state = crate::document::transaction::DocumentState::default();
    state
        .nodes
        .insert(NodeId::new("p1"), Node::text("p1", "paragraph", text));
    state
        .containers
        .insert(body(), Container::new("body").with_nodes(["p1"]));
    state
}

/// `(id, range)` of every annotation on `path`, in document order
pub fn annotation_ranges(doc: &Document, path: &PropertyPath) -> Vec<(String, Range<usize>)> {
    doc.annotations(path)
        .into_iter()
        .map(|annotation| (annotation.id.to_string(), annotation.range()))
        .collect()
}

/// Text of every node shown in `body`
pub fn visible_text(doc: &Document) -> Vec<String> {
    doc.visible_text(&body())
        .into_iter()
        .map(|(_, text)| text)
        .collect()
}
