use serde::{Deserialize, Serialize};

use crate::model::NodeId;

/// Name of the text property owned by every text node
pub const CONTENT_PROPERTY: &str = "content";

/// Ordered identifiers locating a property, e.g. `["p1", "content"]`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path of the text property of a node
    pub fn text(node_id: &NodeId) -> Self {
        Self(vec![node_id.to_string(), CONTENT_PROPERTY.to_string()])
    }

    /// The node this path points into (its first segment)
    pub fn node_id(&self) -> Option<NodeId> {
        self.0.first().map(|id| NodeId::new(id.as_str()))
    }

    /// The property name, if the path goes below node level
    pub fn property(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A position inside a text property
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub path: PropertyPath,
    pub offset: usize,
}

impl Coordinate {
    pub fn new(path: PropertyPath, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Start and end coordinates of a selection or match.
///
/// When both ends share a path, `start.offset <= end.offset` holds for
/// ranges produced by [`Selection::text_range`](crate::model::Selection::text_range).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl TextRange {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn is_single_property(&self) -> bool {
        self.start.path == self.end.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_path_addresses_content_property() {
        let path = PropertyPath::text(&NodeId::new("p1"));

        assert_eq!(path.segments(), ["p1", "content"]);
        assert_eq!(path.node_id(), Some(NodeId::new("p1")));
        assert_eq!(path.property(), Some(CONTENT_PROPERTY));
        assert_eq!(path.to_string(), "p1.content");
    }

    #[test]
    fn test_node_level_path_has_no_property() {
        let path = PropertyPath::new(["figure"]);

        assert_eq!(path.property(), None);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_range_collapse_and_single_property() {
        let path = PropertyPath::text(&NodeId::new("p1"));
        let collapsed = TextRange::new(Coordinate::new(path.clone(), 3), Coordinate::new(path.clone(), 3));
        let spanning = TextRange::new(
            Coordinate::new(path, 0),
            Coordinate::new(PropertyPath::text(&NodeId::new("p2")), 1),
        );

        assert!(collapsed.is_collapsed());
        assert!(collapsed.is_single_property());
        assert!(!spanning.is_collapsed());
        assert!(!spanning.is_single_property());
    }
}
