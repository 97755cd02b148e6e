use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::PropertyPath;

string_id!(
    /// Unique identifier of an annotation
    AnnotationId
);

/// A typed range `[start, end)` over one text property: a bold span, a link,
/// an inline node anchor.
///
/// Annotations may overlap each other freely. The engine keeps
/// `start <= end <= len(path)` true across every edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub path: PropertyPath,
    pub start: usize,
    pub end: usize,
    /// Whether a node split inside this annotation copies it onto the new node
    #[serde(default = "default_splittable")]
    pub splittable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

fn default_splittable() -> bool {
    true
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        annotation_type: impl Into<String>,
        path: PropertyPath,
        range: Range<usize>,
    ) -> Self {
        Self {
            id: id.into(),
            annotation_type: annotation_type.into(),
            path,
            start: range.start,
            end: range.end,
            splittable: true,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_splittable(mut self, splittable: bool) -> Self {
        self.splittable = splittable;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
