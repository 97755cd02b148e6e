use std::collections::BTreeSet;

/// Node type used when no schema configures one
pub const DEFAULT_TEXT_TYPE: &str = "text";

/// The parts of a document schema the editing engine consults
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSchema {
    pub name: String,
    pub version: String,
    default_text_type: String,
    unsplittable_annotation_types: BTreeSet<String>,
}

impl DocumentSchema {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            default_text_type: DEFAULT_TEXT_TYPE.to_string(),
            unsplittable_annotation_types: BTreeSet::new(),
        }
    }

    pub fn with_default_text_type(mut self, node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        // empty keeps the fallback
        if !node_type.is_empty() {
            self.default_text_type = node_type;
        }
        self
    }

    pub fn with_unsplittable_annotation_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unsplittable_annotation_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Type of the node created when breaking a text node at its end
    pub fn default_text_type(&self) -> &str {
        &self.default_text_type
    }

    pub fn is_splittable(&self, annotation_type: &str) -> bool {
        !self.unsplittable_annotation_types.contains(annotation_type)
    }
}

impl Default for DocumentSchema {
    fn default() -> Self {
        Self::new("textweave", "1.0")
    }
}
