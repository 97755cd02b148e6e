//! Document model: nodes, text properties, annotations, containers and
//! selections.
//!
//! Every type here is plain data. Mutation happens through a
//! [`Transaction`](crate::document::Transaction), never by touching these
//! values directly from the edit operations.

/// Declares a string-backed identifier newtype with the usual conversions.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh identifier, e.g. `paragraph-1b4e28ba...`
            pub fn generate(prefix: &str) -> Self {
                Self(format!("{prefix}-{}", uuid::Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

pub mod annotation;
pub mod container;
pub mod node;
pub mod path;
pub mod schema;
pub mod selection;

pub use annotation::{Annotation, AnnotationId};
pub use container::{Container, ContainerId};
pub use node::{Node, NodeId, NodeSpec};
pub use path::{CONTENT_PROPERTY, Coordinate, PropertyPath, TextRange};
pub use schema::DocumentSchema;
pub use selection::{
    ContainerSelection, NodeSelection, NodeSelectionMode, PropertySelection, Selection,
};
