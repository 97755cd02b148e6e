pub mod document;
pub mod editing;
pub mod error;
pub mod model;
pub mod search;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use document::{Document, DocumentData, Patch, Transaction};
pub use editing::{Cmd, MergeDirection, MergeOutcome};
pub use error::EditError;
pub use model::*;
pub use search::{FindReplace, Match, MatchSet, SearchError};
