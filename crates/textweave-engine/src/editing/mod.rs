/*!
 * # Editing Core Module
 *
 * Text edits that keep range annotations consistent.
 *
 * ## Architecture Overview
 *
 * ### 1. Text lives in xi-rope buffers
 * - Every text node owns one **`xi_rope::Rope`** (`content`)
 * - Edits compile to **Deltas** through `xi_rope::delta::Builder`
 * - Offsets are UTF-8 byte offsets and must sit on char boundaries
 *
 * ### 2. One annotation algebra
 * - **`algebra`** classifies an annotation against an edit (cases I to VI)
 *   and returns a tagged `RangeOutcome`
 * - Insertions, type-overs and deletions share the classifier and differ
 *   only in their `BoundaryPolicy`
 * - An annotation that cannot be classified is an error, never a silent
 *   no-op
 *
 * ### 3. Operations run inside a transaction
 * - **`operations`**: `insert_text`, `delete_range`, `break_node`,
 *   `merge_nodes`
 * - Each one mutates text, annotations and containers through the
 *   `Transaction` trait and sets the resulting selection as its last step
 * - A failure anywhere drops the staged state
 *
 * ### 4. Command-Based Editing
 * - All edits can be expressed as **Commands** (`Cmd` enum), which is also
 *   the format of replay scripts
 *
 * ## Usage Pattern
 *
 * ```rust
 * use textweave_engine::document::Document;
 * use textweave_engine::editing::Cmd;
 * use textweave_engine::model::{
 *     Annotation, Container, Node, NodeId, PropertyPath, Selection,
 * };
 *
 * let mut doc = Document::default();
 * doc.add_node(Node::text("p1", "paragraph", "hello world")).unwrap();
 * doc.add_container(Container::new("body").with_nodes(["p1"])).unwrap();
 * let path = PropertyPath::text(&NodeId::new("p1"));
 * doc.add_annotation(Annotation::new("b1", "strong", path.clone(), 6..11)).unwrap();
 *
 * let patch = doc
 *     .apply(Cmd::InsertText {
 *         text: " there".to_string(),
 *         selection: Some(Selection::caret(path.clone(), 5, None)),
 *     })
 *     .unwrap();
 *
 * assert_eq!(doc.text(&path).unwrap(), "hello there world");
 * assert_eq!(doc.annotation(&"b1".into()).unwrap().range(), 12..17);
 * assert_eq!(patch.version, 1);
 * ```
 */

pub mod algebra;
pub mod commands;
pub mod operations;
pub mod transfer;

pub use algebra::{
    BoundaryPolicy, DELETION_BOUNDARY, EditKind, EditSpan, RangeOutcome, Relationship,
    TYPING_BOUNDARY, classify, react,
};
pub use commands::{Cmd, run_command};
pub use operations::{
    MergeDirection, MergeOutcome, break_node, delete_range, insert_text, merge_nodes,
};
pub use transfer::{rejoin_annotations, transfer_annotations};
