use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::document::{AnnotationEdit, TextEdit, Transaction};
use crate::editing::algebra::{EditSpan, RangeOutcome, react};
use crate::editing::transfer::{rejoin_annotations, transfer_annotations};
use crate::error::EditError;
use crate::model::{
    ContainerId, Coordinate, NodeId, NodeSelectionMode, NodeSpec, PropertyPath,
    PropertySelection, Selection,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDirection {
    /// Merge with the previous node (backspace at the start)
    Left,
    /// Merge with the next node (delete at the end)
    Right,
}

/// What a merge ended up doing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No neighbour in the requested direction; nothing changed
    NoNeighbour,
    /// `removed`'s text and annotations were appended to `into`
    Joined { into: NodeId, removed: NodeId },
    /// An empty text node was removed
    RemovedEmpty(NodeId),
    /// A populated text node sits next to a non-text node; only the
    /// selection moved onto the non-text node
    NodeSelected(NodeId),
}

/// Insert `text` at the selection, typing over it when it is not collapsed.
///
/// The caret ends up right after the inserted text.
pub fn insert_text<T: Transaction + ?Sized>(
    tx: &mut T,
    selection: &Selection,
    text: &str,
) -> Result<(), EditError> {
    let range = selection.text_range().ok_or(EditError::InvalidSelection)?;
    if !range.is_single_property() {
        return Err(EditError::InvalidSelection);
    }
    let path = tx.real_path(&range.start.path)?;
    let (start, end) = (range.start.offset, range.end.offset);
    let current = tx.text(&path)?;
    check_offset(&path, &current, start)?;
    check_offset(&path, &current, end)?;
    debug!("Inserting {} bytes into {path} at [{start}, {end})", text.len());

    let edit = if range.is_collapsed() {
        EditSpan::insertion(start, text.len())
    } else {
        tx.update_text(&path, TextEdit::Delete { start, end })?;
        EditSpan::type_over(start..end, text.len())
    };
    if !text.is_empty() {
        tx.update_text(
            &path,
            TextEdit::Insert {
                at: start,
                text: text.to_string(),
            },
        )?;
    }
    update_annotations(tx, &path, &edit)?;

    let caret = PropertySelection::collapsed(path, start + text.len())
        .with_container(selection.container_id().cloned())
        .with_surface(selection.surface_id().map(str::to_string));
    tx.set_selection(Selection::Property(caret));
    Ok(())
}

/// Delete `[start, end)` from a single text property.
///
/// A missing `start` means offset 0 and a missing `end` means the end of the
/// text, both on the path of the coordinate that is given.
pub fn delete_range<T: Transaction + ?Sized>(
    tx: &mut T,
    start: Option<&Coordinate>,
    end: Option<&Coordinate>,
    container_id: Option<&ContainerId>,
) -> Result<(), EditError> {
    let logical_path = start
        .or(end)
        .map(|coordinate| &coordinate.path)
        .ok_or(EditError::InvalidSelection)?;
    let path = tx.real_path(logical_path)?;
    if let (Some(start), Some(end)) = (start, end) {
        if tx.real_path(&start.path)? != tx.real_path(&end.path)? {
            return Err(EditError::InvalidSelection);
        }
    }

    let start = start.map_or(0, |coordinate| coordinate.offset);
    let end = match end {
        Some(coordinate) => coordinate.offset,
        None => tx.text_len(&path)?,
    };
    let current = tx.text(&path)?;
    check_offset(&path, &current, start)?;
    check_offset(&path, &current, end)?;
    if start > end {
        return Err(EditError::InvalidSelection);
    }
    debug!("Deleting [{start}, {end}) from {path}");

    if start < end {
        tx.update_text(&path, TextEdit::Delete { start, end })?;
        update_annotations(tx, &path, &EditSpan::deletion(start..end))?;
    }

    tx.set_selection(Selection::caret(path, start, container_id.cloned()));
    Ok(())
}

/// Split a text node in two at `coordinate`; returns the id of the created
/// node.
pub fn break_node<T: Transaction + ?Sized>(
    tx: &mut T,
    node_id: &NodeId,
    coordinate: &Coordinate,
    container_id: &ContainerId,
) -> Result<NodeId, EditError> {
    let node = tx
        .get(node_id)
        .ok_or_else(|| EditError::NodeNotFound(node_id.clone()))?;
    if !node.is_text() {
        return Err(EditError::NotATextNode(node_id.clone()));
    }
    let mut spec = node.to_spec();
    let path = node.text_path();
    if tx.real_path(&coordinate.path)? != path {
        return Err(EditError::InvalidSelection);
    }
    let text = tx.text(&path)?;
    let offset = coordinate.offset;
    check_offset(&path, &text, offset)?;

    let position = tx
        .container(container_id)?
        .position(node_id)
        .ok_or_else(|| EditError::NodeNotInContainer {
            node: node_id.clone(),
            container: container_id.clone(),
        })?;
    debug!("Breaking {node_id} at {offset}");

    if offset == 0 {
        let new_id = tx.create(NodeSpec::text(spec.node_type, ""))?;
        tx.show(container_id, &new_id, position)?;
        tx.set_selection(Selection::caret(path, 0, Some(container_id.clone())));
        return Ok(new_id);
    }

    spec.content = Some(text[offset..].to_string());
    if offset == text.len() {
        spec.node_type = tx.default_text_type().to_string();
    }
    let new_id = tx.create(spec)?;
    let new_path = PropertyPath::text(&new_id);
    if offset < text.len() {
        transfer_annotations(tx, &path, offset, &new_path, 0)?;
        tx.update_text(
            &path,
            TextEdit::Delete {
                start: offset,
                end: text.len(),
            },
        )?;
    }
    tx.show(container_id, &new_id, position + 1)?;
    tx.set_selection(Selection::caret(new_path, 0, Some(container_id.clone())));
    Ok(new_id)
}

/// Merge `node_id` with its neighbour in `direction`.
///
/// `previous` and `next` are the nodes around `node_id` in the container.
pub fn merge_nodes<T: Transaction + ?Sized>(
    tx: &mut T,
    node_id: &NodeId,
    coordinate: &Coordinate,
    container_id: &ContainerId,
    direction: MergeDirection,
    previous: Option<&NodeId>,
    next: Option<&NodeId>,
) -> Result<MergeOutcome, EditError> {
    let (first, second) = match direction {
        MergeDirection::Left => match previous {
            Some(previous) => (previous.clone(), node_id.clone()),
            None => return Ok(MergeOutcome::NoNeighbour),
        },
        MergeDirection::Right => match next {
            Some(next) => (node_id.clone(), next.clone()),
            None => return Ok(MergeOutcome::NoNeighbour),
        },
    };
    debug!(
        "Merging {first} with {second} ({direction:?} from {})",
        coordinate.path
    );

    let first_node = tx
        .get(&first)
        .ok_or_else(|| EditError::NodeNotFound(first.clone()))?;
    let second_node = tx
        .get(&second)
        .ok_or_else(|| EditError::NodeNotFound(second.clone()))?;
    let (first_is_text, first_is_empty) = (first_node.is_text(), first_node.is_empty());
    let (second_is_text, second_is_empty) = (second_node.is_text(), second_node.is_empty());
    let container = Some(container_id.clone());

    match (first_is_text, second_is_text) {
        (false, true) => {
            if second_is_empty {
                remove_node(tx, container_id, &second)?;
                tx.set_selection(Selection::node(first, NodeSelectionMode::After, container));
                Ok(MergeOutcome::RemovedEmpty(second))
            } else {
                tx.set_selection(Selection::node(
                    first.clone(),
                    NodeSelectionMode::Full,
                    container,
                ));
                Ok(MergeOutcome::NodeSelected(first))
            }
        }
        (true, false) => {
            if first_is_empty {
                remove_node(tx, container_id, &first)?;
                tx.set_selection(Selection::node(second, NodeSelectionMode::Before, container));
                Ok(MergeOutcome::RemovedEmpty(first))
            } else {
                tx.set_selection(Selection::node(
                    second.clone(),
                    NodeSelectionMode::Full,
                    container,
                ));
                Ok(MergeOutcome::NodeSelected(second))
            }
        }
        (true, true) => {
            let first_path = PropertyPath::text(&first);
            let second_path = PropertyPath::text(&second);
            if first_is_empty {
                remove_node(tx, container_id, &first)?;
                tx.set_selection(Selection::caret(second_path, 0, container));
                return Ok(MergeOutcome::RemovedEmpty(first));
            }

            let first_len = tx.text_len(&first_path)?;
            let appended = tx.text(&second_path)?;
            if !appended.is_empty() {
                tx.update_text(
                    &first_path,
                    TextEdit::Insert {
                        at: first_len,
                        text: appended,
                    },
                )?;
            }
            transfer_annotations(tx, &second_path, 0, &first_path, first_len)?;
            rejoin_annotations(tx, &first_path, first_len)?;
            remove_node(tx, container_id, &second)?;
            tx.set_selection(Selection::caret(first_path, first_len, container));
            Ok(MergeOutcome::Joined {
                into: first,
                removed: second,
            })
        }
        (false, false) => {
            warn!("Refusing to merge {first} with {second}: neither is a text node");
            Err(EditError::UnsupportedMerge { first, second })
        }
    }
}

fn remove_node<T: Transaction + ?Sized>(
    tx: &mut T,
    container_id: &ContainerId,
    node_id: &NodeId,
) -> Result<(), EditError> {
    tx.hide(container_id, node_id)?;
    tx.delete(node_id)
}

fn check_offset(path: &PropertyPath, text: &str, offset: usize) -> Result<(), EditError> {
    if offset > text.len() {
        return Err(EditError::OffsetOutOfBounds {
            path: path.clone(),
            offset,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(EditError::InvalidOffset {
            path: path.clone(),
            offset,
        });
    }
    Ok(())
}

/// Bring every annotation on `path` in line with an edit that has already
/// been applied to the text.
fn update_annotations<T: Transaction + ?Sized>(
    tx: &mut T,
    path: &PropertyPath,
    edit: &EditSpan,
) -> Result<(), EditError> {
    for annotation in tx.annotations(path) {
        let range = annotation.range();
        let outcome =
            react(&range, edit).ok_or_else(|| EditError::UnhandledAnnotationRelationship {
                annotation: annotation.id.clone(),
                start: annotation.start,
                end: annotation.end,
                edit_start: edit.start,
                edit_end: edit.end,
            })?;
        if outcome != RangeOutcome::Unchanged {
            debug!("Annotation {} {range:?}: {outcome:?}", annotation.id);
        }

        match outcome {
            RangeOutcome::Unchanged => {}
            RangeOutcome::Delete => tx.delete_annotation(&annotation.id)?,
            RangeOutcome::Shift {
                start_delta,
                end_delta,
            } => tx.update_annotation(
                &annotation.id,
                AnnotationEdit::Shift {
                    start_delta,
                    end_delta,
                },
            )?,
            RangeOutcome::MoveStart { .. } | RangeOutcome::ExpandEnd { .. } => {
                if let Some(moved) = outcome.apply(&range) {
                    tx.update_annotation(
                        &annotation.id,
                        AnnotationEdit::SetRange {
                            start: moved.start,
                            end: moved.end,
                        },
                    )?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, Node};
    use crate::tests::{annotation_ranges, body, caret, p1, sample_document, visible_text};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_insert_shifts_annotation_after_caret() {
        let mut doc = sample_document("hello world", &[("bold", 6..11)]);

        doc.transaction(|tx| insert_text(tx, &caret(5), " there"))
            .unwrap();

        assert_eq!(doc.text(&p1()).unwrap(), "hello there world");
        assert_eq!(
            annotation_ranges(&doc, &p1()),
            vec![("bold".to_string(), 12..17)]
        );
        assert_eq!(doc.selection(), &Selection::caret(p1(), 11, Some(body())));
    }

    #[rstest]
    #[case::at_start(0, "xyhello")]
    #[case::in_middle(2, "hexyllo")]
    #[case::at_end(5, "helloxy")]
    fn test_insert_keeps_surrounding_text(#[case] offset: usize, #[case] expected: &str) {
        let mut doc = sample_document("hello", &[]);

        doc.transaction(|tx| insert_text(tx, &caret(offset), "xy"))
            .unwrap();

        let text = doc.text(&p1()).unwrap();
        assert_eq!(text.len(), "hello".len() + 2);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_type_over_replaces_selected_text() {
        let mut doc = sample_document("hello world", &[("word", 6..11), ("lead", 0..5)]);
        let selection = Selection::Property(
            PropertySelection::range(p1(), 6, 11).with_surface(Some("main".to_string())),
        );

        doc.transaction(|tx| insert_text(tx, &selection, "there"))
            .unwrap();

        assert_eq!(doc.text(&p1()).unwrap(), "hello there");
        assert_eq!(
            annotation_ranges(&doc, &p1()),
            vec![("lead".to_string(), 0..5), ("word".to_string(), 6..11)]
        );
        assert_eq!(doc.selection().surface_id(), Some("main"));
    }

    #[test]
    fn test_insert_rejects_selection_across_properties() {
        let mut doc = sample_document("hello", &[]);
        let selection = Selection::Container(crate::model::ContainerSelection {
            start: Coordinate::new(p1(), 1),
            end: Coordinate::new(PropertyPath::text(&NodeId::new("p2")), 0),
            container_id: body(),
            surface_id: None,
        });

        let err = doc
            .transaction(|tx| insert_text(tx, &selection, "x"))
            .unwrap_err();

        assert_eq!(err, EditError::InvalidSelection);
        assert_eq!(
            doc.transaction(|tx| insert_text(tx, &Selection::None, "x"))
                .unwrap_err(),
            EditError::InvalidSelection
        );
    }

    #[test]
    fn test_delete_range_trims_overlapping_annotation() {
        let mut doc = sample_document("abcdef", &[("a", 1..4)]);

        doc.transaction(|tx| {
            delete_range(
                tx,
                Some(&Coordinate::new(p1(), 2)),
                Some(&Coordinate::new(p1(), 5)),
                Some(&body()),
            )
        })
        .unwrap();

        assert_eq!(doc.text(&p1()).unwrap(), "abf");
        assert_eq!(annotation_ranges(&doc, &p1()), vec![("a".to_string(), 1..2)]);
        assert_eq!(doc.selection(), &Selection::caret(p1(), 2, Some(body())));
    }

    #[test]
    fn test_delete_range_removes_subsumed_annotation() {
        let mut doc = sample_document("abcdefgh", &[("inner", 3..5), ("outer", 0..8)]);

        doc.transaction(|tx| {
            delete_range(
                tx,
                Some(&Coordinate::new(p1(), 2)),
                Some(&Coordinate::new(p1(), 6)),
                None,
            )
        })
        .unwrap();

        assert_eq!(annotation_ranges(&doc, &p1()), vec![("outer".to_string(), 0..4)]);
    }

    #[test]
    fn test_empty_delete_changes_nothing() {
        let mut doc = sample_document("abcdef", &[("a", 1..4), ("b", 3..3)]);

        let patch = doc
            .transaction(|tx| {
                delete_range(
                    tx,
                    Some(&Coordinate::new(p1(), 3)),
                    Some(&Coordinate::new(p1(), 3)),
                    None,
                )
            })
            .unwrap()
            .1;

        assert!(patch.is_empty());
        assert_eq!(doc.text(&p1()).unwrap(), "abcdef");
        assert_eq!(
            annotation_ranges(&doc, &p1()),
            vec![("a".to_string(), 1..4), ("b".to_string(), 3..3)]
        );
    }

    #[test]
    fn test_empty_delete_past_end_is_rejected() {
        let mut doc = sample_document("abc", &[]);
        doc.set_selection(caret(1));

        let err = doc
            .transaction(|tx| {
                delete_range(
                    tx,
                    Some(&Coordinate::new(p1(), 99)),
                    Some(&Coordinate::new(p1(), 99)),
                    Some(&body()),
                )
            })
            .unwrap_err();

        assert_eq!(
            err,
            EditError::OffsetOutOfBounds {
                path: p1(),
                offset: 99,
                len: 3
            }
        );
        assert_eq!(doc.selection(), &caret(1));
    }

    #[test]
    fn test_inserting_nothing_still_checks_the_caret() {
        let mut doc = sample_document("naïve", &[]);

        let past_end = doc
            .transaction(|tx| insert_text(tx, &caret(42), ""))
            .unwrap_err();
        let inside_char = doc
            .transaction(|tx| insert_text(tx, &caret(3), ""))
            .unwrap_err();

        assert_eq!(
            past_end,
            EditError::OffsetOutOfBounds {
                path: p1(),
                offset: 42,
                len: 6
            }
        );
        assert_eq!(
            inside_char,
            EditError::InvalidOffset {
                path: p1(),
                offset: 3
            }
        );
        assert_eq!(doc.selection(), &Selection::None);
    }

    #[test]
    fn test_delete_range_defaults_to_whole_text() {
        let mut doc = sample_document("abcdef", &[]);

        doc.transaction(|tx| delete_range(tx, Some(&Coordinate::new(p1(), 4)), None, None))
            .unwrap();
        assert_eq!(doc.text(&p1()).unwrap(), "abcd");

        doc.transaction(|tx| delete_range(tx, None, Some(&Coordinate::new(p1(), 2)), None))
            .unwrap();
        assert_eq!(doc.text(&p1()).unwrap(), "cd");
    }

    #[test]
    fn test_delete_range_on_structural_node_fails() {
        let mut doc = sample_document("abc", &[]);
        doc.add_node(Node::structural("fig", "figure")).unwrap();

        let err = doc
            .transaction(|tx| {
                delete_range(
                    tx,
                    Some(&Coordinate::new(PropertyPath::new(["fig"]), 0)),
                    None,
                    None,
                )
            })
            .unwrap_err();

        assert_eq!(err, EditError::NotATextNode(NodeId::new("fig")));
    }

    #[test]
    fn test_break_in_middle_moves_tail_and_annotations() {
        let mut doc = sample_document("hello world", &[("h", 0..5), ("w", 6..11)]);

        let (new_id, _) = doc
            .transaction(|tx| break_node(tx, &NodeId::new("p1"), &Coordinate::new(p1(), 5), &body()))
            .unwrap();
        let new_path = PropertyPath::text(&new_id);

        assert_eq!(visible_text(&doc), vec!["hello", " world"]);
        assert_eq!(doc.node(&new_id).unwrap().node_type, "paragraph");
        assert_eq!(annotation_ranges(&doc, &p1()), vec![("h".to_string(), 0..5)]);
        assert_eq!(annotation_ranges(&doc, &new_path), vec![("w".to_string(), 1..6)]);
        assert_eq!(doc.selection(), &Selection::caret(new_path, 0, Some(body())));
    }

    #[test]
    fn test_break_at_start_inserts_empty_node_before() {
        let mut doc = sample_document("hello", &[("h", 0..5)]);

        let (new_id, _) = doc
            .transaction(|tx| break_node(tx, &NodeId::new("p1"), &Coordinate::new(p1(), 0), &body()))
            .unwrap();

        assert_eq!(visible_text(&doc), vec!["", "hello"]);
        assert_eq!(doc.node(&new_id).unwrap().node_type, "paragraph");
        assert_eq!(annotation_ranges(&doc, &p1()), vec![("h".to_string(), 0..5)]);
        assert_eq!(doc.selection(), &Selection::caret(p1(), 0, Some(body())));
    }

    #[test]
    fn test_break_at_end_uses_default_text_type() {
        let mut doc = sample_document("hello", &[("h", 0..5)]);
        doc.add_node(Node::text("h1", "heading", "Title").with_property("level", "2"))
            .unwrap();
        doc.show(&body(), &NodeId::new("h1"), 0).unwrap();

        let (new_id, _) = doc
            .transaction(|tx| {
                break_node(
                    tx,
                    &NodeId::new("h1"),
                    &Coordinate::new(PropertyPath::text(&NodeId::new("h1")), 5),
                    &body(),
                )
            })
            .unwrap();

        let created = doc.node(&new_id).unwrap();
        assert_eq!(created.node_type, "text");
        assert!(created.is_empty());
        assert_eq!(created.properties.get("level").map(String::as_str), Some("2"));
        assert_eq!(visible_text(&doc), vec!["Title", "", "hello"]);
    }

    #[test]
    fn test_break_splits_straddling_annotation() {
        let mut doc = sample_document("abcdef", &[("span", 1..5)]);

        let (new_id, _) = doc
            .transaction(|tx| break_node(tx, &NodeId::new("p1"), &Coordinate::new(p1(), 3), &body()))
            .unwrap();

        assert_eq!(annotation_ranges(&doc, &p1()), vec![("span".to_string(), 1..3)]);
        let copies = annotation_ranges(&doc, &PropertyPath::text(&new_id));
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].1, 0..2);
    }

    #[test]
    fn test_break_rejects_offset_past_end() {
        let mut doc = sample_document("abc", &[]);

        let err = doc
            .transaction(|tx| break_node(tx, &NodeId::new("p1"), &Coordinate::new(p1(), 9), &body()))
            .unwrap_err();

        assert_eq!(
            err,
            EditError::OffsetOutOfBounds {
                path: p1(),
                offset: 9,
                len: 3
            }
        );
        assert_eq!(visible_text(&doc), vec!["abc"]);
    }

    #[test]
    fn test_break_rejects_coordinate_on_another_node() {
        let mut doc = sample_document("abc", &[]);
        doc.add_node(Node::text("p2", "paragraph", "xyz")).unwrap();

        let err = doc
            .transaction(|tx| {
                break_node(
                    tx,
                    &NodeId::new("p1"),
                    &Coordinate::new(PropertyPath::text(&NodeId::new("p2")), 1),
                    &body(),
                )
            })
            .unwrap_err();

        assert_eq!(err, EditError::InvalidSelection);
        assert_eq!(visible_text(&doc), vec!["abc"]);
    }

    #[test]
    fn test_merge_rejoins_annotation_split_by_break() {
        let mut doc = sample_document("abcdef", &[("span", 1..5)]);

        doc.transaction(|tx| {
            break_node(tx, &NodeId::new("p1"), &Coordinate::new(p1(), 3), &body())?;
            let next = tx.container(&body())?.nodes()[1].clone();
            merge_nodes(
                tx,
                &NodeId::new("p1"),
                &Coordinate::new(p1(), 3),
                &body(),
                MergeDirection::Right,
                None,
                Some(&next),
            )
        })
        .unwrap();

        assert_eq!(doc.text(&p1()).unwrap(), "abcdef");
        assert_eq!(annotation_ranges(&doc, &p1()), vec![("span".to_string(), 1..5)]);
    }

    fn two_paragraphs(first: &str, second: &str) -> crate::document::Document {
        let mut doc = sample_document(first, &[]);
        doc.add_node(Node::text("p2", "paragraph", second)).unwrap();
        doc.show(&body(), &NodeId::new("p2"), 1).unwrap();
        doc
    }

    #[test]
    fn test_merge_right_joins_text_and_annotations() {
        let mut doc = two_paragraphs("hello", " world");
        doc.add_annotation(Annotation::new(
            "w",
            "strong",
            PropertyPath::text(&NodeId::new("p2")),
            1..6,
        ))
        .unwrap();

        let (outcome, _) = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &NodeId::new("p1"),
                    &Coordinate::new(p1(), 5),
                    &body(),
                    MergeDirection::Right,
                    None,
                    Some(&NodeId::new("p2")),
                )
            })
            .unwrap();

        assert_eq!(
            outcome,
            MergeOutcome::Joined {
                into: NodeId::new("p1"),
                removed: NodeId::new("p2")
            }
        );
        assert_eq!(visible_text(&doc), vec!["hello world"]);
        assert!(doc.node(&NodeId::new("p2")).is_none());
        assert_eq!(annotation_ranges(&doc, &p1()), vec![("w".to_string(), 6..11)]);
        assert_eq!(doc.selection(), &Selection::caret(p1(), 5, Some(body())));
    }

    #[test]
    fn test_merge_left_removes_empty_first_node() {
        let mut doc = two_paragraphs("", "world");
        let p2 = NodeId::new("p2");

        let (outcome, _) = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &p2,
                    &Coordinate::new(PropertyPath::text(&p2), 0),
                    &body(),
                    MergeDirection::Left,
                    Some(&NodeId::new("p1")),
                    None,
                )
            })
            .unwrap();

        assert_eq!(outcome, MergeOutcome::RemovedEmpty(NodeId::new("p1")));
        assert_eq!(visible_text(&doc), vec!["world"]);
        assert_eq!(
            doc.selection(),
            &Selection::caret(PropertyPath::text(&p2), 0, Some(body()))
        );
    }

    #[test]
    fn test_merge_without_neighbour_is_a_no_op() {
        let mut doc = sample_document("hello", &[]);

        let (outcome, patch) = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &NodeId::new("p1"),
                    &Coordinate::new(p1(), 0),
                    &body(),
                    MergeDirection::Left,
                    None,
                    None,
                )
            })
            .unwrap();

        assert_eq!(outcome, MergeOutcome::NoNeighbour);
        assert!(patch.is_empty());
        assert_eq!(doc.version(), 0);
    }

    fn figure_then_paragraph(text: &str) -> crate::document::Document {
        let mut doc = sample_document(text, &[]);
        doc.add_node(Node::structural("fig", "figure")).unwrap();
        doc.show(&body(), &NodeId::new("fig"), 0).unwrap();
        doc
    }

    #[test]
    fn test_merge_empty_paragraph_into_figure_selects_after_figure() {
        let mut doc = figure_then_paragraph("");

        let (outcome, _) = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &NodeId::new("p1"),
                    &Coordinate::new(p1(), 0),
                    &body(),
                    MergeDirection::Left,
                    Some(&NodeId::new("fig")),
                    None,
                )
            })
            .unwrap();

        assert_eq!(outcome, MergeOutcome::RemovedEmpty(NodeId::new("p1")));
        assert!(doc.node(&NodeId::new("p1")).is_none());
        assert_eq!(
            doc.selection(),
            &Selection::node(NodeId::new("fig"), NodeSelectionMode::After, Some(body()))
        );
    }

    #[test]
    fn test_merge_populated_paragraph_into_figure_only_selects_it() {
        let mut doc = figure_then_paragraph("caption");

        let (outcome, patch) = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &NodeId::new("p1"),
                    &Coordinate::new(p1(), 0),
                    &body(),
                    MergeDirection::Left,
                    Some(&NodeId::new("fig")),
                    None,
                )
            })
            .unwrap();

        assert_eq!(outcome, MergeOutcome::NodeSelected(NodeId::new("fig")));
        assert!(patch.is_empty());
        assert_eq!(
            doc.selection(),
            &Selection::node(NodeId::new("fig"), NodeSelectionMode::Full, Some(body()))
        );
    }

    #[test]
    fn test_merge_empty_paragraph_before_figure_selects_before_it() {
        let mut doc = sample_document("", &[]);
        doc.add_node(Node::structural("fig", "figure")).unwrap();
        doc.show(&body(), &NodeId::new("fig"), 1).unwrap();

        doc.transaction(|tx| {
            merge_nodes(
                tx,
                &NodeId::new("p1"),
                &Coordinate::new(p1(), 0),
                &body(),
                MergeDirection::Right,
                None,
                Some(&NodeId::new("fig")),
            )
        })
        .unwrap();

        assert_eq!(
            doc.selection(),
            &Selection::node(NodeId::new("fig"), NodeSelectionMode::Before, Some(body()))
        );
    }

    #[test]
    fn test_merge_two_structural_nodes_is_unsupported() {
        let mut doc = sample_document("", &[]);
        doc.add_node(Node::structural("fig", "figure")).unwrap();
        doc.add_node(Node::structural("table", "table")).unwrap();

        let err = doc
            .transaction(|tx| {
                merge_nodes(
                    tx,
                    &NodeId::new("fig"),
                    &Coordinate::new(PropertyPath::new(["fig"]), 0),
                    &body(),
                    MergeDirection::Right,
                    None,
                    Some(&NodeId::new("table")),
                )
            })
            .unwrap_err();

        assert_eq!(
            err,
            EditError::UnsupportedMerge {
                first: NodeId::new("fig"),
                second: NodeId::new("table")
            }
        );
    }
}
