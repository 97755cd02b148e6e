use log::debug;

use crate::document::{AnnotationEdit, Transaction};
use crate::error::EditError;
use crate::model::{Annotation, AnnotationId, PropertyPath};

/// Move the annotations at or after `from_offset` on `from_path` onto
/// `to_path`, re-anchored so that `from_offset` lands on `to_offset`.
///
/// - annotations starting at or after `from_offset` move and keep their id
/// - annotations straddling `from_offset` are cut there; when splittable, a
///   copy with a fresh id covers the cut-off remainder on `to_path`
/// - annotations ending at or before `from_offset` stay put
///
/// Callers move or truncate the text itself; this only touches annotations,
/// so the target text must already be long enough to hold them.
pub fn transfer_annotations<T: Transaction + ?Sized>(
    tx: &mut T,
    from_path: &PropertyPath,
    from_offset: usize,
    to_path: &PropertyPath,
    to_offset: usize,
) -> Result<(), EditError> {
    for annotation in tx.annotations(from_path) {
        if annotation.start >= from_offset {
            let start = to_offset + (annotation.start - from_offset);
            let end = to_offset + (annotation.end - from_offset);
            debug!(
                "Transferring annotation {} to {to_path} [{start}, {end})",
                annotation.id
            );
            tx.update_annotation(
                &annotation.id,
                AnnotationEdit::MoveTo {
                    path: to_path.clone(),
                    start,
                    end,
                },
            )?;
        } else if annotation.end > from_offset {
            if annotation.splittable && tx.schema().is_splittable(&annotation.annotation_type) {
                let copy = Annotation {
                    id: AnnotationId::generate(&annotation.annotation_type),
                    path: to_path.clone(),
                    start: to_offset,
                    end: to_offset + (annotation.end - from_offset),
                    ..annotation.clone()
                };
                debug!(
                    "Splitting annotation {} at {from_offset}, remainder is {}",
                    annotation.id, copy.id
                );
                tx.create_annotation(copy)?;
            }
            tx.update_annotation(
                &annotation.id,
                AnnotationEdit::SetRange {
                    start: annotation.start,
                    end: from_offset,
                },
            )?;
        }
    }
    Ok(())
}

/// Join annotations that were split at `offset` on `path`.
///
/// An annotation ending at `offset` absorbs one starting at `offset` when
/// both are non-empty and splittable with the same type and properties. The
/// left one keeps its id; the right one is deleted.
pub fn rejoin_annotations<T: Transaction + ?Sized>(
    tx: &mut T,
    path: &PropertyPath,
    offset: usize,
) -> Result<(), EditError> {
    let annotations = tx.annotations(path);
    let joinable = |annotation: &Annotation| {
        annotation.start < annotation.end
            && annotation.splittable
            && tx.schema().is_splittable(&annotation.annotation_type)
    };
    let mut lefts: Vec<&Annotation> = annotations
        .iter()
        .filter(|annotation| annotation.end == offset && joinable(annotation))
        .collect();
    let rights: Vec<&Annotation> = annotations
        .iter()
        .filter(|annotation| annotation.start == offset && joinable(annotation))
        .collect();

    let mut joins = Vec::new();
    for right in rights {
        let Some(index) = lefts.iter().position(|left| {
            left.annotation_type == right.annotation_type && left.properties == right.properties
        }) else {
            continue;
        };
        let left = lefts.remove(index);
        joins.push((left.id.clone(), left.start, right.id.clone(), right.end));
    }

    for (left, start, right, end) in joins {
        debug!("Rejoining annotation {right} into {left} at {offset}");
        tx.delete_annotation(&right)?;
        tx.update_annotation(&left, AnnotationEdit::SetRange { start, end })?;
    }
    Ok(())
}
