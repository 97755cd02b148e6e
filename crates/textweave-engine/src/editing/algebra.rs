//! How an annotation range reacts to a text edit.
//!
//! ```text
//!   <-->: annotation
//!   |--|: edited span
//!
//!   I:   <--> |--|     unchanged
//!   II:  |--| <-->     shift both ends by delta
//!   III: |-<-->-|      delete the annotation
//!   IV:  |-<-|->       start to edit_start + inserted, end by delta
//!   V:   <-|->-|       end expands to edit_start + inserted
//!   VI:  <-|--|->      end by delta
//! ```
//!
//! `delta` is the change in length: `edit_start - edit_end + inserted`.
//! Insertions and deletions share the same classifier; they differ only in
//! the [`BoundaryPolicy`] used where an annotation edge touches an edit edge.

use std::ops::Range;

/// How annotation edges that coincide with edit edges are treated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Annotations absorb text typed at their trailing edge, and an
    /// annotation covering exactly the replaced text keeps the replacement.
    Absorb,
    /// Closed comparisons: an annotation ending where a deletion starts is
    /// untouched, one ending where it ends is removed with it.
    Exclude,
}

/// Boundary policy for insertions and type-over replacements
pub const TYPING_BOUNDARY: BoundaryPolicy = BoundaryPolicy::Absorb;

/// Boundary policy for pure deletions
pub const DELETION_BOUNDARY: BoundaryPolicy = BoundaryPolicy::Exclude;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Text inserted at a caret
    Insert,
    /// Text typed over a non-collapsed selection
    TypeOver,
    /// Text removed, nothing inserted
    Delete,
}

impl EditKind {
    pub fn boundary_policy(self) -> BoundaryPolicy {
        match self {
            EditKind::Insert | EditKind::TypeOver => TYPING_BOUNDARY,
            EditKind::Delete => DELETION_BOUNDARY,
        }
    }
}

/// The span an edit touches, in offsets of the text before the edit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditSpan {
    pub start: usize,
    pub end: usize,
    pub inserted_len: usize,
    pub kind: EditKind,
}

impl EditSpan {
    pub fn insertion(at: usize, inserted_len: usize) -> Self {
        Self {
            start: at,
            end: at,
            inserted_len,
            kind: EditKind::Insert,
        }
    }

    pub fn type_over(replaced: Range<usize>, inserted_len: usize) -> Self {
        Self {
            start: replaced.start,
            end: replaced.end,
            inserted_len,
            kind: EditKind::TypeOver,
        }
    }

    pub fn deletion(removed: Range<usize>) -> Self {
        Self {
            start: removed.start,
            end: removed.end,
            inserted_len: 0,
            kind: EditKind::Delete,
        }
    }

    /// Change in text length caused by the edit
    pub fn delta(&self) -> isize {
        self.start as isize - self.end as isize + self.inserted_len as isize
    }

    /// Offset right after the inserted text
    pub fn inserted_end(&self) -> usize {
        self.start + self.inserted_len
    }
}

/// Relationship between an annotation and an edit (cases I to VI)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relationship {
    /// I: annotation entirely before the edit
    Before,
    /// II: annotation entirely after the edit
    After,
    /// III: annotation inside the edited span
    Inside,
    /// IV: annotation starts inside the edit and ends at or after it
    OverlapsEditEnd,
    /// V: annotation starts before the edit and ends inside it
    OverlapsEditStart,
    /// VI: edit entirely inside the annotation
    Encloses,
}

/// What happens to an annotation's range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    Unchanged,
    Shift { start_delta: isize, end_delta: isize },
    Delete,
    MoveStart { new_start: usize, end_delta: isize },
    ExpandEnd { new_end: usize },
}

impl RangeOutcome {
    /// The range after applying this outcome, `None` if the annotation goes
    pub fn apply(&self, range: &Range<usize>) -> Option<Range<usize>> {
        match *self {
            RangeOutcome::Unchanged => Some(range.clone()),
            RangeOutcome::Shift {
                start_delta,
                end_delta,
            } => Some(
                range.start.saturating_add_signed(start_delta)
                    ..range.end.saturating_add_signed(end_delta),
            ),
            RangeOutcome::Delete => None,
            RangeOutcome::MoveStart {
                new_start,
                end_delta,
            } => Some(new_start..range.end.saturating_add_signed(end_delta)),
            RangeOutcome::ExpandEnd { new_end } => Some(range.start..new_end),
        }
    }
}

/// Classify an annotation range against an edit.
///
/// Returns `None` only when one of the intervals is inverted, which no valid
/// document produces.
pub fn classify(annotation: &Range<usize>, edit: &EditSpan) -> Option<Relationship> {
    if annotation.start > annotation.end || edit.start > edit.end {
        return None;
    }
    let (start, end) = (annotation.start, annotation.end);
    let policy = edit.kind.boundary_policy();
    let ends_before = |offset: usize| match policy {
        BoundaryPolicy::Absorb => end < offset,
        BoundaryPolicy::Exclude => end <= offset,
    };

    let relationship = if ends_before(edit.start) {
        Relationship::Before
    } else if start >= edit.end {
        Relationship::After
    } else if start >= edit.start {
        if ends_before(edit.end) {
            Relationship::Inside
        } else {
            Relationship::OverlapsEditEnd
        }
    } else if ends_before(edit.end) {
        Relationship::OverlapsEditStart
    } else {
        Relationship::Encloses
    };
    Some(relationship)
}

/// Compute what an edit does to an annotation range
pub fn react(annotation: &Range<usize>, edit: &EditSpan) -> Option<RangeOutcome> {
    let delta = edit.delta();
    let outcome = match classify(annotation, edit)? {
        Relationship::Before => RangeOutcome::Unchanged,
        Relationship::After => RangeOutcome::Shift {
            start_delta: delta,
            end_delta: delta,
        },
        Relationship::Inside => RangeOutcome::Delete,
        Relationship::OverlapsEditEnd => {
            // a start sitting exactly on a typed-over or deleted edge stays put
            if annotation.start > edit.start || edit.kind == EditKind::Insert {
                RangeOutcome::MoveStart {
                    new_start: edit.inserted_end(),
                    end_delta: delta,
                }
            } else {
                RangeOutcome::Shift {
                    start_delta: 0,
                    end_delta: delta,
                }
            }
        }
        Relationship::OverlapsEditStart => RangeOutcome::ExpandEnd {
            new_end: edit.inserted_end(),
        },
        Relationship::Encloses => RangeOutcome::Shift {
            start_delta: 0,
            end_delta: delta,
        },
    };
    Some(outcome)
}
