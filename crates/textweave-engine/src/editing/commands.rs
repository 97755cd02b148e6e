use serde::{Deserialize, Serialize};

use crate::document::Transaction;
use crate::editing::operations::{
    MergeDirection, break_node, delete_range, insert_text, merge_nodes,
};
use crate::error::EditError;
use crate::model::{ContainerId, Coordinate, NodeId, Selection};

/// Commands that can be applied to the document.
///
/// Each command runs in its own transaction. The serialized form is what
/// replay scripts are written in, e.g.
/// `{"cmd": "insert_text", "text": "hi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Cmd {
    /// Insert at `selection`, or at the document's current selection
    InsertText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selection: Option<Selection>,
    },
    DeleteRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<Coordinate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<Coordinate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container_id: Option<ContainerId>,
    },
    BreakNode {
        node_id: NodeId,
        coordinate: Coordinate,
        container_id: ContainerId,
    },
    /// Neighbours default to the nodes around `node_id` in the container
    MergeNodes {
        node_id: NodeId,
        coordinate: Coordinate,
        container_id: ContainerId,
        direction: MergeDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<NodeId>,
    },
    SetSelection {
        selection: Selection,
    },
}

/// Run a command against a transaction
pub fn run_command<T: Transaction + ?Sized>(tx: &mut T, cmd: &Cmd) -> Result<(), EditError> {
    match cmd {
        Cmd::InsertText { text, selection } => {
            let selection = match selection {
                Some(selection) => selection.clone(),
                None => tx.selection().clone(),
            };
            insert_text(tx, &selection, text)
        }
        Cmd::DeleteRange {
            start,
            end,
            container_id,
        } => delete_range(tx, start.as_ref(), end.as_ref(), container_id.as_ref()),
        Cmd::BreakNode {
            node_id,
            coordinate,
            container_id,
        } => break_node(tx, node_id, coordinate, container_id).map(|_| ()),
        Cmd::MergeNodes {
            node_id,
            coordinate,
            container_id,
            direction,
            previous,
            next,
        } => {
            let (around_previous, around_next) = {
                let (previous, next) = tx.container(container_id)?.neighbours(node_id);
                (previous.cloned(), next.cloned())
            };
            merge_nodes(
                tx,
                node_id,
                coordinate,
                container_id,
                *direction,
                previous.as_ref().or(around_previous.as_ref()),
                next.as_ref().or(around_next.as_ref()),
            )
            .map(|_| ())
        }
        Cmd::SetSelection { selection } => {
            tx.set_selection(selection.clone());
            Ok(())
        }
    }
}
