//! Per-row group actions and their availability.

use crate::models::Row;

/// Group-related actions offered on a host row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    /// Assign the host to a group.
    AddToGroup,
    /// Remove the host from its group.
    RemoveFromGroup,
}

impl RowAction {
    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddToGroup => "Add to workspace",
            Self::RemoveFromGroup => "Remove from workspace",
        }
    }
}

/// One row action plus whether it is currently available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowActionState {
    /// The action.
    pub action: RowAction,
    /// False when the row's membership rules out the action.
    pub enabled: bool,
}

/// Group actions for a host row.
///
/// With `ungrouped_workspace` every host belongs to some group and the implicit
/// "ungrouped" workspace marks hosts that can still be assigned. Without it a
/// host is assignable only while it has no group.
#[must_use]
pub fn row_actions(row: &Row, ungrouped_workspace: bool) -> [RowActionState; 2] {
    let groups = row.groups.as_deref().unwrap_or_default();
    let in_ungrouped = groups.first().is_some_and(|group| group.ungrouped);
    let (can_add, can_remove) = if ungrouped_workspace {
        (in_ungrouped, !in_ungrouped)
    } else {
        (groups.is_empty(), !groups.is_empty())
    };
    [
        RowActionState {
            action: RowAction::AddToGroup,
            enabled: can_add,
        },
        RowActionState {
            action: RowAction::RemoveFromGroup,
            enabled: can_remove,
        },
    ]
}
