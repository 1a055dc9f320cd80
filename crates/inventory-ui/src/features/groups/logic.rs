//! Pure group workflow logic and status messages.

use inventory_api_models::GroupRecord;
use tracing::debug;

use crate::error::BatchError;
use crate::features::groups::GroupSource;
use crate::features::selection::state::SelectionSet;
use crate::services::batch::{BATCH_CHUNK_SIZE, fetch_batched_inline};

/// Warning shown when a bulk add includes hosts that already have a group.
pub const ALREADY_GROUPED_WARNING: &str = "One or more of the selected systems already belong to a group. Only ungrouped systems can be added. Unselect these systems to move forward.";

/// Whether a set of groups may be deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteVerdict {
    /// Every group is empty.
    Deletable(Vec<GroupRecord>),
    /// At least one group still has hosts.
    NotEmpty(Vec<GroupRecord>),
}

impl DeleteVerdict {
    /// Groups the verdict was computed over.
    #[must_use]
    pub fn groups(&self) -> &[GroupRecord] {
        match self {
            Self::Deletable(groups) | Self::NotEmpty(groups) => groups,
        }
    }

    /// True when deletion may proceed.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        matches!(self, Self::Deletable(_))
    }

    /// Confirmation or refusal title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        let plural = self.groups().len() > 1;
        match (self, plural) {
            (Self::Deletable(_), true) => "Delete workspaces?",
            (Self::Deletable(_), false) => "Delete workspace?",
            (Self::NotEmpty(_), true) => "Cannot delete workspaces at this time",
            (Self::NotEmpty(_), false) => "Cannot delete workspace at this time",
        }
    }

    /// Body text explaining what happens next.
    #[must_use]
    pub fn body(&self) -> String {
        let groups = self.groups();
        let first = first_name(groups);
        match self {
            Self::Deletable(_) if groups.len() > 1 => {
                format!("{} workspaces and all their data will be deleted.", groups.len())
            }
            Self::Deletable(_) => format!("{first} and all its data will be deleted."),
            Self::NotEmpty(_) if groups.len() > 1 => format!(
                "{NOT_EMPTY_PREFIX} To delete workspaces, first remove all of the systems from them."
            ),
            Self::NotEmpty(_) => format!(
                "{NOT_EMPTY_PREFIX} To delete {first}, first remove all of the systems from it."
            ),
        }
    }
}

const NOT_EMPTY_PREFIX: &str = "Workspaces containing systems cannot be deleted.";

fn first_name(groups: &[GroupRecord]) -> &str {
    groups.first().map_or("", |group| group.name.as_str())
}

/// Fetch the groups in batches and decide whether they can be deleted.
///
/// # Errors
/// Returns [`BatchError`] when any chunk of the lookup fails.
pub async fn verify_groups_deletable<S>(
    source: &S,
    ids: &[String],
) -> Result<DeleteVerdict, BatchError>
where
    S: GroupSource + ?Sized,
{
    let chunks = fetch_batched_inline(
        |chunk| async move { source.get_groups_by_ids(&chunk).await },
        ids,
        BATCH_CHUNK_SIZE,
    )
    .await?;
    let groups: Vec<GroupRecord> = chunks.into_iter().flatten().collect();
    let non_empty = groups.iter().filter(|group| group.host_count > 0).count();
    debug!(groups = groups.len(), non_empty, "verified group emptiness");
    Ok(if non_empty == 0 {
        DeleteVerdict::Deletable(groups)
    } else {
        DeleteVerdict::NotEmpty(groups)
    })
}

/// Toast text for a mutation's outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessages {
    /// Shown on success.
    pub success: String,
    /// Shown on failure.
    pub failure: String,
}

/// Messages for deleting `count` groups; `name` is used when only one is deleted.
#[must_use]
pub fn delete_messages(count: usize, name: &str) -> StatusMessages {
    if count > 1 {
        StatusMessages {
            success: format!("{count} workspaces deleted"),
            failure: format!("Failed to delete {count} workspaces"),
        }
    } else {
        StatusMessages {
            success: format!("{name} has been removed successfully"),
            failure: format!("Failed to delete workspace {name}"),
        }
    }
}

/// Messages for adding `count` hosts to a group, named by its name or id.
#[must_use]
pub fn add_hosts_messages(count: usize, group: &str) -> StatusMessages {
    let (title, lower) = systems_word(count);
    StatusMessages {
        success: format!("{title} added to {group}"),
        failure: format!("Failed to add {lower} to {group}"),
    }
}

/// Messages for removing `count` hosts from a group.
#[must_use]
pub fn remove_hosts_messages(count: usize, group: &str) -> StatusMessages {
    let (title, lower) = systems_word(count);
    StatusMessages {
        success: format!("{title} removed from {group}"),
        failure: format!("Failed to remove {lower} from {group}"),
    }
}

/// Messages for creating a group.
#[must_use]
pub fn create_messages(name: &str) -> StatusMessages {
    StatusMessages {
        success: format!("{name} workspace created"),
        failure: format!("Failed to create workspace {name}"),
    }
}

/// Messages for renaming a group.
#[must_use]
pub fn rename_messages(name: &str) -> StatusMessages {
    StatusMessages {
        success: format!("Workspace renamed to {name}"),
        failure: format!("Failed to rename workspace to {name}"),
    }
}

const fn systems_word(count: usize) -> (&'static str, &'static str) {
    if count > 1 {
        ("Systems", "systems")
    } else {
        ("System", "system")
    }
}

/// Outcome of checking a selection before adding it to a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddHostsCheck {
    /// Nothing selected.
    Empty,
    /// Every selected host is ungrouped.
    Ready(Vec<String>),
    /// Some hosts already belong to a group: `(host id, group name)`.
    AlreadyGrouped(Vec<(String, String)>),
}

/// Check an enumerated selection before adding it to a group.
#[must_use]
pub fn check_add_hosts(selection: &SelectionSet) -> AddHostsCheck {
    let grouped = selection.already_grouped();
    if !grouped.is_empty() {
        return AddHostsCheck::AlreadyGrouped(
            grouped
                .into_iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        );
    }
    let ids = selection.ids();
    if ids.is_empty() {
        AddHostsCheck::Empty
    } else {
        AddHostsCheck::Ready(ids)
    }
}
