//! Tags of one system, paged independently of the list it was opened from.

use inventory_api_models::{HostTagsResponse, StructuredTag};
use serde::Serialize;
use tracing::debug;

use crate::features::entities::state::ReduceOutcome;
use crate::models::ErrorInfo;

/// Tags of the system currently inspected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SystemTagsState {
    /// System the tags belong to.
    pub system_id: Option<String>,
    /// Tags on the current page.
    pub tags: Vec<StructuredTag>,
    /// Tag count known for the system, independent of the page.
    pub tags_count: Option<u64>,
    /// Page of the last applied response.
    pub page: Option<u32>,
    /// Page size of the last applied response.
    pub per_page: Option<u32>,
    /// False while a load is in flight.
    pub loaded: bool,
    /// Stamp of the newest request seen.
    pub last_request_timestamp: u64,
    /// Last load failure.
    pub error: Option<ErrorInfo>,
}

/// Transitions of a system's tag page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemTagsAction {
    /// A load for `system_id` started; `tags_count` is what the caller already knows.
    Pending {
        /// System being inspected.
        system_id: String,
        /// Known tag count, if any.
        tags_count: Option<u64>,
        /// Request stamp.
        timestamp: u64,
    },
    /// A load completed.
    Fulfilled {
        /// Server response.
        response: HostTagsResponse,
        /// Stamp of the originating request.
        timestamp: u64,
    },
    /// A load failed.
    Rejected {
        /// Tagged failure.
        error: ErrorInfo,
        /// Stamp of the originating request.
        timestamp: u64,
    },
}

/// Apply one action to a system's tag page.
pub fn reduce_system_tags(state: &mut SystemTagsState, action: SystemTagsAction) -> ReduceOutcome {
    match action {
        SystemTagsAction::Pending {
            system_id,
            tags_count,
            timestamp,
        } => {
            if state.system_id.as_deref() != Some(system_id.as_str()) {
                state.tags.clear();
            }
            state.system_id = Some(system_id);
            state.tags_count = tags_count;
            state.loaded = false;
            state.error = None;
            state.last_request_timestamp = state.last_request_timestamp.max(timestamp);
            ReduceOutcome::Applied
        }
        SystemTagsAction::Fulfilled { timestamp, .. }
        | SystemTagsAction::Rejected { timestamp, .. }
            if timestamp < state.last_request_timestamp =>
        {
            debug!(timestamp, "stale system tag response discarded");
            ReduceOutcome::Stale
        }
        SystemTagsAction::Fulfilled { mut response, .. } => {
            let tags = state
                .system_id
                .as_ref()
                .and_then(|id| response.results.remove(id))
                .or_else(|| response.results.into_values().next())
                .unwrap_or_default();
            state.tags_count = state.tags_count.or(response.total);
            state.tags = tags;
            state.page = response.page;
            state.per_page = response.per_page;
            state.loaded = true;
            ReduceOutcome::Applied
        }
        SystemTagsAction::Rejected { error, .. } => {
            state.error = Some(error);
            state.loaded = true;
            ReduceOutcome::Applied
        }
    }
}
