//! Tag catalogue slice with its own last-request-wins stamp.

use async_trait::async_trait;
use indexmap::IndexMap;
use inventory_api_models::{PageResponse, TagCount};
use serde::Serialize;
use tracing::debug;

use crate::features::entities::state::ReduceOutcome;
use crate::models::ErrorInfo;

/// Source of the tag catalogue.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Fetch one page of tags, optionally narrowed by a search string.
    async fn get_tags(
        &self,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<PageResponse<TagCount>>;
}

/// Tags sharing one namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    /// Namespace; `None` for tags without one.
    pub namespace: Option<String>,
    /// Tags in server order.
    pub tags: Vec<TagCount>,
}

/// Tag catalogue state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TagsState {
    /// Tags grouped by namespace, in first-seen order.
    pub groups: Vec<TagGroup>,
    /// False while a load is in flight.
    pub loaded: bool,
    /// Page of the last applied response.
    pub page: Option<u32>,
    /// Page size of the last applied response.
    pub per_page: Option<u32>,
    /// Total tags on the server.
    pub total: u64,
    /// Tags beyond the first page.
    pub additional_tags_count: u64,
    /// Stamp of the newest tag request seen.
    pub last_request_timestamp: u64,
    /// Last load failure.
    pub error: Option<ErrorInfo>,
}

/// Transitions of the tag catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagsAction {
    /// A tag load started.
    Pending(u64),
    /// A tag load completed.
    Fulfilled {
        /// Server page.
        page: PageResponse<TagCount>,
        /// Stamp of the originating request.
        timestamp: u64,
    },
    /// A tag load failed.
    Rejected {
        /// Tagged failure.
        error: ErrorInfo,
        /// Stamp of the originating request.
        timestamp: u64,
    },
}

/// Apply one action to the tag catalogue.
pub fn reduce_tags(state: &mut TagsState, action: TagsAction) -> ReduceOutcome {
    match action {
        TagsAction::Pending(timestamp) => {
            state.loaded = false;
            state.last_request_timestamp = state.last_request_timestamp.max(timestamp);
            ReduceOutcome::Applied
        }
        TagsAction::Fulfilled { timestamp, .. } | TagsAction::Rejected { timestamp, .. }
            if timestamp < state.last_request_timestamp =>
        {
            debug!(timestamp, "stale tag response discarded");
            ReduceOutcome::Stale
        }
        TagsAction::Fulfilled { page, .. } => {
            let total = page.total.unwrap_or_default();
            state.groups = group_by_namespace(page.results);
            state.page = page.page;
            state.per_page = page.per_page;
            state.total = total;
            // Without a page size nothing is known to lie beyond this page.
            state.additional_tags_count = page
                .per_page
                .map_or(0, |per_page| total.saturating_sub(u64::from(per_page)));
            state.loaded = true;
            ReduceOutcome::Applied
        }
        TagsAction::Rejected { error, .. } => {
            state.error = Some(error);
            ReduceOutcome::Applied
        }
    }
}

fn group_by_namespace(tags: Vec<TagCount>) -> Vec<TagGroup> {
    let mut grouped: IndexMap<Option<String>, Vec<TagCount>> = IndexMap::new();
    for tag in tags {
        grouped
            .entry(tag.tag.namespace.clone())
            .or_default()
            .push(tag);
    }
    grouped
        .into_iter()
        .map(|(namespace, tags)| TagGroup { namespace, tags })
        .collect()
}
