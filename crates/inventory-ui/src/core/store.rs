//! Explicit owner of one list view's state.
//!
//! # Design
//! - One store per mounted view; no process-wide singleton.
//! - All mutation goes through the reducers so transitions stay serial.
//! - Loads run the full cycle: stamp, pending, fetch, settle, reduce.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::query::{HiddenFilters, NormalizedParams, Pagination, build};
use crate::features::entities::actions::EntityAction;
use crate::features::entities::state::{
    ListState, ReduceOutcome, reduce, select_controls_disabled, select_page_count,
    select_selected_ids, select_visible_rows,
};
use crate::features::hosts::HostSource;
use crate::features::tags::state::{TagSource, TagsAction, TagsState, reduce_tags};
use crate::features::tags::system::{SystemTagsAction, SystemTagsState, reduce_system_tags};
use crate::models::{ErrorInfo, Row};
use crate::services::dispatcher::{Dispatcher, EntitySource, RequestClock};

/// Request type tag carried by tag catalogue failures.
pub const ALL_TAGS: &str = "ALL_TAGS";
/// Request type tag carried by per-system tag failures.
pub const LOAD_TAGS: &str = "LOAD_TAGS";

/// State owner for a list view, its tag catalogue and the inspected system's tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListStore {
    list: ListState,
    tags: TagsState,
    system_tags: SystemTagsState,
}

impl ListStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current list state.
    #[must_use]
    pub const fn state(&self) -> &ListState {
        &self.list
    }

    /// Current tag catalogue.
    #[must_use]
    pub const fn tags(&self) -> &TagsState {
        &self.tags
    }

    /// Tags of the system last inspected.
    #[must_use]
    pub const fn system_tags(&self) -> &SystemTagsState {
        &self.system_tags
    }

    /// Owned copy of the list state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> ListState {
        self.list.clone()
    }

    /// Apply a list action.
    pub fn apply(&mut self, action: EntityAction) -> ReduceOutcome {
        reduce(&mut self.list, action)
    }

    /// Apply a tag catalogue action.
    pub fn apply_tags(&mut self, action: TagsAction) -> ReduceOutcome {
        reduce_tags(&mut self.tags, action)
    }

    /// Apply a per-system tag action.
    pub fn apply_system_tags(&mut self, action: SystemTagsAction) -> ReduceOutcome {
        reduce_system_tags(&mut self.system_tags, action)
    }

    /// Rows in display order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&Row> {
        select_visible_rows(&self.list)
    }

    /// Ids of loaded rows marked selected.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        select_selected_ids(&self.list)
    }

    /// Number of pages for the current filter.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        select_page_count(&self.list)
    }

    /// Whether filter and pagination controls should be disabled.
    #[must_use]
    pub fn controls_disabled(&self) -> bool {
        select_controls_disabled(&self.list)
    }

    /// Request parameters for the current filters and sort at `pagination`.
    #[must_use]
    pub fn params(&self, pagination: Pagination, hidden: &HiddenFilters) -> NormalizedParams {
        build(&self.list.active_filters, Some(&self.list.sort_by), pagination, hidden)
    }

    /// Run one list load to completion and fold it into the state.
    pub async fn load<S>(
        &mut self,
        dispatcher: &Dispatcher<S>,
        ids: &[String],
        params: &NormalizedParams,
        cancel: Option<CancellationToken>,
    ) -> ReduceOutcome
    where
        S: EntitySource,
    {
        let meta = dispatcher.begin(cancel);
        self.apply(EntityAction::Pending(meta.clone()));
        let settled = dispatcher.settle(meta, ids, params).await;
        self.apply(settled)
    }

    /// Load one page of the tag catalogue.
    pub async fn load_tags<T>(
        &mut self,
        source: &T,
        clock: &RequestClock,
        search: Option<&str>,
        pagination: Pagination,
    ) -> ReduceOutcome
    where
        T: TagSource + ?Sized,
    {
        let defaults = build(&[], None, pagination, &HiddenFilters::default());
        let timestamp = clock.stamp();
        self.apply_tags(TagsAction::Pending(timestamp));
        let action = match source.get_tags(search, defaults.page, defaults.per_page).await {
            Ok(page) => TagsAction::Fulfilled { page, timestamp },
            Err(err) => {
                warn!(error = %err, "tag catalogue load rejected");
                TagsAction::Rejected {
                    error: ErrorInfo {
                        kind: ALL_TAGS.to_string(),
                        message: format!("{err:#}"),
                    },
                    timestamp,
                }
            }
        };
        self.apply_tags(action)
    }

    /// Load one page of a system's tags. `tags_count` is the count already
    /// known from the list row, if any.
    pub async fn load_system_tags<H>(
        &mut self,
        source: &H,
        clock: &RequestClock,
        system_id: &str,
        search: Option<&str>,
        pagination: Pagination,
        tags_count: Option<u64>,
    ) -> ReduceOutcome
    where
        H: HostSource + ?Sized,
    {
        let defaults = build(&[], None, pagination, &HiddenFilters::default());
        let timestamp = clock.stamp();
        self.apply_system_tags(SystemTagsAction::Pending {
            system_id: system_id.to_string(),
            tags_count,
            timestamp,
        });
        let action = match source
            .get_host_tags(system_id, search, defaults.page, defaults.per_page)
            .await
        {
            Ok(response) => SystemTagsAction::Fulfilled {
                response,
                timestamp,
            },
            Err(err) => {
                warn!(error = %err, system_id, "system tag load rejected");
                SystemTagsAction::Rejected {
                    error: ErrorInfo {
                        kind: LOAD_TAGS.to_string(),
                        message: format!("{err:#}"),
                    },
                    timestamp,
                }
            }
        };
        self.apply_system_tags(action)
    }
}
