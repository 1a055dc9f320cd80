//! Request dispatcher: stamps list loads and turns their completion into reconciler actions.
//!
//! # Design
//! - The stamp and cancellation handle are captured before the network call and
//!   travel as metadata, never inside the payload.
//! - Id-scoped loads come back positionally aligned with the requested ids.
//! - Failures are tagged and returned as actions; nothing is swallowed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use inventory_api_models::PageResponse;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::core::query::NormalizedParams;
use crate::error::{DispatchError, DispatchResult};
use crate::features::entities::actions::{EntitiesPayload, EntityAction, RequestMeta};
use crate::models::{EntityPage, RowPatch};

/// Data source for list views.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one page of rows.
    ///
    /// With non-empty `ids` the source should restrict results to those ids.
    async fn get_entities(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        show_tags: bool,
    ) -> anyhow::Result<EntityPage>;
}

#[async_trait]
impl<T> EntitySource for Arc<T>
where
    T: EntitySource + ?Sized,
{
    async fn get_entities(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        show_tags: bool,
    ) -> anyhow::Result<EntityPage> {
        (**self).get_entities(ids, params, show_tags).await
    }
}

/// Strictly increasing millisecond stamps, even when the wall clock stalls or steps back.
#[derive(Debug, Default)]
pub struct RequestClock {
    last: AtomicU64,
}

impl RequestClock {
    /// Fresh clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next stamp: `max(now_ms, previous + 1)`.
    #[must_use]
    pub fn stamp(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let previous = match self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        }) {
            Ok(previous) | Err(previous) => previous,
        };
        now.max(previous.saturating_add(1))
    }
}

/// Issues list loads against an [`EntitySource`].
#[derive(Debug)]
pub struct Dispatcher<S> {
    source: S,
    clock: RequestClock,
    show_tags: bool,
}

impl<S> Dispatcher<S>
where
    S: EntitySource,
{
    /// Dispatcher over `source`; tags are not requested by default.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            clock: RequestClock::new(),
            show_tags: false,
        }
    }

    /// Request host tags alongside rows.
    #[must_use]
    pub const fn with_tags(mut self, show_tags: bool) -> Self {
        self.show_tags = show_tags;
        self
    }

    /// Underlying data source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Stamp a new request. Emit `EntityAction::Pending` with the result right away.
    #[must_use]
    pub fn begin(&self, cancel: Option<CancellationToken>) -> RequestMeta {
        let timestamp = self.clock.stamp();
        trace!(timestamp, "list request stamped");
        RequestMeta {
            timestamp,
            cancel,
            show_tags: self.show_tags,
        }
    }

    /// Fetch one page, aligning results with `ids` when any were given.
    ///
    /// # Errors
    /// Returns [`DispatchError::LoadEntities`] when the source fails.
    pub async fn fetch(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        show_tags: bool,
    ) -> DispatchResult<EntityPage> {
        let page = self
            .source
            .get_entities(ids, params, show_tags)
            .await
            .map_err(|original| DispatchError::LoadEntities { original })?;
        Ok(if ids.is_empty() {
            page
        } else {
            align_to_ids(ids, page)
        })
    }

    /// Await the load started with `meta` and describe its completion.
    ///
    /// A cancelled token short-circuits the wait; the resulting fulfilment still
    /// carries the token so the reconciler resets the view.
    pub async fn settle(
        &self,
        meta: RequestMeta,
        ids: &[String],
        params: &NormalizedParams,
    ) -> EntityAction {
        let fetch = self.fetch(ids, params, meta.show_tags);
        let result = match meta.cancel.clone() {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => None,
                result = fetch => Some(result),
            },
            None => Some(fetch.await),
        };
        match result {
            None => {
                trace!(timestamp = meta.timestamp, "list request cancelled");
                EntityAction::Fulfilled {
                    payload: EntitiesPayload::default(),
                    meta,
                }
            }
            Some(Ok(page)) => EntityAction::Fulfilled {
                payload: payload_for(page, params),
                meta,
            },
            Some(Err(err)) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    timestamp = meta.timestamp,
                    "list load rejected"
                );
                EntityAction::Rejected {
                    error: err.to_info(),
                    meta,
                }
            }
        }
    }
}

/// Build the reconciler payload for a completed load, echoing the request intent.
#[must_use]
pub fn payload_for(page: EntityPage, params: &NormalizedParams) -> EntitiesPayload {
    let received = page.results.len() as u64;
    EntitiesPayload {
        results: page.results,
        loaded: None,
        page: Some(params.page),
        per_page: Some(params.per_page),
        count: page.count.or(Some(received)),
        total: page.total,
        filters: Some(params.terms.clone()),
        sort_by: Some(params.sort.clone()),
    }
}

/// One row per distinct requested id, in first-request order; missing ids become
/// placeholders. Repeated ids collapse so `count` matches the rows the reconciler keeps.
#[must_use]
pub fn align_to_ids(ids: &[String], page: EntityPage) -> EntityPage {
    let mut by_id: HashMap<String, RowPatch> = page
        .results
        .into_iter()
        .map(|row| (row.id.clone(), row))
        .collect();
    let mut seen = HashSet::new();
    let results: Vec<RowPatch> = ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .map(|id| {
            let placeholder = RowPatch::placeholder(id.clone());
            match by_id.remove(id) {
                Some(row) => placeholder.overlay(row),
                None => placeholder,
            }
        })
        .collect();
    PageResponse {
        count: Some(results.len() as u64),
        results,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }
}
