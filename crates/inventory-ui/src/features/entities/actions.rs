//! Actions consumed by the list reconciler.

use inventory_api_models::PageResponse;
use tokio_util::sync::CancellationToken;

use crate::models::{EntityPage, ErrorInfo, FilterItem, FilterTerm, RowPatch, SortBy};

/// Metadata captured when a request starts and carried to its settlement.
#[derive(Clone, Debug, Default)]
pub struct RequestMeta {
    /// Monotonic request stamp in milliseconds.
    pub timestamp: u64,
    /// Cancellation handle for the originating request.
    pub cancel: Option<CancellationToken>,
    /// Whether the request asked for host tags.
    pub show_tags: bool,
}

impl RequestMeta {
    /// Metadata for a request stamped at `timestamp` without a cancellation handle.
    #[must_use]
    pub const fn at(timestamp: u64) -> Self {
        Self {
            timestamp,
            cancel: None,
            show_tags: false,
        }
    }

    /// Attach a cancellation handle.
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// True when the originating request was abandoned by its caller.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Result payload of a list load.
///
/// Every field is optional: absent pagination fields leave the current state
/// untouched when the payload is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitiesPayload {
    /// Rows in server order.
    pub results: Vec<RowPatch>,
    /// Explicit loaded flag; `Some(true)` drops rows the server never confirmed.
    pub loaded: Option<bool>,
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Rows on this page.
    pub count: Option<u64>,
    /// Rows matching the filter across all pages.
    pub total: Option<u64>,
    /// Filter terms the request was issued with.
    pub filters: Option<Vec<FilterTerm>>,
    /// Sort the request was issued with.
    pub sort_by: Option<SortBy>,
}

impl EntitiesPayload {
    /// A payload with no `loaded` flag and no `page`/`per_page` carries no usable shape.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.loaded.is_none() && self.page.is_none() && self.per_page.is_none()
    }
}

impl From<EntityPage> for EntitiesPayload {
    fn from(page: PageResponse<RowPatch>) -> Self {
        Self {
            results: page.results,
            loaded: None,
            page: page.page,
            per_page: page.per_page,
            count: page.count,
            total: page.total,
            filters: None,
            sort_by: None,
        }
    }
}

/// Rows targeted by a selection change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectTarget {
    /// One row id.
    One(String),
    /// Several row ids, applied in order.
    Many(Vec<String>),
    /// Every loaded row.
    All,
}

impl SelectTarget {
    /// Target a single id.
    #[must_use]
    pub fn one(id: impl Into<String>) -> Self {
        Self::One(id.into())
    }
}

/// Every transition the list reconciler understands.
#[derive(Clone, Debug)]
pub enum EntityAction {
    /// A load started.
    Pending(RequestMeta),
    /// A load completed.
    Fulfilled {
        /// Page data plus echoed request intent.
        payload: EntitiesPayload,
        /// Metadata captured when the load started.
        meta: RequestMeta,
    },
    /// A load failed.
    Rejected {
        /// Tagged failure.
        error: ErrorInfo,
        /// Metadata captured when the load started.
        meta: RequestMeta,
    },
    /// A filter chip was added or removed.
    FilterSelect {
        /// The chip and any grouped sub-items.
        item: FilterItem,
        /// Add when true, remove when false.
        selected: bool,
    },
    /// Sort column or direction changed.
    ChangeSort(SortBy),
    /// Drop every active filter.
    ClearFilters,
    /// Reset the whole list.
    ClearEntities,
    /// Mark rows for a bulk action.
    SelectEntity {
        /// Rows to mark.
        target: SelectTarget,
        /// New selection flag.
        selected: bool,
    },
    /// Toggle the loading flag without touching rows.
    EntitiesLoading(bool),
    /// Show externally supplied rows without a request stamp.
    ShowEntities(EntitiesPayload),
    /// Forget the last stored error.
    ClearErrors,
}

impl EntityAction {
    /// Stable action name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending(_) => "LOAD_ENTITIES_PENDING",
            Self::Fulfilled { .. } => "LOAD_ENTITIES_FULFILLED",
            Self::Rejected { .. } => "LOAD_ENTITIES_REJECTED",
            Self::FilterSelect { .. } => "FILTER_SELECT",
            Self::ChangeSort(_) => "CHANGE_SORT",
            Self::ClearFilters => "CLEAR_FILTERS",
            Self::ClearEntities => "CLEAR_ENTITIES",
            Self::SelectEntity { .. } => "SELECT_ENTITY",
            Self::EntitiesLoading(_) => "ENTITIES_LOADING",
            Self::ShowEntities(_) => "SHOW_ENTITIES",
            Self::ClearErrors => "CLEAR_ERRORS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_only_when_token_is_cancelled() {
        let token = CancellationToken::new();
        let meta = RequestMeta::at(5).with_cancel(token.clone());
        assert!(!meta.is_aborted());
        token.cancel();
        assert!(meta.is_aborted());
        assert!(!RequestMeta::at(5).is_aborted());
    }

    #[test]
    fn degenerate_payload_requires_every_shape_field_missing() {
        assert!(EntitiesPayload::default().is_degenerate());
        let with_page = EntitiesPayload {
            page: Some(1),
            ..EntitiesPayload::default()
        };
        assert!(!with_page.is_degenerate());
        let with_loaded = EntitiesPayload {
            loaded: Some(false),
            ..EntitiesPayload::default()
        };
        assert!(!with_loaded.is_degenerate());
    }

    #[test]
    fn page_conversion_keeps_pagination() {
        let page = PageResponse {
            results: vec![RowPatch::placeholder("a")],
            page: Some(2),
            per_page: Some(10),
            count: Some(1),
            total: Some(11),
        };
        let payload = EntitiesPayload::from(page);
        assert_eq!(payload.results.len(), 1);
        assert_eq!(payload.page, Some(2));
        assert_eq!(payload.total, Some(11));
        assert!(payload.loaded.is_none());
    }
}
