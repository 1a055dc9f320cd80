//! List state and the reconciler that folds dispatch lifecycle events into it.
//!
//! # Design
//! - `reduce` is synchronous and total; every action yields a [`ReduceOutcome`].
//! - Rows live in an insertion-ordered map keyed by id so merges are O(1).
//! - Out-of-order completions are resolved by request stamp alone.

use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use tracing::debug;

use crate::core::query::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::features::entities::actions::{EntitiesPayload, EntityAction, SelectTarget};
use crate::models::{ErrorInfo, FilterItem, FilterTerm, Row, SortBy};

/// Authoritative in-memory state of one list view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListState {
    /// Rows keyed by id, in server order.
    pub rows: IndexMap<String, Row>,
    /// False while a load is in flight.
    pub loaded: bool,
    /// Current 1-based page.
    pub page: u32,
    /// Current page size.
    pub per_page: u32,
    /// Rows on the current page as reported by the server.
    pub count: u64,
    /// Rows matching the filter across all pages.
    pub total: u64,
    /// Active sort.
    pub sort_by: SortBy,
    /// Active filter chips, unique by value.
    pub active_filters: Vec<FilterTerm>,
    /// Stamp of the newest request seen; never decreases while mounted.
    pub last_request_timestamp: u64,
    /// Last load failure.
    pub error: Option<ErrorInfo>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            loaded: false,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            count: 0,
            total: 0,
            sort_by: SortBy::default(),
            active_filters: Vec::new(),
            last_request_timestamp: 0,
            error: None,
        }
    }
}

/// What the reconciler did with an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceOutcome {
    /// State changed (or was deliberately rewritten).
    Applied,
    /// Superseded by a newer request; state untouched.
    Stale,
    /// The originating request was abandoned; state reset to default.
    Aborted,
    /// Payload carried no usable shape; state untouched.
    Ignored,
}

/// Apply one action to the list state.
pub fn reduce(state: &mut ListState, action: EntityAction) -> ReduceOutcome {
    let name = action.name();
    let outcome = match action {
        EntityAction::Pending(meta) => {
            state.rows.clear();
            state.loaded = false;
            state.last_request_timestamp = state.last_request_timestamp.max(meta.timestamp);
            ReduceOutcome::Applied
        }
        EntityAction::Fulfilled { payload, meta } => {
            if meta.timestamp < state.last_request_timestamp {
                ReduceOutcome::Stale
            } else if meta.is_aborted() {
                *state = ListState::default();
                ReduceOutcome::Aborted
            } else if payload.is_degenerate() {
                ReduceOutcome::Ignored
            } else {
                merge_payload(state, payload);
                ReduceOutcome::Applied
            }
        }
        EntityAction::Rejected { error, meta } => {
            if meta.timestamp < state.last_request_timestamp {
                ReduceOutcome::Stale
            } else {
                state.error = Some(error);
                ReduceOutcome::Applied
            }
        }
        EntityAction::FilterSelect { item, selected } => {
            select_filter(&mut state.active_filters, item, selected);
            ReduceOutcome::Applied
        }
        EntityAction::ChangeSort(sort_by) => {
            state.sort_by = sort_by;
            ReduceOutcome::Applied
        }
        EntityAction::ClearFilters => {
            state.active_filters.clear();
            ReduceOutcome::Applied
        }
        EntityAction::ClearEntities => {
            *state = ListState::default();
            ReduceOutcome::Applied
        }
        EntityAction::SelectEntity { target, selected } => {
            select_entity(&mut state.rows, target, selected);
            ReduceOutcome::Applied
        }
        EntityAction::EntitiesLoading(loading) => {
            state.loaded = !loading;
            ReduceOutcome::Applied
        }
        EntityAction::ShowEntities(payload) => {
            merge_payload(
                state,
                EntitiesPayload {
                    loaded: Some(false),
                    ..payload
                },
            );
            ReduceOutcome::Applied
        }
        EntityAction::ClearErrors => {
            state.error = None;
            ReduceOutcome::Applied
        }
    };
    if outcome != ReduceOutcome::Applied {
        debug!(
            action = name,
            ?outcome,
            last_request_timestamp = state.last_request_timestamp,
            "list action discarded"
        );
    }
    outcome
}

fn merge_payload(state: &mut ListState, payload: EntitiesPayload) {
    for patch in payload.results {
        match state.rows.entry(patch.id.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().apply(patch),
            Entry::Vacant(slot) => {
                slot.insert(Row::from(patch));
            }
        }
    }
    if payload.loaded == Some(true) {
        state.rows.retain(|_, row| row.is_created());
    }
    state.loaded = payload.loaded.unwrap_or(true);
    if let Some(page) = payload.page {
        state.page = page;
    }
    if let Some(per_page) = payload.per_page {
        state.per_page = per_page;
    }
    if let Some(count) = payload.count {
        state.count = count;
    }
    if let Some(total) = payload.total {
        state.total = total;
    }
    if let Some(sort_by) = payload.sort_by {
        state.sort_by = sort_by;
    }
    state.active_filters = payload.filters.unwrap_or_default();
}

fn select_filter(filters: &mut Vec<FilterTerm>, item: FilterItem, selected: bool) {
    let FilterItem { term, items } = item;
    if selected {
        filters.push(term);
        filters.extend(items);
        let mut seen = HashSet::new();
        let mut kept: Vec<FilterTerm> = filters
            .drain(..)
            .rev()
            .filter(|filter| seen.insert(filter.value.clone()))
            .collect();
        kept.reverse();
        *filters = kept;
    } else {
        for value in std::iter::once(&term).chain(items.iter()).map(|t| &t.value) {
            // An absent value removes the last filter instead.
            let index = filters
                .iter()
                .position(|filter| &filter.value == value)
                .or_else(|| filters.len().checked_sub(1));
            if let Some(index) = index {
                filters.remove(index);
            }
        }
    }
}

fn select_entity(rows: &mut IndexMap<String, Row>, target: SelectTarget, selected: bool) {
    let ids = match target {
        SelectTarget::One(id) => vec![id],
        SelectTarget::Many(ids) => ids,
        SelectTarget::All => {
            rows.values_mut().for_each(|row| row.selected = selected);
            return;
        }
    };
    for id in ids {
        if let Some(row) = rows.get_mut(&id) {
            row.selected = selected;
        } else {
            // Unknown ids fan out to every loaded row.
            rows.values_mut().for_each(|row| row.selected = selected);
        }
    }
}

/// Rows in display order.
#[must_use]
pub fn select_visible_rows(state: &ListState) -> Vec<&Row> {
    state.rows.values().collect()
}

/// Ids of loaded rows currently marked selected, in display order.
#[must_use]
pub fn select_selected_ids(state: &ListState) -> Vec<String> {
    state
        .rows
        .values()
        .filter(|row| row.selected)
        .map(|row| row.id.clone())
        .collect()
}

/// Number of pages implied by `total` and `per_page`.
#[must_use]
pub fn select_page_count(state: &ListState) -> u64 {
    let per_page = u64::from(state.per_page.max(1));
    state.total.div_ceil(per_page)
}

/// Filter and pagination controls are disabled after a failed load with nothing to show.
#[must_use]
pub fn select_controls_disabled(state: &ListState) -> bool {
    state.error.is_some() && state.rows.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::entities::actions::RequestMeta;
    use crate::models::{RowPatch, SortDirection};
    use inventory_test_support::fixtures::host;
    use tokio_util::sync::CancellationToken;

    fn created(id: &str) -> RowPatch {
        RowPatch::from(host(id))
    }

    fn page_payload(ids: &[&str], page: u32) -> EntitiesPayload {
        EntitiesPayload {
            results: ids.iter().map(|id| created(id)).collect(),
            page: Some(page),
            per_page: Some(50),
            count: Some(ids.len() as u64),
            total: Some(120),
            ..EntitiesPayload::default()
        }
    }

    fn fulfilled(payload: EntitiesPayload, timestamp: u64) -> EntityAction {
        EntityAction::Fulfilled {
            payload,
            meta: RequestMeta::at(timestamp),
        }
    }

    fn term(value: &str, label: &str) -> FilterTerm {
        FilterTerm::new("name", value, label)
    }

    fn add(term: FilterTerm) -> EntityAction {
        EntityAction::FilterSelect {
            item: FilterItem::single(term),
            selected: true,
        }
    }

    fn loaded_state(ids: &[&str]) -> ListState {
        let mut state = ListState::default();
        reduce(&mut state, fulfilled(page_payload(ids, 1), 1));
        state
    }

    #[test]
    fn pending_clears_rows_and_records_stamp() {
        let mut state = loaded_state(&["a", "b"]);
        let outcome = reduce(&mut state, EntityAction::Pending(RequestMeta::at(10)));
        assert_eq!(outcome, ReduceOutcome::Applied);
        assert!(state.rows.is_empty());
        assert!(!state.loaded);
        assert_eq!(state.last_request_timestamp, 10);
    }

    #[test]
    fn fulfilled_merges_rows_and_pagination() {
        let state = loaded_state(&["a", "b", "c"]);
        assert!(state.loaded);
        assert_eq!(state.count, 3);
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.total, 120);
        let ids: Vec<&str> = state.rows.keys().map(String::as_str).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn stale_fulfilment_is_discarded() {
        let mut state = ListState::default();
        reduce(&mut state, EntityAction::Pending(RequestMeta::at(1)));
        reduce(&mut state, EntityAction::Pending(RequestMeta::at(2)));
        reduce(&mut state, fulfilled(page_payload(&["p2"], 2), 2));
        let before = state.clone();
        let outcome = reduce(&mut state, fulfilled(page_payload(&["p1"], 1), 1));
        assert_eq!(outcome, ReduceOutcome::Stale);
        assert_eq!(state, before);
        assert_eq!(state.page, 2);
        assert!(state.rows.contains_key("p2"));
    }

    #[test]
    fn aborted_fulfilment_resets_to_default() {
        let mut state = loaded_state(&["a"]);
        let token = CancellationToken::new();
        token.cancel();
        let outcome = reduce(
            &mut state,
            EntityAction::Fulfilled {
                payload: page_payload(&["b"], 1),
                meta: RequestMeta::at(5).with_cancel(token),
            },
        );
        assert_eq!(outcome, ReduceOutcome::Aborted);
        assert_eq!(state, ListState::default());
    }

    #[test]
    fn degenerate_payload_leaves_state_unchanged() {
        let mut state = loaded_state(&["a"]);
        let before = state.clone();
        let outcome = reduce(
            &mut state,
            fulfilled(
                EntitiesPayload {
                    results: vec![created("z")],
                    total: Some(1),
                    ..EntitiesPayload::default()
                },
                5,
            ),
        );
        assert_eq!(outcome, ReduceOutcome::Ignored);
        assert_eq!(state, before);
    }

    #[test]
    fn explicit_loaded_drops_unconfirmed_rows() {
        let mut state = ListState::default();
        let payload = EntitiesPayload {
            results: vec![created("real"), RowPatch::placeholder("ghost")],
            loaded: Some(true),
            page: Some(1),
            per_page: Some(50),
            ..EntitiesPayload::default()
        };
        reduce(&mut state, fulfilled(payload, 1));
        assert!(state.rows.contains_key("real"));
        assert!(!state.rows.contains_key("ghost"));
    }

    #[test]
    fn absent_pagination_fields_keep_previous_values() {
        let mut state = loaded_state(&["a"]);
        state.sort_by = SortBy::new("display_name", SortDirection::Asc);
        let payload = EntitiesPayload {
            results: vec![created("b")],
            page: Some(3),
            ..EntitiesPayload::default()
        };
        reduce(&mut state, fulfilled(payload, 2));
        assert_eq!(state.page, 3);
        assert_eq!(state.per_page, 50);
        assert_eq!(state.total, 120);
        assert_eq!(state.sort_by.key, "display_name");
        assert!(state.active_filters.is_empty());
    }

    #[test]
    fn overlapping_pages_merge_without_duplicates() {
        let mut state = loaded_state(&["a", "b"]);
        let mut renamed = created("b");
        renamed.display_name = Some("renamed".into());
        let payload = EntitiesPayload {
            results: vec![renamed, created("c")],
            page: Some(1),
            per_page: Some(50),
            ..EntitiesPayload::default()
        };
        reduce(&mut state, fulfilled(payload, 2));
        assert_eq!(state.rows.len(), 3);
        assert_eq!(
            state.rows.get("b").and_then(|row| row.display_name.as_deref()),
            Some("renamed")
        );
    }

    #[test]
    fn merge_preserves_selection_unless_patch_sets_it() {
        let mut state = loaded_state(&["a", "b"]);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::one("a"),
                selected: true,
            },
        );
        reduce(&mut state, fulfilled(page_payload(&["a", "b"], 1), 2));
        assert!(state.rows["a"].selected);
        assert!(!state.rows["b"].selected);
    }

    #[test]
    fn rejection_stores_error_and_keeps_rows() {
        let mut state = loaded_state(&["a", "b"]);
        let error = ErrorInfo {
            kind: "LOAD_ENTITIES".into(),
            message: "boom".into(),
        };
        let outcome = reduce(
            &mut state,
            EntityAction::Rejected {
                error: error.clone(),
                meta: RequestMeta::at(3),
            },
        );
        assert_eq!(outcome, ReduceOutcome::Applied);
        assert_eq!(state.error, Some(error));
        assert_eq!(state.rows.len(), 2);
        assert!(!select_controls_disabled(&state));
        reduce(&mut state, EntityAction::ClearErrors);
        assert!(state.error.is_none());
    }

    #[test]
    fn stale_rejection_is_discarded() {
        let mut state = ListState::default();
        reduce(&mut state, EntityAction::Pending(RequestMeta::at(9)));
        let outcome = reduce(
            &mut state,
            EntityAction::Rejected {
                error: ErrorInfo {
                    kind: "LOAD_ENTITIES".into(),
                    message: "late".into(),
                },
                meta: RequestMeta::at(4),
            },
        );
        assert_eq!(outcome, ReduceOutcome::Stale);
        assert!(state.error.is_none());
    }

    #[test]
    fn failed_first_load_disables_controls() {
        let mut state = ListState::default();
        reduce(&mut state, EntityAction::Pending(RequestMeta::at(1)));
        reduce(
            &mut state,
            EntityAction::Rejected {
                error: ErrorInfo {
                    kind: "LOAD_ENTITIES".into(),
                    message: "down".into(),
                },
                meta: RequestMeta::at(1),
            },
        );
        assert!(select_controls_disabled(&state));
    }

    #[test]
    fn re_adding_a_filter_value_replaces_its_label() {
        let mut state = ListState::default();
        reduce(&mut state, add(term("lorem", "Name")));
        assert_eq!(state.active_filters.len(), 1);
        reduce(&mut state, add(term("lorem", "Renamed")));
        assert_eq!(state.active_filters.len(), 1);
        assert_eq!(state.active_filters[0].label, "Renamed");
    }

    #[test]
    fn re_added_value_moves_to_the_end() {
        let mut state = ListState::default();
        reduce(&mut state, add(term("a", "A")));
        reduce(&mut state, add(term("b", "B")));
        reduce(&mut state, add(term("a", "A2")));
        let values: Vec<&str> = state
            .active_filters
            .iter()
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(values, ["b", "a"]);
    }

    #[test]
    fn grouped_filters_add_and_remove_sub_items() {
        let mut state = ListState::default();
        let parent = FilterTerm::new("operating_system", "RHEL", "RHEL");
        let children = vec![
            FilterTerm::new("operating_system", "RHEL|9.2", "RHEL 9.2"),
            FilterTerm::new("operating_system", "RHEL|8.8", "RHEL 8.8"),
        ];
        reduce(
            &mut state,
            EntityAction::FilterSelect {
                item: FilterItem::grouped(parent.clone(), children.clone()),
                selected: true,
            },
        );
        assert_eq!(state.active_filters.len(), 3);
        reduce(
            &mut state,
            EntityAction::FilterSelect {
                item: FilterItem::grouped(parent, children),
                selected: false,
            },
        );
        assert!(state.active_filters.is_empty());
    }

    #[test]
    fn removal_deletes_only_the_first_match() {
        let mut state = ListState {
            active_filters: vec![term("dup", "one"), term("other", "x"), term("dup", "two")],
            ..ListState::default()
        };
        reduce(
            &mut state,
            EntityAction::FilterSelect {
                item: FilterItem::single(term("dup", "any")),
                selected: false,
            },
        );
        let labels: Vec<&str> = state
            .active_filters
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(labels, ["x", "two"]);
    }

    #[test]
    fn removing_an_absent_value_drops_the_last_filter() {
        let mut state = ListState::default();
        reduce(&mut state, add(term("a", "A")));
        reduce(&mut state, add(term("b", "B")));
        let remove_absent = || EntityAction::FilterSelect {
            item: FilterItem::single(term("zzz", "Z")),
            selected: false,
        };
        reduce(&mut state, remove_absent());
        let values: Vec<&str> = state
            .active_filters
            .iter()
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(values, ["a"]);

        reduce(&mut state, remove_absent());
        reduce(&mut state, remove_absent());
        assert!(state.active_filters.is_empty());
    }

    #[test]
    fn select_entity_with_known_id_touches_one_row() {
        let mut state = loaded_state(&["a", "b", "c"]);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::one("b"),
                selected: true,
            },
        );
        assert_eq!(select_selected_ids(&state), ["b"]);
    }

    #[test]
    fn select_entity_with_unknown_id_marks_every_loaded_row() {
        let mut state = loaded_state(&["a", "b", "c"]);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::one("not-loaded"),
                selected: true,
            },
        );
        assert_eq!(select_selected_ids(&state).len(), 3);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::one("-1"),
                selected: false,
            },
        );
        assert!(select_selected_ids(&state).is_empty());
    }

    #[test]
    fn select_entity_many_applies_in_order() {
        let mut state = loaded_state(&["a", "b", "c"]);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::Many(vec!["a".into(), "c".into()]),
                selected: true,
            },
        );
        assert_eq!(select_selected_ids(&state), ["a", "c"]);
        reduce(
            &mut state,
            EntityAction::SelectEntity {
                target: SelectTarget::All,
                selected: false,
            },
        );
        assert!(select_selected_ids(&state).is_empty());
    }

    #[test]
    fn sort_filters_and_clear_actions() {
        let mut state = loaded_state(&["a"]);
        reduce(&mut state, add(term("lorem", "Name")));
        reduce(
            &mut state,
            EntityAction::ChangeSort(SortBy::new("display_name", SortDirection::Asc)),
        );
        assert_eq!(state.sort_by.direction, SortDirection::Asc);
        reduce(&mut state, EntityAction::ClearFilters);
        assert!(state.active_filters.is_empty());
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.sort_by.key, "display_name");
        reduce(&mut state, EntityAction::ClearEntities);
        assert_eq!(state, ListState::default());
    }

    #[test]
    fn loading_flag_and_show_entities() {
        let mut state = loaded_state(&["a"]);
        reduce(&mut state, EntityAction::EntitiesLoading(true));
        assert!(!state.loaded);
        reduce(&mut state, EntityAction::EntitiesLoading(false));
        assert!(state.loaded);

        state.last_request_timestamp = 99;
        reduce(
            &mut state,
            EntityAction::ShowEntities(EntitiesPayload {
                results: vec![RowPatch::placeholder("draft")],
                ..EntitiesPayload::default()
            }),
        );
        assert!(!state.loaded);
        assert!(state.rows.contains_key("draft"));
    }

    #[test]
    fn page_count_rounds_up() {
        let mut state = ListState {
            total: 101,
            per_page: 50,
            ..ListState::default()
        };
        assert_eq!(select_page_count(&state), 3);
        state.total = 0;
        assert_eq!(select_page_count(&state), 0);
    }
}
