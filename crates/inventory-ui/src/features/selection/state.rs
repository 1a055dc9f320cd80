//! Bulk selection that survives pagination.
//!
//! # Design
//! - Enumerated mode holds explicit ids with the metadata bulk actions need.
//! - "All matching" mode is a sentinel over a filter snapshot and its server
//!   total, with explicit exclusions; nothing is materialized until resolved.
//! - Changing the filter invalidates a sentinel selection.

use std::collections::HashSet;

use indexmap::IndexMap;
use inventory_api_models::GroupRef;
use serde::Serialize;

use crate::core::query::NormalizedParams;
use crate::models::Row;

/// Row data kept alongside a selected id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SelectionMeta {
    /// Display name at selection time.
    pub display_name: Option<String>,
    /// Group membership at selection time.
    pub groups: Vec<GroupRef>,
}

impl From<&Row> for SelectionMeta {
    fn from(row: &Row) -> Self {
        Self {
            display_name: row.display_name.clone(),
            groups: row.groups.clone().unwrap_or_default(),
        }
    }
}

impl SelectionMeta {
    /// Name of the real (non-ungrouped) group the row belongs to, if any.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.groups
            .first()
            .filter(|group| !group.ungrouped)
            .map(|group| group.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// Snapshot backing an "all matching" selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchingFilter {
    /// Parameters whose result set is selected.
    pub params: NormalizedParams,
    /// Server-reported number of matching rows.
    pub total: u64,
}

/// Tri-state of a page-level "select all" checkbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSelection {
    /// No row on the page is selected (or the page is empty).
    None,
    /// Some rows on the page are selected.
    Partial,
    /// Every row on the page is selected.
    All,
}

/// Selected rows, independent of which page is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    members: IndexMap<String, SelectionMeta>,
    matching: Option<MatchingFilter>,
    excluded: HashSet<String>,
}

impl SelectionSet {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or unset membership of one row.
    pub fn toggle(&mut self, id: impl Into<String>, meta: SelectionMeta, selected: bool) {
        let id = id.into();
        if selected {
            self.excluded.remove(&id);
            self.members.insert(id, meta);
        } else {
            self.members.shift_remove(&id);
            if self.matching.is_some() {
                self.excluded.insert(id);
            }
        }
    }

    /// Add every row of a page.
    pub fn select_page<'a>(&mut self, rows: impl IntoIterator<Item = &'a Row>) {
        for row in rows {
            self.toggle(row.id.clone(), SelectionMeta::from(row), true);
        }
    }

    /// Remove every id of a page.
    pub fn deselect_page<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.toggle(id.as_ref(), SelectionMeta::default(), false);
        }
    }

    /// Select every row matching `params`, resolved against the server `total`.
    pub fn select_all_matching(&mut self, params: NormalizedParams, total: u64) {
        self.excluded.clear();
        self.matching = Some(MatchingFilter { params, total });
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.members.clear();
        self.excluded.clear();
        self.matching = None;
    }

    /// Keep an "all matching" selection in step with the current filter.
    ///
    /// Returns `true` when the selection was invalidated because the filter changed.
    pub fn reconcile_filter(&mut self, params: &NormalizedParams, total: u64) -> bool {
        let Some(matching) = self.matching.as_mut() else {
            return false;
        };
        if matching.params.same_filter(params) {
            matching.total = total;
            false
        } else {
            self.clear();
            true
        }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        if self.matching.is_some() {
            !self.excluded.contains(id)
        } else {
            self.members.contains_key(id)
        }
    }

    /// True iff every id on the page is selected; an empty page counts as fully selected.
    #[must_use]
    pub fn is_page_fully_selected<I, S>(&self, page_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        page_ids.into_iter().all(|id| self.is_selected(id.as_ref()))
    }

    /// Tri-state for the page checkbox.
    #[must_use]
    pub fn page_state<I, S>(&self, page_ids: I) -> PageSelection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (seen, selected) = page_ids
            .into_iter()
            .fold((0_usize, 0_usize), |(seen, selected), id| {
                (seen + 1, selected + usize::from(self.is_selected(id.as_ref())))
            });
        match (seen, selected) {
            (_, 0) => PageSelection::None,
            (seen, selected) if seen == selected => PageSelection::All,
            _ => PageSelection::Partial,
        }
    }

    /// Number of selected rows; in "all matching" mode this is the server total minus exclusions.
    #[must_use]
    pub fn count_selected(&self) -> u64 {
        self.matching.as_ref().map_or(self.members.len() as u64, |matching| {
            matching.total.saturating_sub(self.excluded.len() as u64)
        })
    }

    /// Whether an "all matching" selection is active.
    #[must_use]
    pub const fn matching(&self) -> Option<&MatchingFilter> {
        self.matching.as_ref()
    }

    /// Ids explicitly excluded from an "all matching" selection.
    #[must_use]
    pub const fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// Explicitly selected rows with their metadata, in selection order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &SelectionMeta)> {
        self.members.iter().map(|(id, meta)| (id.as_str(), meta))
    }

    /// Explicitly selected ids, in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    /// Selected rows that already belong to a group, paired with that group's name.
    #[must_use]
    pub fn already_grouped(&self) -> Vec<(&str, &str)> {
        self.members
            .iter()
            .filter_map(|(id, meta)| meta.group_name().map(|name| (id.as_str(), name)))
            .collect()
    }
}
