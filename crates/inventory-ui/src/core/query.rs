//! Query builder: turns filter/sort/pagination intent into request parameters.
//!
//! # Design
//! - Pure and total: malformed input is coerced to defaults, never rejected.
//! - Hidden filter categories are masked here so no caller can leak a stale value.
//! - Deep-link parsing lives next to the builder so URL state and request state agree.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::models::{FilterTerm, SortBy, SortDirection};

/// Page used when none (or zero) is requested.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when none (or zero) is requested.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Structured filter categories that a view may hide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FilterCategory {
    /// Staleness (`fresh`, `stale_warning`, `stale`).
    Stale,
    /// Last check-in window.
    LastSeen,
    /// Reporter the host registered with.
    RegisteredWith,
    /// Operating system version.
    OperatingSystem,
    /// Host group membership.
    HostGroup,
}

impl FilterCategory {
    /// All categories in a stable order.
    pub const ALL: [Self; 5] = [
        Self::Stale,
        Self::LastSeen,
        Self::RegisteredWith,
        Self::OperatingSystem,
        Self::HostGroup,
    ];

    /// Name used in configuration and filter term keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stale => "stale",
            Self::LastSeen => "last_seen",
            Self::RegisteredWith => "registered_with",
            Self::OperatingSystem => "operating_system",
            Self::HostGroup => "host_group",
        }
    }

    /// Parse a category name; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

/// Per-view map of disabled filter categories.
///
/// A category is disabled when its flag is explicitly `true`, or when `all`
/// is set and the category was not explicitly re-enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenFilters {
    /// Hide every category unless explicitly re-enabled.
    pub all: bool,
    /// Explicit per-category overrides.
    pub flags: BTreeMap<FilterCategory, bool>,
}

impl HiddenFilters {
    /// Hide a single category.
    #[must_use]
    pub fn hide(mut self, category: FilterCategory) -> Self {
        self.flags.insert(category, true);
        self
    }

    /// Explicitly keep a category visible, even with `all` set.
    #[must_use]
    pub fn show(mut self, category: FilterCategory) -> Self {
        self.flags.insert(category, false);
        self
    }

    /// Whether the given category is disabled.
    #[must_use]
    pub fn is_disabled(&self, category: FilterCategory) -> bool {
        self.flags.get(&category).copied().unwrap_or(self.all)
    }
}

/// Structured request filters derived from the active filter terms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawFilters {
    /// Free-text host search.
    pub hostname_or_id: Option<String>,
    /// Free-text group name search.
    pub name: Option<String>,
    /// Staleness states.
    pub stale: Vec<String>,
    /// Last check-in window token.
    pub last_seen: Option<String>,
    /// Reporters.
    pub registered_with: Vec<String>,
    /// Operating system versions.
    pub operating_system: Vec<String>,
    /// Host group names.
    pub host_group: Vec<String>,
}

impl RawFilters {
    /// Fold filter terms into structured filters; unknown keys are ignored.
    #[must_use]
    pub fn from_terms(terms: &[FilterTerm]) -> Self {
        terms.iter().fold(Self::default(), |mut acc, term| {
            let value = term.value.trim();
            if value.is_empty() {
                return acc;
            }
            match term.key.as_str() {
                "hostname_or_id" => acc.hostname_or_id = Some(value.to_string()),
                "name" => acc.name = Some(value.to_string()),
                "stale" | "staleness" => acc.stale.push(value.to_string()),
                "last_seen" => acc.last_seen = Some(value.to_string()),
                "registered_with" => acc.registered_with.push(value.to_string()),
                "operating_system" => acc.operating_system.push(value.to_string()),
                "host_group" | "group_name" => acc.host_group.push(value.to_string()),
                _ => {}
            }
            acc
        })
    }

    fn mask(mut self, hidden: &HiddenFilters) -> Self {
        if hidden.is_disabled(FilterCategory::Stale) {
            self.stale.clear();
        }
        if hidden.is_disabled(FilterCategory::LastSeen) {
            self.last_seen = None;
        }
        if hidden.is_disabled(FilterCategory::RegisteredWith) {
            self.registered_with.clear();
        }
        if hidden.is_disabled(FilterCategory::OperatingSystem) {
            self.operating_system.clear();
        }
        if hidden.is_disabled(FilterCategory::HostGroup) {
            self.host_group.clear();
        }
        self
    }
}

/// Requested pagination; missing or zero values fall back to defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Requested 1-based page.
    pub page: Option<u32>,
    /// Requested page size.
    pub per_page: Option<u32>,
}

/// Normalized request parameters handed to the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizedParams {
    /// Active filter terms as selected by the user.
    pub terms: Vec<FilterTerm>,
    /// Structured filters after hidden categories were masked.
    pub filters: RawFilters,
    /// Sort column and direction.
    pub sort: SortBy,
    /// 1-based page.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

impl Default for NormalizedParams {
    fn default() -> Self {
        build(&[], None, Pagination::default(), &HiddenFilters::default())
    }
}

/// Build normalized request parameters. Pure and total.
#[must_use]
pub fn build(
    terms: &[FilterTerm],
    sort: Option<&SortBy>,
    pagination: Pagination,
    hidden: &HiddenFilters,
) -> NormalizedParams {
    let sort = sort
        .filter(|sort| !sort.key.trim().is_empty())
        .cloned()
        .unwrap_or_default();
    NormalizedParams {
        terms: terms.to_vec(),
        filters: RawFilters::from_terms(terms).mask(hidden),
        sort,
        page: pagination
            .page
            .filter(|page| *page > 0)
            .unwrap_or(DEFAULT_PAGE),
        per_page: pagination
            .per_page
            .filter(|per_page| *per_page > 0)
            .unwrap_or(DEFAULT_PER_PAGE),
    }
}

impl NormalizedParams {
    /// Same filters and sort, different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(DEFAULT_PAGE),
            ..self.clone()
        }
    }

    /// Whether two parameter sets select the same rows (ignoring pagination and sort).
    #[must_use]
    pub fn same_filter(&self, other: &Self) -> bool {
        self.filters == other.filters
    }

    /// REST query parameters in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("order_by", self.sort.key.clone()),
            ("order_how", self.sort.direction.order_how().as_str().to_string()),
        ];
        let filters = &self.filters;
        if let Some(search) = &filters.hostname_or_id {
            pairs.push(("hostname_or_id", search.clone()));
        }
        if let Some(name) = &filters.name {
            pairs.push(("name", name.clone()));
        }
        pairs.extend(filters.stale.iter().map(|v| ("staleness", v.clone())));
        if let Some(window) = &filters.last_seen {
            pairs.push(("last_seen", window.clone()));
        }
        pairs.extend(
            filters
                .registered_with
                .iter()
                .map(|v| ("registered_with", v.clone())),
        );
        pairs.extend(
            filters
                .operating_system
                .iter()
                .map(|v| ("operating_system", v.clone())),
        );
        pairs.extend(filters.host_group.iter().map(|v| ("group_name", v.clone())));
        pairs
    }

    /// URL-encoded query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        encode_pairs(self.query_pairs().iter().map(|(k, v)| (*k, v.as_str())))
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        let _ = write!(out, "{key}={}", urlencoding::encode(value));
    }
    out
}

/// List state mirrored in the address bar for deep links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// `page`.
    pub page: Option<u32>,
    /// `per_page`.
    pub per_page: Option<u32>,
    /// `name` (group search).
    pub name: Option<String>,
    /// `hostname_or_id` (host search).
    pub hostname_or_id: Option<String>,
    /// `order_by`.
    pub order_by: Option<String>,
    /// `order_how`.
    pub order_how: Option<SortDirection>,
}

impl ListQuery {
    /// Parse a query string, tolerating a leading `?` and ignoring garbage.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            let value = decode_component(raw);
            if value.is_empty() {
                continue;
            }
            match key {
                "page" => parsed.page = value.parse().ok().filter(|page| *page > 0),
                "per_page" => parsed.per_page = value.parse().ok().filter(|size| *size > 0),
                "name" => parsed.name = Some(value),
                "hostname_or_id" => parsed.hostname_or_id = Some(value),
                "order_by" => parsed.order_by = Some(value),
                "order_how" => {
                    parsed.order_how = inventory_api_models::OrderHow::parse(&value)
                        .map(SortDirection::from);
                }
                _ => {}
            }
        }
        parsed
    }

    /// Mirror normalized params back into a deep link, omitting defaults.
    #[must_use]
    pub fn from_params(params: &NormalizedParams) -> Self {
        let default_sort = SortBy::default();
        let sort_is_default = params.sort == default_sort;
        Self {
            page: Some(params.page).filter(|page| *page != DEFAULT_PAGE),
            per_page: Some(params.per_page).filter(|size| *size != DEFAULT_PER_PAGE),
            name: params.filters.name.clone(),
            hostname_or_id: params.filters.hostname_or_id.clone(),
            order_by: (!sort_is_default).then(|| params.sort.key.clone()),
            order_how: (!sort_is_default).then_some(params.sort.direction),
        }
    }

    /// Filter terms implied by the deep link.
    #[must_use]
    pub fn terms(&self) -> Vec<FilterTerm> {
        let mut terms = Vec::new();
        if let Some(name) = &self.name {
            terms.push(FilterTerm::new("name", name.clone(), "Name"));
        }
        if let Some(search) = &self.hostname_or_id {
            terms.push(FilterTerm::new("hostname_or_id", search.clone(), "Name"));
        }
        terms
    }

    /// Sort implied by the deep link, if any.
    #[must_use]
    pub fn sort(&self) -> Option<SortBy> {
        self.order_by
            .as_ref()
            .map(|key| SortBy::new(key.clone(), self.order_how.unwrap_or_default()))
    }

    /// Pagination implied by the deep link.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Encode back to a query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let page = self.page.map(|page| page.to_string());
        let per_page = self.per_page.map(|size| size.to_string());
        let pairs = [
            ("per_page", per_page.as_deref()),
            ("page", page.as_deref()),
            ("name", self.name.as_deref()),
            ("hostname_or_id", self.hostname_or_id.as_deref()),
            ("order_by", self.order_by.as_deref()),
            ("order_how", self.order_how.map(SortDirection::as_str)),
        ];
        encode_pairs(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        )
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |value| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(key: &str, value: &str) -> FilterTerm {
        FilterTerm::new(key, value, key)
    }

    #[test]
    fn defaults_apply_when_intent_is_missing() {
        let params = build(&[], None, Pagination::default(), &HiddenFilters::default());
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 50);
        assert_eq!(params.sort, SortBy::new("updated", SortDirection::Desc));
    }

    #[test]
    fn zero_pagination_and_blank_sort_are_coerced() {
        let blank = SortBy::new("  ", SortDirection::Asc);
        let params = build(
            &[],
            Some(&blank),
            Pagination {
                page: Some(0),
                per_page: Some(0),
            },
            &HiddenFilters::default(),
        );
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.per_page, DEFAULT_PER_PAGE);
        assert_eq!(params.sort.key, "updated");
    }

    #[test]
    fn hidden_categories_are_forced_absent() {
        let terms = vec![
            term("stale", "stale"),
            term("group_name", "alpha"),
            term("operating_system", "RHEL|9.2"),
            term("hostname_or_id", "web"),
        ];
        let hidden = HiddenFilters::default()
            .hide(FilterCategory::Stale)
            .hide(FilterCategory::HostGroup);
        let params = build(&terms, None, Pagination::default(), &hidden);
        assert!(params.filters.stale.is_empty());
        assert!(params.filters.host_group.is_empty());
        assert_eq!(params.filters.operating_system, vec!["RHEL|9.2"]);
        assert_eq!(params.filters.hostname_or_id.as_deref(), Some("web"));
        assert_eq!(params.terms.len(), 4);
    }

    #[test]
    fn hide_all_respects_explicit_reenable() {
        let hidden = HiddenFilters {
            all: true,
            ..HiddenFilters::default()
        }
        .show(FilterCategory::OperatingSystem);
        assert!(hidden.is_disabled(FilterCategory::Stale));
        assert!(hidden.is_disabled(FilterCategory::LastSeen));
        assert!(!hidden.is_disabled(FilterCategory::OperatingSystem));
    }

    #[test]
    fn query_pairs_render_wire_names() {
        let terms = vec![term("group_name", "alpha"), term("group_name", "beta")];
        let sort = SortBy::new("display_name", SortDirection::Asc);
        let params = build(
            &terms,
            Some(&sort),
            Pagination {
                page: Some(2),
                per_page: Some(10),
            },
            &HiddenFilters::default(),
        );
        let query = params.to_query_string();
        assert_eq!(
            query,
            "page=2&per_page=10&order_by=display_name&order_how=ASC&group_name=alpha&group_name=beta"
        );
    }

    #[test]
    fn deep_link_round_trips_through_params() {
        let link = ListQuery::parse(
            "?per_page=10&page=2&name=lorem%20ipsum&order_by=host_count&order_how=desc",
        );
        assert_eq!(link.per_page, Some(10));
        assert_eq!(link.page, Some(2));
        assert_eq!(link.name.as_deref(), Some("lorem ipsum"));
        let params = build(
            &link.terms(),
            link.sort().as_ref(),
            link.pagination(),
            &HiddenFilters::default(),
        );
        assert_eq!(params.sort, SortBy::new("host_count", SortDirection::Desc));
        assert_eq!(params.filters.name.as_deref(), Some("lorem ipsum"));
        let mirrored = ListQuery::from_params(&params);
        assert_eq!(mirrored, link);
        assert_eq!(
            mirrored.to_query_string(),
            "per_page=10&page=2&name=lorem%20ipsum&order_by=host_count&order_how=desc"
        );
    }

    #[test]
    fn deep_link_ignores_garbage() {
        let link = ListQuery::parse("page=abc&per_page=0&bogus&order_how=up&=x");
        assert_eq!(link, ListQuery::default());
        assert_eq!(link.to_query_string(), "");
    }
}
