//! Row, filter and sort models shared by the list engine.

use chrono::{DateTime, Utc};
use inventory_api_models::{
    GroupRecord, GroupRef, HostRecord, OrderHow, OperatingSystem, PageResponse, StructuredTag,
};
use serde::{Deserialize, Serialize};

/// Sort direction as held in list state (lowercase on the wire of the store).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    /// Request-side spelling (`order_how`).
    #[must_use]
    pub const fn order_how(self) -> OrderHow {
        match self {
            Self::Asc => OrderHow::Asc,
            Self::Desc => OrderHow::Desc,
        }
    }

    /// Lowercase label used in deep links and state snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<OrderHow> for SortDirection {
    fn from(value: OrderHow) -> Self {
        match value {
            OrderHow::Asc => Self::Asc,
            OrderHow::Desc => Self::Desc,
        }
    }
}

/// Active sort column and direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortBy {
    /// Sort key sent as `order_by`.
    pub key: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortBy {
    /// Build a sort descriptor.
    #[must_use]
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

impl Default for SortBy {
    fn default() -> Self {
        Self::new("updated", SortDirection::Desc)
    }
}

/// One active filter chip. Identity is the `value`, not the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterTerm {
    /// Filter category (e.g. `hostname_or_id`, `group_name`).
    pub key: String,
    /// Filter value; unique across active filters.
    pub value: String,
    /// Display label for the chip.
    pub label: String,
}

impl FilterTerm {
    /// Build a filter term.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A filter selection event payload: a term plus optional grouped sub-items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterItem {
    /// The primary term.
    pub term: FilterTerm,
    /// Sub-items selected or cleared together with the term.
    pub items: Vec<FilterTerm>,
}

impl FilterItem {
    /// A single term without sub-items.
    #[must_use]
    pub fn single(term: FilterTerm) -> Self {
        Self {
            term,
            items: Vec::new(),
        }
    }

    /// A grouped term with sub-items.
    #[must_use]
    pub fn grouped(term: FilterTerm, items: Vec<FilterTerm>) -> Self {
        Self { term, items }
    }
}

/// Error surfaced to the view after a failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Request type tag (e.g. `LOAD_ENTITIES`).
    pub kind: String,
    /// Rendered error chain.
    pub message: String,
}

/// Incoming row shape: identity plus whatever fields the source provided.
///
/// `None` means "not provided" and never clears a value already held by a row.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowPatch {
    /// Stable row identity.
    pub id: String,
    /// Explicit selection flag, when the source sets one.
    pub selected: Option<bool>,
    /// Display name (host display name or group name).
    pub display_name: Option<String>,
    /// Group membership (hosts only).
    pub groups: Option<Vec<GroupRef>>,
    /// Operating system (hosts only).
    pub operating_system: Option<OperatingSystem>,
    /// Tags (hosts only, when requested).
    pub tags: Option<Vec<StructuredTag>>,
    /// Number of hosts (groups only).
    pub host_count: Option<u64>,
    /// Creation timestamp; rows without one were never confirmed server-side.
    pub created: Option<DateTime<Utc>>,
    /// Last update / check-in timestamp.
    pub updated: Option<DateTime<Utc>>,
    /// Stale threshold (hosts only).
    pub stale_timestamp: Option<DateTime<Utc>>,
    /// Cull threshold (hosts only).
    pub culled_timestamp: Option<DateTime<Utc>>,
}

impl RowPatch {
    /// A placeholder carrying nothing but the id.
    #[must_use]
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Overlay `other` onto `self`; fields present in `other` win.
    #[must_use]
    pub fn overlay(mut self, other: Self) -> Self {
        self.selected = other.selected.or(self.selected);
        self.display_name = other.display_name.or(self.display_name);
        self.groups = other.groups.or(self.groups);
        self.operating_system = other.operating_system.or(self.operating_system);
        self.tags = other.tags.or(self.tags);
        self.host_count = other.host_count.or(self.host_count);
        self.created = other.created.or(self.created);
        self.updated = other.updated.or(self.updated);
        self.stale_timestamp = other.stale_timestamp.or(self.stale_timestamp);
        self.culled_timestamp = other.culled_timestamp.or(self.culled_timestamp);
        self
    }
}

impl From<HostRecord> for RowPatch {
    fn from(value: HostRecord) -> Self {
        Self {
            id: value.id,
            selected: None,
            display_name: value.display_name,
            groups: value.groups,
            operating_system: value
                .system_profile
                .and_then(|profile| profile.operating_system),
            tags: value.tags,
            host_count: None,
            created: value.created,
            updated: value.updated,
            stale_timestamp: value.stale_timestamp,
            culled_timestamp: value.culled_timestamp,
        }
    }
}

impl From<GroupRecord> for RowPatch {
    fn from(value: GroupRecord) -> Self {
        Self {
            id: value.id,
            selected: None,
            display_name: Some(value.name),
            groups: None,
            operating_system: None,
            tags: None,
            host_count: Some(value.host_count),
            created: value.created,
            updated: value.updated,
            stale_timestamp: None,
            culled_timestamp: None,
        }
    }
}

/// Page shape returned by entity sources.
pub type EntityPage = PageResponse<RowPatch>;

/// Convert a typed API page into an entity page.
#[must_use]
pub fn into_entity_page<T: Into<RowPatch>>(page: PageResponse<T>) -> EntityPage {
    PageResponse {
        results: page.results.into_iter().map(Into::into).collect(),
        page: page.page,
        per_page: page.per_page,
        count: page.count,
        total: page.total,
    }
}

/// One inventory item (host or group) as held in list state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identity.
    pub id: String,
    /// Whether the row is marked for a bulk action.
    pub selected: bool,
    /// Display name.
    pub display_name: Option<String>,
    /// Group membership (hosts only).
    pub groups: Option<Vec<GroupRef>>,
    /// Operating system (hosts only).
    pub operating_system: Option<OperatingSystem>,
    /// Tags (hosts only).
    pub tags: Option<Vec<StructuredTag>>,
    /// Number of hosts (groups only).
    pub host_count: Option<u64>,
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated: Option<DateTime<Utc>>,
    /// Stale threshold.
    pub stale_timestamp: Option<DateTime<Utc>>,
    /// Cull threshold.
    pub culled_timestamp: Option<DateTime<Utc>>,
}

impl From<RowPatch> for Row {
    fn from(patch: RowPatch) -> Self {
        Self {
            id: patch.id,
            selected: patch.selected.unwrap_or(false),
            display_name: patch.display_name,
            groups: patch.groups,
            operating_system: patch.operating_system,
            tags: patch.tags,
            host_count: patch.host_count,
            created: patch.created,
            updated: patch.updated,
            stale_timestamp: patch.stale_timestamp,
            culled_timestamp: patch.culled_timestamp,
        }
    }
}

impl Row {
    /// Merge an incoming patch; present fields overwrite, absent ones are kept.
    pub fn apply(&mut self, patch: RowPatch) {
        if let Some(selected) = patch.selected {
            self.selected = selected;
        }
        if patch.display_name.is_some() {
            self.display_name = patch.display_name;
        }
        if patch.groups.is_some() {
            self.groups = patch.groups;
        }
        if patch.operating_system.is_some() {
            self.operating_system = patch.operating_system;
        }
        if patch.tags.is_some() {
            self.tags = patch.tags;
        }
        if patch.host_count.is_some() {
            self.host_count = patch.host_count;
        }
        if patch.created.is_some() {
            self.created = patch.created;
        }
        if patch.updated.is_some() {
            self.updated = patch.updated;
        }
        if patch.stale_timestamp.is_some() {
            self.stale_timestamp = patch.stale_timestamp;
        }
        if patch.culled_timestamp.is_some() {
            self.culled_timestamp = patch.culled_timestamp;
        }
    }

    /// First group the row belongs to; only one is supported.
    #[must_use]
    pub fn primary_group(&self) -> Option<&GroupRef> {
        self.groups.as_ref().and_then(|groups| groups.first())
    }

    /// Name of the primary group, ignoring blank names.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.primary_group()
            .map(|group| group.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Operating system label, or an en dash when unknown.
    #[must_use]
    pub fn os_label(&self) -> String {
        self.operating_system
            .as_ref()
            .map_or_else(|| "-".to_string(), OperatingSystem::label)
    }

    /// Whether the server confirmed the row exists.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created.is_some()
    }
}
