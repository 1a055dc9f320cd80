#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the inventory REST API.
//!
//! These types are re-used by the list engine and the CLI for request/response
//! encoding so the wire contract stays in one place. Server fields are optional
//! wherever the API is allowed to omit them; the list engine relies on that to
//! tell "absent" apart from "empty".
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
}

/// Sort direction as spelled on the wire (`order_how`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderHow {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl OrderHow {
    /// Wire representation used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse a direction case-insensitively; unknown input yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

/// Reference to the group a host belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef {
    /// Group identifier.
    pub id: String,
    /// Group display name.
    pub name: String,
    #[serde(default)]
    /// Marks the implicit "ungrouped hosts" workspace.
    pub ungrouped: bool,
}

/// Operating system reported in a host's system profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingSystem {
    /// Distribution name (e.g. `RHEL`, `CentOS Linux`).
    pub name: String,
    /// Major release number.
    pub major: u32,
    /// Minor release number.
    pub minor: u32,
}

impl OperatingSystem {
    /// Human-friendly label such as `RHEL 9.2`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}.{}", self.name, self.major, self.minor)
    }
}

/// Subset of the host system profile consumed by list views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SystemProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Reported operating system, if any.
    pub operating_system: Option<OperatingSystem>,
}

/// Structured `namespace/key=value` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StructuredTag {
    #[serde(default)]
    /// Tag namespace; `None` for the default namespace.
    pub namespace: Option<String>,
    /// Tag key.
    pub key: String,
    #[serde(default)]
    /// Optional tag value.
    pub value: Option<String>,
}

impl StructuredTag {
    /// Render as `namespace/key=value`, omitting absent parts.
    #[must_use]
    pub fn label(&self) -> String {
        let mut out = String::new();
        if let Some(namespace) = &self.namespace {
            out.push_str(namespace);
            out.push('/');
        }
        out.push_str(&self.key);
        if let Some(value) = &self.value {
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

/// Host record as returned by `GET /hosts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostRecord {
    /// Stable host identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name shown in tables.
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Groups the host belongs to (at most one today).
    pub groups: Option<Vec<GroupRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// System profile subset.
    pub system_profile: Option<SystemProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Tags attached to the host when requested.
    pub tags: Option<Vec<StructuredTag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Last check-in timestamp.
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Time after which the host is considered stale.
    pub stale_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Time after which the host is culled.
    pub culled_timestamp: Option<DateTime<Utc>>,
}

/// Host group record as returned by `GET /groups`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRecord {
    /// Stable group identifier.
    pub id: String,
    /// Group name.
    pub name: String,
    #[serde(default)]
    /// Number of hosts assigned to the group.
    pub host_count: u64,
    #[serde(default)]
    /// Marks the implicit "ungrouped hosts" workspace.
    pub ungrouped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Last modification timestamp.
    pub updated: Option<DateTime<Utc>>,
}

/// One page of a collection endpoint.
///
/// Pagination fields stay optional: a server that omits them must not reset
/// values the client already holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    /// Records on this page, in server order.
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// 1-based page number.
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Page size used by the server.
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of records on this page.
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of records matching the query across all pages.
    pub total: Option<u64>,
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            page: None,
            per_page: None,
            count: None,
            total: None,
        }
    }
}

/// Tag plus the number of hosts carrying it (`GET /tags`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    /// The tag itself.
    pub tag: StructuredTag,
    #[serde(default)]
    /// Number of hosts carrying the tag.
    pub count: u64,
}

/// Body for `POST /groups`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupCreateRequest {
    /// Name of the new group.
    pub name: String,
    #[serde(default)]
    /// Hosts to assign on creation.
    pub host_ids: Vec<String>,
}

/// Body for `PATCH /groups/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// New group name.
    pub name: Option<String>,
}

/// Body for `PATCH /hosts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// New display name.
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// New Ansible hostname.
    pub ansible_host: Option<String>,
}

/// Tags keyed by host id (`GET /hosts/{ids}/tags`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostTagsResponse {
    #[serde(default)]
    /// Tags per requested host.
    pub results: BTreeMap<String, Vec<StructuredTag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// 1-based page number.
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Page size used by the server.
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of hosts in `results`.
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of tags matching the query across all pages.
    pub total: Option<u64>,
}

/// Operating system plus the number of hosts reporting it
/// (`GET /system_profile/operating_system`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingSystemCount {
    /// Reported operating system.
    pub value: OperatingSystem,
    #[serde(default)]
    /// Hosts reporting it.
    pub count: u64,
}

/// Bare list of host identifiers used by group membership endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct HostIdList(pub Vec<String>);
