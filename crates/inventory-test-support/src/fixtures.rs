//! Record builders shared by engine and CLI tests.

use chrono::{DateTime, TimeZone, Utc};
use inventory_api_models::{
    GroupRecord, GroupRef, HostRecord, OperatingSystem, PageResponse, StructuredTag, SystemProfile,
    TagCount,
};

/// Deterministic timestamp `secs` seconds after 2024-01-01T00:00:00Z.
#[must_use]
pub fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0)
        .single()
        .unwrap_or_default()
}

/// Zero-padded host identifiers `host-001..` for the given range.
#[must_use]
pub fn host_ids(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|n| format!("host-{n:03}")).collect()
}

/// A fully populated, ungrouped host as the server would return it.
#[must_use]
pub fn host(id: &str) -> HostRecord {
    HostRecord {
        id: id.to_string(),
        display_name: Some(format!("{id}.example.com")),
        groups: Some(Vec::new()),
        system_profile: Some(SystemProfile {
            operating_system: Some(OperatingSystem {
                name: "RHEL".into(),
                major: 9,
                minor: 2,
            }),
        }),
        tags: None,
        created: Some(timestamp(0)),
        updated: Some(timestamp(3_600)),
        stale_timestamp: Some(timestamp(86_400)),
        culled_timestamp: Some(timestamp(1_209_600)),
    }
}

/// A host assigned to the given group.
#[must_use]
pub fn grouped_host(id: &str, group_id: &str, group_name: &str) -> HostRecord {
    HostRecord {
        groups: Some(vec![GroupRef {
            id: group_id.to_string(),
            name: group_name.to_string(),
            ungrouped: false,
        }]),
        ..host(id)
    }
}

/// A host group record.
#[must_use]
pub fn group(id: &str, name: &str, host_count: u64) -> GroupRecord {
    GroupRecord {
        id: id.to_string(),
        name: name.to_string(),
        host_count,
        ungrouped: false,
        created: Some(timestamp(0)),
        updated: Some(timestamp(60)),
    }
}

/// A tag count entry.
#[must_use]
pub fn tag(namespace: &str, key: &str, value: &str, count: u64) -> TagCount {
    TagCount {
        tag: StructuredTag {
            namespace: Some(namespace.to_string()),
            key: key.to_string(),
            value: Some(value.to_string()),
        },
        count,
    }
}

/// Wrap records into a fully populated page response.
#[must_use]
pub fn page<T>(results: Vec<T>, page: u32, per_page: u32, total: u64) -> PageResponse<T> {
    let count = u64::try_from(results.len()).unwrap_or(u64::MAX);
    PageResponse {
        results,
        page: Some(page),
        per_page: Some(per_page),
        count: Some(count),
        total: Some(total),
    }
}
