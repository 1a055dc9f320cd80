//! Single-host workflows: field edits, per-host tags, operating system filter values.

pub mod logic;

use async_trait::async_trait;
use inventory_api_models::{HostPatchRequest, HostTagsResponse, OperatingSystemCount, PageResponse};

/// Host endpoints used outside the list load.
#[async_trait]
pub trait HostSource: Send + Sync {
    /// Patch one host.
    async fn patch_host(&self, id: &str, request: &HostPatchRequest) -> anyhow::Result<()>;

    /// Fetch one page of a host's tags, optionally narrowed by a search string.
    async fn get_host_tags(
        &self,
        id: &str,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<HostTagsResponse>;

    /// Operating systems reported across the inventory.
    async fn get_operating_systems(&self) -> anyhow::Result<PageResponse<OperatingSystemCount>>;
}
