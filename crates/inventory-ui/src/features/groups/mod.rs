//! Host group workflows: delete verification, membership checks, row actions.

pub mod actions;
pub mod logic;

use async_trait::async_trait;
use inventory_api_models::{GroupCreateRequest, GroupRecord};

/// Group endpoints used by the workflows.
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Fetch the groups with the given ids.
    async fn get_groups_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<GroupRecord>>;

    /// Create a group, optionally assigning hosts.
    async fn create_group(&self, request: &GroupCreateRequest) -> anyhow::Result<GroupRecord>;

    /// Rename a group.
    async fn rename_group(&self, id: &str, name: &str) -> anyhow::Result<GroupRecord>;

    /// Delete the groups with the given ids.
    async fn delete_groups(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Assign hosts to a group.
    async fn add_hosts(&self, group_id: &str, host_ids: &[String]) -> anyhow::Result<()>;

    /// Remove hosts from a group.
    async fn remove_hosts(&self, group_id: &str, host_ids: &[String]) -> anyhow::Result<()>;
}
