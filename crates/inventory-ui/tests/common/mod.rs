#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use inventory_api_models::{GroupCreateRequest, GroupRecord, PageResponse};
use inventory_test_support::fixtures::{group, host_ids};
use inventory_test_support::gate::ReleaseGate;
use inventory_ui::features::groups::GroupSource;
use inventory_ui::models::{EntityPage, RowPatch};
use inventory_ui::{EntitySource, NormalizedParams};

/// Host list whose pages complete only when the test releases `page-{n}`.
pub struct GatedHosts {
    pub gate: ReleaseGate,
    pub total: u32,
    pub failing_pages: Mutex<HashSet<u32>>,
}

impl GatedHosts {
    pub fn new(total: u32) -> Self {
        Self {
            gate: ReleaseGate::new(),
            total,
            failing_pages: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn release_page(&self, page: u32) {
        self.gate.release(&format!("page-{page}"));
    }
}

#[async_trait]
impl EntitySource for GatedHosts {
    async fn get_entities(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        _show_tags: bool,
    ) -> anyhow::Result<EntityPage> {
        self.gate.wait(&format!("page-{}", params.page)).await;
        if self.failing_pages.lock().unwrap().contains(&params.page) {
            anyhow::bail!("page {} unavailable", params.page);
        }
        let all = host_ids(1..=self.total);
        let rows: Vec<String> = if ids.is_empty() {
            let start = ((params.page - 1) * params.per_page) as usize;
            all.into_iter()
                .skip(start)
                .take(params.per_page as usize)
                .collect()
        } else {
            all.into_iter().filter(|id| ids.contains(id)).collect()
        };
        Ok(PageResponse {
            results: rows
                .into_iter()
                .map(|id| RowPatch::from(inventory_test_support::fixtures::host(&id)))
                .collect(),
            page: Some(params.page),
            per_page: Some(params.per_page),
            count: None,
            total: Some(u64::from(self.total)),
        })
    }
}

/// Groups looked up in chunks; the chunk containing `fail_on` fails.
pub struct ChunkedGroups {
    pub host_counts: Vec<u64>,
    pub fail_on: Option<String>,
    pub lookups: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
}

impl ChunkedGroups {
    pub fn empty(count: usize) -> Self {
        Self {
            host_counts: vec![0; count],
            fail_on: None,
            lookups: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        (1..=self.host_counts.len())
            .map(|n| format!("group-{n:03}"))
            .collect()
    }
}

#[async_trait]
impl GroupSource for ChunkedGroups {
    async fn get_groups_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<GroupRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(fail_on) = &self.fail_on
            && ids.contains(fail_on)
        {
            anyhow::bail!("lookup failed for {fail_on}");
        }
        Ok(ids
            .iter()
            .map(|id| {
                let index: usize = id.trim_start_matches("group-").parse().unwrap_or(1);
                group(id, &format!("name-{index}"), self.host_counts[index - 1])
            })
            .collect())
    }

    async fn create_group(&self, request: &GroupCreateRequest) -> anyhow::Result<GroupRecord> {
        Ok(group("group-new", &request.name, request.host_ids.len() as u64))
    }

    async fn rename_group(&self, id: &str, name: &str) -> anyhow::Result<GroupRecord> {
        Ok(group(id, name, 0))
    }

    async fn delete_groups(&self, ids: &[String]) -> anyhow::Result<()> {
        self.deleted.lock().unwrap().extend(ids.iter().cloned());
        Ok(())
    }

    async fn add_hosts(&self, _group_id: &str, _host_ids: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove_hosts(&self, _group_id: &str, _host_ids: &[String]) -> anyhow::Result<()> {
        Ok(())
    }
}
