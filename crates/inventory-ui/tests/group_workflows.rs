mod common;

use std::sync::atomic::Ordering;

use common::ChunkedGroups;
use inventory_ui::BatchError;
use inventory_ui::features::groups::GroupSource;
use inventory_ui::features::groups::logic::{
    DeleteVerdict, delete_messages, verify_groups_deletable,
};

#[tokio::test]
async fn empty_groups_across_three_chunks_are_deletable() -> anyhow::Result<()> {
    let groups = ChunkedGroups::empty(137);
    let ids = groups.ids();
    let verdict = verify_groups_deletable(&groups, &ids).await?;
    assert_eq!(groups.lookups.load(Ordering::SeqCst), 3);
    assert!(verdict.is_deletable());
    assert_eq!(verdict.groups().len(), 137);
    let fetched: Vec<&str> = verdict.groups().iter().map(|g| g.id.as_str()).collect();
    let expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(fetched, expected);
    assert_eq!(verdict.title(), "Delete workspaces?");

    groups.delete_groups(&ids).await?;
    assert_eq!(groups.deleted.lock().unwrap().len(), 137);
    assert_eq!(delete_messages(ids.len(), "").success, "137 workspaces deleted");
    Ok(())
}

#[tokio::test]
async fn one_non_empty_group_blocks_deletion() -> anyhow::Result<()> {
    let mut groups = ChunkedGroups::empty(60);
    groups.host_counts[55] = 2;
    let ids = groups.ids();
    let verdict = verify_groups_deletable(&groups, &ids).await?;
    assert!(matches!(verdict, DeleteVerdict::NotEmpty(_)));
    assert_eq!(verdict.title(), "Cannot delete workspaces at this time");
    Ok(())
}

#[tokio::test]
async fn failing_middle_chunk_fails_verification() {
    let mut groups = ChunkedGroups::empty(137);
    groups.fail_on = Some("group-075".to_string());
    let ids = groups.ids();
    let result = verify_groups_deletable(&groups, &ids).await;
    let Err(BatchError::Chunk { chunk, chunks, .. }) = result else {
        panic!("verification should fail");
    };
    assert_eq!((chunk, chunks), (2, 3));
}

#[tokio::test]
async fn no_ids_means_nothing_to_check() -> anyhow::Result<()> {
    let groups = ChunkedGroups::empty(0);
    let verdict = verify_groups_deletable(&groups, &[]).await?;
    assert!(verdict.is_deletable());
    assert_eq!(groups.lookups.load(Ordering::SeqCst), 0);
    Ok(())
}
