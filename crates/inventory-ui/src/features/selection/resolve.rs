//! Materialize a selection into concrete ids for a bulk action.

use std::collections::HashSet;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};
use crate::features::selection::state::SelectionSet;
use crate::services::dispatcher::EntitySource;

/// Resolve every selected id.
///
/// Enumerated selections return their ids as-is. "All matching" selections
/// fetch every page of the filter snapshot concurrently with `per_page` rows
/// each, then drop excluded ids; server order is kept and duplicates removed.
///
/// # Errors
/// Returns [`DispatchError::LoadEntities`] when any page fails to load.
pub async fn resolve<S>(
    selection: &SelectionSet,
    source: &S,
    per_page: u32,
) -> DispatchResult<Vec<String>>
where
    S: EntitySource + ?Sized,
{
    let Some(matching) = selection.matching() else {
        return Ok(selection.ids());
    };
    let per_page = per_page.max(1);
    let pages = u32::try_from(matching.total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
    debug!(pages, per_page, total = matching.total, "resolving selection");
    let requests = (1..=pages).map(|page| {
        let mut params = matching.params.with_page(page);
        params.per_page = per_page;
        async move { source.get_entities(&[], &params, false).await }
    });
    let loaded = try_join_all(requests)
        .await
        .map_err(|original| DispatchError::LoadEntities { original })?;

    let mut seen = HashSet::new();
    Ok(loaded
        .into_iter()
        .flat_map(|page| page.results)
        .map(|row| row.id)
        .filter(|id| !selection.excluded().contains(id) && seen.insert(id.clone()))
        .collect())
}
