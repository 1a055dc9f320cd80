//! Command handlers grouped by concern, plus the list plumbing they share.

pub(crate) mod groups;
pub(crate) mod hosts;
pub(crate) mod tags;

use anyhow::anyhow;
use inventory_ui::core::query::FilterCategory;
use inventory_ui::models::{FilterItem, FilterTerm, SortBy, SortDirection};
use inventory_ui::{
    Dispatcher, EntityAction, EntitySource, HiddenFilters, ListQuery, ListStore,
    NormalizedParams, Pagination, ReduceOutcome,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{ListArgs, OrderArg};
use crate::client::{CliError, CliResult};

/// Seed a store from the deep link and flags, and derive the request params.
pub(crate) fn prepare_list(args: &ListArgs) -> CliResult<(ListStore, NormalizedParams)> {
    let link = args
        .query
        .as_deref()
        .map(ListQuery::parse)
        .unwrap_or_default();

    let mut store = ListStore::new();
    let mut terms = link.terms();
    for raw in &args.filters {
        terms.push(parse_filter(raw)?);
    }
    for term in terms {
        store.apply(EntityAction::FilterSelect {
            item: FilterItem::single(term),
            selected: true,
        });
    }
    if let Some(sort) = sort_from(args, &link) {
        store.apply(EntityAction::ChangeSort(sort));
    }

    let linked = link.pagination();
    let pagination = Pagination {
        page: args.page.or(linked.page),
        per_page: args.per_page.or(linked.per_page),
    };
    let params = store.params(pagination, &hidden_filters(args)?);
    debug!(query = %params.to_query_string(), "list params prepared");
    Ok((store, params))
}

/// Run one load to completion; Ctrl-C cancels the in-flight request.
pub(crate) async fn load_list<S>(
    store: &mut ListStore,
    dispatcher: &Dispatcher<S>,
    ids: &[String],
    params: &NormalizedParams,
) -> CliResult<()>
where
    S: EntitySource,
{
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let outcome = store.load(dispatcher, ids, params, Some(cancel)).await;
    interrupt.abort();

    if outcome == ReduceOutcome::Aborted {
        return Err(CliError::failure(anyhow!("request cancelled")));
    }
    match &store.state().error {
        Some(error) => Err(CliError::failure(anyhow!(error.message.clone()))),
        None => Ok(()),
    }
}

fn parse_filter(raw: &str) -> CliResult<FilterTerm> {
    let (key, value) = raw
        .split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .ok_or_else(|| CliError::validation(format!("filter '{raw}' must be key=value")))?;
    Ok(FilterTerm::new(key, value, format!("{key}: {value}")))
}

fn sort_from(args: &ListArgs, link: &ListQuery) -> Option<SortBy> {
    let direction = args.order.map(|order| match order {
        OrderArg::Asc => SortDirection::Asc,
        OrderArg::Desc => SortDirection::Desc,
    });
    match (&args.sort, direction) {
        (Some(key), direction) => Some(SortBy::new(key.clone(), direction.unwrap_or_default())),
        (None, Some(direction)) => {
            let key = link.sort().map_or_else(|| SortBy::default().key, |sort| sort.key);
            Some(SortBy::new(key, direction))
        }
        (None, None) => link.sort(),
    }
}

fn hidden_filters(args: &ListArgs) -> CliResult<HiddenFilters> {
    let mut hidden = HiddenFilters {
        all: args.hide_all_filters,
        ..HiddenFilters::default()
    };
    for name in &args.hide_filters {
        let category = FilterCategory::parse(name.trim()).ok_or_else(|| {
            let known: Vec<&str> = FilterCategory::ALL
                .into_iter()
                .map(FilterCategory::as_str)
                .collect();
            CliError::validation(format!(
                "unknown filter category '{name}' (expected one of: {})",
                known.join(", ")
            ))
        })?;
        hidden = hidden.hide(category);
    }
    Ok(hidden)
}

/// `1 system` / `N systems`.
pub(crate) fn systems(count: usize) -> String {
    if count == 1 {
        "1 system".to_string()
    } else {
        format!("{count} systems")
    }
}
