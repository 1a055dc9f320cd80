//! `tags` command handlers.

use anyhow::anyhow;
use inventory_ui::services::dispatcher::RequestClock;
use inventory_ui::{ListStore, Pagination};

use crate::cli::{OutputFormat, TagListArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_tags;

pub(crate) async fn handle_tag_list(
    ctx: &AppContext,
    args: TagListArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut store = ListStore::new();
    let clock = RequestClock::new();
    let pagination = Pagination {
        page: args.page,
        per_page: args.per_page,
    };
    store
        .load_tags(ctx, &clock, args.search.as_deref(), pagination)
        .await;
    if let Some(error) = &store.tags().error {
        return Err(CliError::failure(anyhow!(error.message.clone())));
    }
    print!("{}", render_tags(store.tags(), output)?);
    Ok(())
}
