//! `hosts` command handlers.

use anyhow::anyhow;
use inventory_ui::features::hosts::HostSource;
use inventory_ui::features::hosts::logic::{HostEdit, edit_host, os_filter_options};
use inventory_ui::services::dispatcher::RequestClock;
use inventory_ui::{Dispatcher, ListStore, Pagination};

use crate::cli::{
    HostAnsibleArgs, HostDeleteArgs, HostRenameArgs, HostTagsArgs, ListArgs, OsArgs,
    OutputFormat,
};
use crate::client::{AppContext, CliError, CliResult, HostList};
use crate::commands::{load_list, prepare_list, systems};
use crate::output::{render_host_list, render_os_options, render_system_tags};

pub(crate) async fn handle_host_list(
    ctx: &AppContext,
    args: ListArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let (mut store, params) = prepare_list(&args)?;
    let dispatcher = Dispatcher::new(HostList(ctx.clone())).with_tags(args.tags);
    load_list(&mut store, &dispatcher, &args.ids, &params).await?;
    print!("{}", render_host_list(&store, output)?);
    Ok(())
}

pub(crate) async fn handle_host_delete(ctx: &AppContext, args: HostDeleteArgs) -> CliResult<()> {
    let ids: Vec<String> = args
        .ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(CliError::validation("at least one system id is required"));
    }
    let label = systems(ids.len());
    ctx.delete_hosts(&ids)
        .await
        .map_err(|err| CliError::from(err).context(&format!("Failed to delete {label}")))?;
    println!("{label} deleted");
    Ok(())
}

pub(crate) async fn handle_host_rename(ctx: &AppContext, args: HostRenameArgs) -> CliResult<()> {
    apply_edit(ctx, &args.id, HostEdit::DisplayName(args.name)).await
}

pub(crate) async fn handle_host_ansible_host(
    ctx: &AppContext,
    args: HostAnsibleArgs,
) -> CliResult<()> {
    apply_edit(ctx, &args.id, HostEdit::AnsibleHost(args.value)).await
}

async fn apply_edit(ctx: &AppContext, id: &str, edit: HostEdit) -> CliResult<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::validation("system id must not be empty"));
    }
    let edit = edit
        .normalized()
        .ok_or_else(|| CliError::validation("display name must not be empty"))?;
    let failure = edit.messages().failure;
    let messages = edit_host(ctx, id, &edit)
        .await
        .map_err(|err| CliError::from_source(err).context(&failure))?;
    println!("{}", messages.success);
    Ok(())
}

pub(crate) async fn handle_host_tags(
    ctx: &AppContext,
    args: HostTagsArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let mut store = ListStore::new();
    let clock = RequestClock::new();
    let pagination = Pagination {
        page: args.page,
        per_page: args.per_page,
    };
    store
        .load_system_tags(ctx, &clock, &args.id, args.search.as_deref(), pagination, None)
        .await;
    if let Some(error) = &store.system_tags().error {
        return Err(CliError::failure(anyhow!(error.message.clone())));
    }
    print!("{}", render_system_tags(store.system_tags(), output)?);
    Ok(())
}

pub(crate) async fn handle_host_os(
    ctx: &AppContext,
    args: OsArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let reported = ctx
        .get_operating_systems()
        .await
        .map_err(|err| CliError::from_source(err).context("Failed to load operating systems"))?;
    let options = os_filter_options(reported.results, args.centos);
    print!("{}", render_os_options(&options, output)?);
    Ok(())
}
