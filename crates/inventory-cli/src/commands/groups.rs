//! `groups` command handlers.

use inventory_api_models::GroupCreateRequest;
use inventory_ui::features::groups::GroupSource;
use inventory_ui::features::groups::logic::{
    ALREADY_GROUPED_WARNING, AddHostsCheck, DeleteVerdict, add_hosts_messages, check_add_hosts,
    create_messages, delete_messages, remove_hosts_messages, rename_messages,
    verify_groups_deletable,
};
use inventory_ui::models::Row;
use inventory_ui::{Dispatcher, NormalizedParams, SelectionMeta, SelectionSet};
use tracing::debug;

use crate::cli::{
    GroupCreateArgs, GroupDeleteArgs, GroupHostsArgs, GroupRenameArgs, ListArgs, OutputFormat,
};
use crate::client::{AppContext, CliError, CliResult, GroupList, HostList};
use crate::commands::{load_list, prepare_list, systems};
use crate::output::render_group_list;

pub(crate) async fn handle_group_list(
    ctx: &AppContext,
    args: ListArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let (mut store, params) = prepare_list(&args)?;
    let dispatcher = Dispatcher::new(GroupList(ctx.clone()));
    load_list(&mut store, &dispatcher, &args.ids, &params).await?;
    print!("{}", render_group_list(&store, output)?);
    Ok(())
}

pub(crate) async fn handle_group_create(ctx: &AppContext, args: GroupCreateArgs) -> CliResult<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::validation("workspace name must not be empty"));
    }
    let messages = create_messages(name);
    let request = GroupCreateRequest {
        name: name.to_string(),
        host_ids: args.hosts,
    };
    let created = ctx
        .create_group(&request)
        .await
        .map_err(|err| CliError::from_source(err).context(&messages.failure))?;
    debug!(id = %created.id, "workspace created");
    println!("{} ({})", messages.success, created.id);
    Ok(())
}

pub(crate) async fn handle_group_rename(ctx: &AppContext, args: GroupRenameArgs) -> CliResult<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::validation("workspace name must not be empty"));
    }
    let messages = rename_messages(name);
    ctx.rename_group(&args.id, name)
        .await
        .map_err(|err| CliError::from_source(err).context(&messages.failure))?;
    println!("{}", messages.success);
    Ok(())
}

pub(crate) async fn handle_group_delete(ctx: &AppContext, args: GroupDeleteArgs) -> CliResult<()> {
    let Some(first_id) = args.ids.first() else {
        return Err(CliError::validation("at least one workspace id is required"));
    };
    let verdict = verify_groups_deletable(ctx, &args.ids).await?;
    let DeleteVerdict::Deletable(groups) = &verdict else {
        return Err(CliError::validation(format!(
            "{}\n{}",
            verdict.title(),
            verdict.body()
        )));
    };
    let name = groups
        .first()
        .map_or(first_id.as_str(), |group| group.name.as_str());
    let messages = delete_messages(args.ids.len(), name);
    ctx.delete_groups(&args.ids)
        .await
        .map_err(|err| CliError::from_source(err).context(&messages.failure))?;
    println!("{}", messages.success);
    Ok(())
}

pub(crate) async fn handle_group_add_hosts(
    ctx: &AppContext,
    args: GroupHostsArgs,
) -> CliResult<()> {
    let selection = select_hosts(ctx, &args.hosts).await?;
    let ids = match check_add_hosts(&selection) {
        AddHostsCheck::Empty => return Err(CliError::validation("no systems selected")),
        AddHostsCheck::AlreadyGrouped(grouped) => {
            for (id, group) in &grouped {
                eprintln!("  {id} ({group})");
            }
            return Err(CliError::validation(ALREADY_GROUPED_WARNING));
        }
        AddHostsCheck::Ready(ids) => ids,
    };

    let group = group_label(ctx, &args.group_id).await?;
    let messages = add_hosts_messages(ids.len(), &group);
    if !args.confirm {
        println!(
            "{} ready to add to {group}; re-run with --confirm to apply",
            systems(ids.len())
        );
        return Ok(());
    }
    ctx.add_hosts(&args.group_id, &ids)
        .await
        .map_err(|err| CliError::from_source(err).context(&messages.failure))?;
    println!("{}", messages.success);
    Ok(())
}

pub(crate) async fn handle_group_remove_hosts(
    ctx: &AppContext,
    args: GroupHostsArgs,
) -> CliResult<()> {
    let group = group_label(ctx, &args.group_id).await?;
    let messages = remove_hosts_messages(args.hosts.len(), &group);
    ctx.remove_hosts(&args.group_id, &args.hosts)
        .await
        .map_err(|err| CliError::from_source(err).context(&messages.failure))?;
    println!("{}", messages.success);
    Ok(())
}

/// Look the hosts up by id and track them as an enumerated selection.
async fn select_hosts(ctx: &AppContext, ids: &[String]) -> CliResult<SelectionSet> {
    let params = NormalizedParams {
        per_page: u32::try_from(ids.len()).unwrap_or(u32::MAX).max(1),
        ..NormalizedParams::default()
    };
    let dispatcher = Dispatcher::new(HostList(ctx.clone()));
    let page = dispatcher.fetch(ids, &params, false).await?;

    let rows: Vec<Row> = page.results.into_iter().map(Row::from).collect();
    let missing: Vec<&str> = rows
        .iter()
        .filter(|row| !row.is_created())
        .map(|row| row.id.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(CliError::validation(format!(
            "unknown systems: {}",
            missing.join(", ")
        )));
    }

    let mut selection = SelectionSet::new();
    for row in &rows {
        selection.toggle(row.id.clone(), SelectionMeta::from(row), true);
    }
    Ok(selection)
}

async fn group_label(ctx: &AppContext, id: &str) -> CliResult<String> {
    let groups = ctx
        .get_groups_by_ids(&[id.to_string()])
        .await
        .map_err(CliError::from_source)?;
    let group = groups
        .into_iter()
        .find(|group| group.id == id)
        .ok_or_else(|| CliError::validation(format!("workspace '{id}' not found")))?;
    Ok(group.name)
}
