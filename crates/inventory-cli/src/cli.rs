//! Argument parsing and command dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use inventory_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, parse_api_key, parse_url};
use crate::commands::groups::{
    handle_group_add_hosts, handle_group_create, handle_group_delete, handle_group_list,
    handle_group_remove_hosts, handle_group_rename,
};
use crate::commands::hosts::{
    handle_host_ansible_host, handle_host_delete, handle_host_list, handle_host_os,
    handle_host_rename, handle_host_tags,
};
use crate::commands::tags::handle_tag_list;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Parses CLI arguments, installs logging, and executes the requested command.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);
    let command_name = command_label(&cli.command);
    let request_id = Uuid::new_v4().to_string();

    match dispatch(cli, &request_id).await {
        Ok(()) => 0,
        Err(err) => {
            let exit_code = err.exit_code();
            debug!(command = command_name, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: option_env!("INVENTORY_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

async fn dispatch(cli: Cli, request_id: &str) -> CliResult<()> {
    let api_key = parse_api_key(cli.api_key)?;
    let ctx = AppContext::connect(cli.api_url, api_key, cli.timeout, request_id)?;

    match cli.command {
        Command::Hosts(hosts) => match hosts {
            HostsCommand::Ls(args) => handle_host_list(&ctx, args, cli.output).await,
            HostsCommand::Delete(args) => handle_host_delete(&ctx, args).await,
            HostsCommand::Rename(args) => handle_host_rename(&ctx, args).await,
            HostsCommand::AnsibleHost(args) => handle_host_ansible_host(&ctx, args).await,
            HostsCommand::Tags(args) => handle_host_tags(&ctx, args, cli.output).await,
            HostsCommand::Os(args) => handle_host_os(&ctx, args, cli.output).await,
        },
        Command::Groups(groups) => match groups {
            GroupsCommand::Ls(args) => handle_group_list(&ctx, args, cli.output).await,
            GroupsCommand::Create(args) => handle_group_create(&ctx, args).await,
            GroupsCommand::Rename(args) => handle_group_rename(&ctx, args).await,
            GroupsCommand::Delete(args) => handle_group_delete(&ctx, args).await,
            GroupsCommand::AddHosts(args) => handle_group_add_hosts(&ctx, args).await,
            GroupsCommand::RemoveHosts(args) => handle_group_remove_hosts(&ctx, args).await,
        },
        Command::Tags(tags) => match tags {
            TagsCommand::Ls(args) => handle_tag_list(&ctx, args, cli.output).await,
        },
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Hosts(HostsCommand::Ls(_)) => "hosts_ls",
        Command::Hosts(HostsCommand::Delete(_)) => "hosts_delete",
        Command::Hosts(HostsCommand::Rename(_)) => "hosts_rename",
        Command::Hosts(HostsCommand::AnsibleHost(_)) => "hosts_ansible_host",
        Command::Hosts(HostsCommand::Tags(_)) => "hosts_tags",
        Command::Hosts(HostsCommand::Os(_)) => "hosts_os",
        Command::Groups(GroupsCommand::Ls(_)) => "groups_ls",
        Command::Groups(GroupsCommand::Create(_)) => "groups_create",
        Command::Groups(GroupsCommand::Rename(_)) => "groups_rename",
        Command::Groups(GroupsCommand::Delete(_)) => "groups_delete",
        Command::Groups(GroupsCommand::AddHosts(_)) => "groups_add_hosts",
        Command::Groups(GroupsCommand::RemoveHosts(_)) => "groups_remove_hosts",
        Command::Tags(TagsCommand::Ls(_)) => "tags_ls",
    }
}

#[derive(Parser)]
#[command(name = "inventory", about = "Browse and organise the host inventory")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "INVENTORY_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "INVENTORY_API_KEY")]
    pub(crate) api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "INVENTORY_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "INVENTORY_LOG_LEVEL",
        default_value = inventory_telemetry::DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "INVENTORY_LOG_FORMAT", value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Inspect and remove systems.
    #[command(subcommand)]
    Hosts(HostsCommand),
    /// Manage workspaces and their membership.
    #[command(subcommand)]
    Groups(GroupsCommand),
    /// Browse the tag catalogue.
    #[command(subcommand)]
    Tags(TagsCommand),
}

#[derive(Subcommand)]
pub(crate) enum HostsCommand {
    /// List systems.
    Ls(ListArgs),
    /// Delete systems by id.
    Delete(HostDeleteArgs),
    /// Change a system's display name.
    Rename(HostRenameArgs),
    /// Change the hostname Ansible uses for a system.
    AnsibleHost(HostAnsibleArgs),
    /// Page through one system's tags.
    Tags(HostTagsArgs),
    /// List operating system filter values.
    Os(OsArgs),
}

#[derive(Subcommand)]
pub(crate) enum GroupsCommand {
    /// List workspaces.
    Ls(ListArgs),
    /// Create a workspace.
    Create(GroupCreateArgs),
    /// Rename a workspace.
    Rename(GroupRenameArgs),
    /// Delete empty workspaces.
    Delete(GroupDeleteArgs),
    /// Add ungrouped systems to a workspace.
    AddHosts(GroupHostsArgs),
    /// Remove systems from a workspace.
    RemoveHosts(GroupHostsArgs),
}

#[derive(Subcommand)]
pub(crate) enum TagsCommand {
    /// List tags grouped by namespace.
    Ls(TagListArgs),
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(
        long,
        help = "Deep-link query string, e.g. per_page=10&page=2&order_by=updated&order_how=desc"
    )]
    pub(crate) query: Option<String>,
    #[arg(long = "filter", help = "Filter as key=value (repeatable)")]
    pub(crate) filters: Vec<String>,
    #[arg(long, help = "Sort key sent as order_by")]
    pub(crate) sort: Option<String>,
    #[arg(long, value_enum, help = "Sort direction")]
    pub(crate) order: Option<OrderArg>,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) per_page: Option<u32>,
    #[arg(long = "id", value_delimiter = ',', help = "Restrict the list to these ids")]
    pub(crate) ids: Vec<String>,
    #[arg(long = "hide-filter", help = "Disable a filter category (repeatable)")]
    pub(crate) hide_filters: Vec<String>,
    #[arg(long, help = "Disable every filter category not re-enabled")]
    pub(crate) hide_all_filters: bool,
    #[arg(long, help = "Fetch host tags alongside rows")]
    pub(crate) tags: bool,
}

#[derive(Args)]
pub(crate) struct HostDeleteArgs {
    #[arg(required = true, value_delimiter = ',', help = "System identifiers")]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct HostRenameArgs {
    #[arg(help = "System identifier")]
    pub(crate) id: String,
    #[arg(help = "New display name")]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct HostAnsibleArgs {
    #[arg(help = "System identifier")]
    pub(crate) id: String,
    #[arg(help = "Hostname Ansible connects to; empty clears it")]
    pub(crate) value: String,
}

#[derive(Args, Default)]
pub(crate) struct HostTagsArgs {
    #[arg(help = "System identifier")]
    pub(crate) id: String,
    #[arg(long, help = "Only tags matching this text")]
    pub(crate) search: Option<String>,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) per_page: Option<u32>,
}

#[derive(Args, Default)]
pub(crate) struct OsArgs {
    #[arg(long, help = "Include CentOS releases")]
    pub(crate) centos: bool,
}

#[derive(Args)]
pub(crate) struct GroupCreateArgs {
    #[arg(help = "Workspace name")]
    pub(crate) name: String,
    #[arg(long = "host", value_delimiter = ',', help = "Systems to add on creation")]
    pub(crate) hosts: Vec<String>,
}

#[derive(Args)]
pub(crate) struct GroupRenameArgs {
    #[arg(help = "Workspace identifier")]
    pub(crate) id: String,
    #[arg(help = "New workspace name")]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct GroupDeleteArgs {
    #[arg(required = true, value_delimiter = ',', help = "Workspace identifiers")]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct GroupHostsArgs {
    #[arg(help = "Workspace identifier")]
    pub(crate) group_id: String,
    #[arg(required = true, value_delimiter = ',', help = "System identifiers")]
    pub(crate) hosts: Vec<String>,
    #[arg(long, help = "Apply the change instead of only checking it")]
    pub(crate) confirm: bool,
}

#[derive(Args, Default)]
pub(crate) struct TagListArgs {
    #[arg(long, help = "Only tags matching this text")]
    pub(crate) search: Option<String>,
    #[arg(long)]
    pub(crate) page: Option<u32>,
    #[arg(long)]
    pub(crate) per_page: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OrderArg {
    Asc,
    Desc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse_with_defaults() {
        let cli = Cli::try_parse_from([
            "inventory",
            "hosts",
            "ls",
            "--query",
            "per_page=10&page=2",
            "--filter",
            "hostname_or_id=web",
            "--hide-filter",
            "stale",
            "--output",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.api_url.as_str(), "http://127.0.0.1:8000/");
        let Command::Hosts(HostsCommand::Ls(args)) = cli.command else {
            panic!("expected hosts ls");
        };
        assert_eq!(args.query.as_deref(), Some("per_page=10&page=2"));
        assert_eq!(args.filters, ["hostname_or_id=web"]);
        assert_eq!(args.hide_filters, ["stale"]);
    }

    #[test]
    fn add_hosts_accepts_comma_separated_ids() {
        let cli = Cli::try_parse_from([
            "inventory",
            "groups",
            "add-hosts",
            "g1",
            "host-001,host-002",
            "--confirm",
        ])
        .expect("parse");
        assert_eq!(command_label(&cli.command), "groups_add_hosts");
        let Command::Groups(GroupsCommand::AddHosts(args)) = cli.command else {
            panic!("expected groups add-hosts");
        };
        assert_eq!(args.group_id, "g1");
        assert_eq!(args.hosts, ["host-001", "host-002"]);
        assert!(args.confirm);
    }

    #[test]
    fn host_edits_take_positional_id_and_value() {
        let cli = Cli::try_parse_from(["inventory", "hosts", "ansible-host", "host-001", ""])
            .expect("parse");
        assert_eq!(command_label(&cli.command), "hosts_ansible_host");
        let Command::Hosts(HostsCommand::AnsibleHost(args)) = cli.command else {
            panic!("expected hosts ansible-host");
        };
        assert_eq!(args.id, "host-001");
        assert!(args.value.is_empty());

        let cli = Cli::try_parse_from(["inventory", "hosts", "os", "--centos"]).expect("parse");
        let Command::Hosts(HostsCommand::Os(args)) = cli.command else {
            panic!("expected hosts os");
        };
        assert!(args.centos);
    }

    #[test]
    fn log_format_flag_maps_onto_telemetry() {
        assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        let cli = Cli::try_parse_from(["inventory", "--log-format", "pretty", "tags", "ls"])
            .expect("parse");
        assert_eq!(cli.log_format, Some(LogFormatArg::Pretty));
    }
}
