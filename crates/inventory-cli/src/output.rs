//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use inventory_ui::ListStore;
use inventory_ui::features::tags::state::TagsState;
use inventory_ui::features::tags::system::SystemTagsState;
use inventory_ui::models::FilterTerm;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_host_list(store: &ListStore, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(store.state()),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{:<36} {:<28} {:<20} {:<12} {:>4}",
                "ID", "NAME", "WORKSPACE", "OS", "TAGS"
            );
            for row in store.visible_rows() {
                let tags = row
                    .tags
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |tags| tags.len().to_string());
                let _ = writeln!(
                    out,
                    "{:<36} {:<28} {:<20} {:<12} {:>4}",
                    row.id,
                    row.display_name.as_deref().unwrap_or("<unnamed>"),
                    row.group_name().unwrap_or("-"),
                    row.os_label(),
                    tags
                );
            }
            push_footer(&mut out, store);
            Ok(out)
        }
    }
}

pub(crate) fn render_group_list(store: &ListStore, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(store.state()),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{:<36} {:<28} {:>7} UPDATED",
                "ID", "NAME", "SYSTEMS"
            );
            for row in store.visible_rows() {
                let _ = writeln!(
                    out,
                    "{:<36} {:<28} {:>7} {}",
                    row.id,
                    row.display_name.as_deref().unwrap_or("<unnamed>"),
                    row.host_count.unwrap_or(0),
                    format_time(row.updated)
                );
            }
            push_footer(&mut out, store);
            Ok(out)
        }
    }
}

pub(crate) fn render_tags(tags: &TagsState, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(tags),
        OutputFormat::Table => {
            let mut out = String::new();
            for group in &tags.groups {
                let _ = writeln!(out, "{}:", group.namespace.as_deref().unwrap_or("(none)"));
                for entry in &group.tags {
                    let _ = writeln!(out, "  {:<40} {:>6}", entry.tag.label(), entry.count);
                }
            }
            if tags.additional_tags_count > 0 {
                let _ = writeln!(out, "and {} more", tags.additional_tags_count);
            }
            Ok(out)
        }
    }
}

pub(crate) fn render_system_tags(
    tags: &SystemTagsState,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(tags),
        OutputFormat::Table => {
            let mut out = String::new();
            for tag in &tags.tags {
                let _ = writeln!(out, "{}", tag.label());
            }
            let shown = tags.tags.len() as u64;
            let _ = writeln!(
                out,
                "{} of {} tags on {}",
                shown,
                tags.tags_count.unwrap_or(shown),
                tags.system_id.as_deref().unwrap_or("-")
            );
            Ok(out)
        }
    }
}

pub(crate) fn render_os_options(options: &[FilterTerm], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(options),
        OutputFormat::Table => Ok(options
            .iter()
            .map(|term| format!("{}={}\n", term.key, term.value))
            .collect()),
    }
}

fn push_footer(out: &mut String, store: &ListStore) {
    let state = store.state();
    let _ = writeln!(
        out,
        "page {} of {} ({} total)",
        state.page,
        store.page_count().max(1),
        state.total
    );
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map(|text| text + "\n")
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[must_use]
pub(crate) fn format_time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |time| time.format("%Y-%m-%d %H:%M").to_string())
}
