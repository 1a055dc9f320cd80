#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! `inventory`: command-line client for browsing and editing the host inventory.
//!
//! Every list command runs one load through [`inventory_ui::ListStore`], so the
//! printed table is the reconciled state a browser view would show.
//!
//! Commands:
//! - `hosts ls|delete|rename|ansible-host|tags|os`: list systems through deep-link
//!   query strings and repeatable `--filter key=value` flags, delete in chunks of 50,
//!   edit one field with `PATCH /hosts/{id}`, page through one system's tags, and
//!   print the operating system filter values.
//! - `groups ls|create|rename|delete|add-hosts|remove-hosts`: workspace management.
//!   Deletion is refused unless every workspace is empty, and `add-hosts` only
//!   checks membership unless `--confirm` is passed.
//! - `tags ls`: the tag catalogue grouped by namespace.
//!
//! Configuration comes from flags with environment fallbacks: `INVENTORY_API_URL`,
//! `INVENTORY_API_KEY`, `INVENTORY_HTTP_TIMEOUT_SECS`, `INVENTORY_LOG_LEVEL` and
//! `INVENTORY_LOG_FORMAT`. `--output json` prints the reconciled state instead of a
//! table. Ctrl-C cancels an in-flight list load.
//!
//! Exit codes: `0` on success, `2` for validation errors (bad flags, 400/409/422
//! responses), `3` for every other failure.

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
