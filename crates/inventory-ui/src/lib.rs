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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Inventory list engine.
//!
//! Keeps a paginated, filtered, sorted host or group list consistent with the
//! server while requests race each other. The engine is DOM-free: a view (or
//! the CLI) builds params, dispatches a load, feeds lifecycle actions into the
//! reducer and renders from the resulting state.

pub mod core;
pub mod error;
pub mod features;
pub mod models;
pub mod services;

pub use crate::core::query::{HiddenFilters, ListQuery, NormalizedParams, Pagination, build};
pub use crate::core::store::ListStore;
pub use crate::error::{BatchError, DispatchError, DispatchResult};
pub use crate::features::entities::actions::{
    EntitiesPayload, EntityAction, RequestMeta, SelectTarget,
};
pub use crate::features::entities::state::{ListState, ReduceOutcome, reduce};
pub use crate::features::selection::state::{SelectionMeta, SelectionSet};
pub use crate::services::batch::{BATCH_CHUNK_SIZE, fetch_batched_inline};
pub use crate::services::dispatcher::{Dispatcher, EntitySource};
