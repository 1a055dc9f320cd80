//! Selection tracker for bulk actions across pages.

pub mod resolve;
pub mod state;
