//! Request orchestration: stamped dispatch and batched fetches.

pub mod batch;
pub mod dispatcher;
