//! Core list primitives: request parameter building and the state owner.
pub mod query;
pub mod store;
