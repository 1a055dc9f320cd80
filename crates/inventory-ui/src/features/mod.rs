//! List engine features: reconciler, selection, tags, host and group workflows.

pub mod entities;
pub mod groups;
pub mod hosts;
pub mod selection;
pub mod tags;
