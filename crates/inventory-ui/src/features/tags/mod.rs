//! Tag catalogue and per-system tag pages.

pub mod state;
pub mod system;
