//! List reconciler: actions, state, and selectors for one paginated list view.

pub mod actions;
pub mod state;
