//! Data models for todo-rpg.
//!
//! Game state as loaded from the data directory, and the facet-tagged text
//! blocks the context index is built from.

mod context;
mod state;

pub use context::{ContextBlock, Facet};
pub use state::{GameState, Record, TaskList};
