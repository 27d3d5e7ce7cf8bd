//! Storage traits.

mod state;
mod vector;

pub use state::StateStore;
pub use vector::VectorBackend;
