//! Storage layer.
//!
//! Two concerns live here:
//! - **State**: the on-disk game files (character, campaign, `todo.txt`, rules)
//! - **Vector**: the in-memory embedding index behind the context index

pub mod filesystem;
pub mod traits;
pub mod vector;

pub use filesystem::FileStateStore;
pub use traits::{StateStore, VectorBackend};
pub use vector::MemoryVectorBackend;
