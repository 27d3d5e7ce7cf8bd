//! Vector backend implementations.

mod memory;

pub use memory::{MemoryVectorBackend, cosine_similarity};
