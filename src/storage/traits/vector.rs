//! Vector backend trait.
//!
//! Nearest-neighbour search over facet embeddings. The index holds at most
//! one vector per [`Facet`], so a brute-force scan is all it ever needs.

use crate::Result;
use crate::models::Facet;

/// Trait for vector similarity backends.
pub trait VectorBackend: Send + Sync {
    /// Returns the embedding dimensions, or 0 before the first insert.
    fn dimensions(&self) -> usize;

    /// Inserts or replaces the embedding for a facet.
    fn upsert(&mut self, facet: Facet, embedding: &[f32]) -> Result<()>;

    /// Returns up to `limit` facets ranked by similarity to the query, best first.
    fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<(Facet, f32)>>;

    /// Returns the number of stored embeddings.
    fn count(&self) -> usize;
}
