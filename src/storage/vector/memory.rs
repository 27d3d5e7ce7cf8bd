//! In-memory brute-force vector backend.

use crate::models::Facet;
use crate::storage::traits::VectorBackend;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Brute-force cosine index held entirely in memory.
///
/// Nothing is persisted; the owning context index is rebuilt from scratch
/// after the game state changes.
#[derive(Debug, Default)]
pub struct MemoryVectorBackend {
    /// Embedding dimensions, fixed by the first insert.
    dimensions: usize,
    /// Facet -> embedding, iterated in facet order.
    vectors: BTreeMap<Facet, Vec<f32>>,
}

impl MemoryVectorBackend {
    /// Creates an empty backend whose dimensions are set by the first insert.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dimensions: 0,
            vectors: BTreeMap::new(),
        }
    }

    /// Validates embedding dimensions.
    fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::InvalidInput("Embedding is empty".to_string()));
        }
        if self.dimensions != 0 && embedding.len() != self.dimensions {
            return Err(Error::InvalidInput(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }
        Ok(())
    }
}

/// Computes cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`, or 0.0 for mismatched or zero vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

impl VectorBackend for MemoryVectorBackend {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn upsert(&mut self, facet: Facet, embedding: &[f32]) -> Result<()> {
        self.validate_embedding(embedding)?;
        if self.dimensions == 0 {
            self.dimensions = embedding.len();
        }
        self.vectors.insert(facet, embedding.to_vec());
        Ok(())
    }

    fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<(Facet, f32)>> {
        if self.vectors.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        self.validate_embedding(query_embedding)?;

        let mut scores: Vec<(Facet, f32)> = self
            .vectors
            .iter()
            .map(|(facet, vec)| (*facet, cosine_similarity(query_embedding, vec)))
            .collect();

        // Stable sort: equal scores stay in facet order.
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scores.truncate(limit);

        Ok(scores)
    }

    fn count(&self) -> usize {
        self.vectors.len()
    }
}
