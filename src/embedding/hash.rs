//! Hash-based pseudo-embeddings.

use super::Embedder;
use crate::{Error, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedder producing deterministic pseudo-embeddings from word hashes.
///
/// Texts sharing words land near each other, which is enough to rank four
/// facet blocks without a model server. It does not capture meaning:
/// "quest" and "mission" are unrelated to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    /// Embedding dimensions.
    pub const DIMENSIONS: usize = 256;

    /// Upper bound on words hashed per text.
    const MAX_WORDS: usize = 4096;

    /// Creates an embedder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn pseudo_embed(text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; Self::DIMENSIONS];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .take(Self::MAX_WORDS)
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            Self::distribute_hash(&mut embedding, hasher.finish());
        }

        Self::normalize(&mut embedding);
        embedding
    }

    /// Spreads a word hash over a few dimensions.
    fn distribute_hash(embedding: &mut [f32], hash: u64) {
        let dimensions = embedding.len();
        for j in 0..4 {
            let idx = (hash >> (j * 16)) as usize % dimensions;
            let sign = if (hash >> (j + 60)) & 1 == 0 { 1.0 } else { -1.0 };
            embedding[idx] += sign;
        }
    }

    fn normalize(embedding: &mut [f32]) {
        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq <= 0.0 {
            return;
        }
        let inv_norm = norm_sq.sqrt().recip();
        for v in embedding.iter_mut() {
            *v *= inv_norm;
        }
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
        }
        Ok(Self::pseudo_embed(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::vector::cosine_similarity;

    #[test]
    fn test_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("Buy a sword").unwrap();
        let b = embedder.embed("Buy a sword").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), HashEmbedder::DIMENSIONS);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashEmbedder::new();
        let query = embedder.embed("complete the sword task").unwrap();
        let todos = embedder.embed("Current Todo List: 1. Buy sword 2. Train").unwrap();
        let rules = embedder.embed("Game Rules: dragons breathe fire").unwrap();

        assert!(cosine_similarity(&query, &todos) > cosine_similarity(&query, &rules));
    }

    #[test]
    fn test_case_insensitive() {
        let embedder = HashEmbedder::new();
        assert_eq!(embedder.embed("SWORD").unwrap(), embedder.embed("sword").unwrap());
    }

    #[test]
    fn test_empty_text_rejected() {
        let embedder = HashEmbedder::new();
        assert!(embedder.embed("").is_err());
        assert!(embedder.embed("   ").is_err());
    }
}
