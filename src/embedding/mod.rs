//! Embedding generation.
//!
//! The context index only needs `text -> vector`, deterministic for identical
//! input within a session. [`OllamaEmbedder`] calls a local Ollama server;
//! [`HashEmbedder`] produces offline pseudo-embeddings.

// Allow cast precision loss for hash-based embedding calculations.
#![allow(clippy::cast_precision_loss)]
// Allow cast possible truncation for hash index calculations on 32-bit platforms.
#![allow(clippy::cast_possible_truncation)]

mod hash;
mod ollama;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

use crate::Result;
use std::sync::Arc;

/// Trait for embedding generators.
pub trait Embedder: Send + Sync {
    /// The embedder name.
    fn name(&self) -> &'static str;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }
}
