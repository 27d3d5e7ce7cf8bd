//! Context index over the game state.
//!
//! One block per present facet, embedded once at build time. Queries embed
//! the utterance and return the closest blocks.

use crate::embedding::Embedder;
use crate::models::{ContextBlock, Facet, GameState};
use crate::storage::traits::VectorBackend;
use crate::storage::vector::MemoryVectorBackend;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Body used for an empty task list, so the block still embeds.
const EMPTY_TODOS: &str = "(no tasks)";

/// In-memory semantic index over the game state facets.
///
/// Derived and ephemeral: never persisted, rebuilt after the state changes.
#[derive(Debug)]
pub struct ContextIndex {
    blocks: BTreeMap<Facet, ContextBlock>,
    vectors: MemoryVectorBackend,
}

impl ContextIndex {
    /// Renders the facet blocks for a state, in facet order.
    ///
    /// Character, campaign, and rules appear only when present; the task list
    /// always does.
    #[must_use]
    pub fn render(state: &GameState) -> Vec<ContextBlock> {
        let mut blocks = Vec::with_capacity(Facet::all().len());

        if let Some(character) = &state.character {
            blocks.push(ContextBlock::new(Facet::Character, &character.to_pretty_json()));
        }
        if let Some(campaign) = &state.campaign {
            blocks.push(ContextBlock::new(Facet::Campaign, &campaign.to_pretty_json()));
        }

        let todos = if state.todos.is_empty() {
            EMPTY_TODOS.to_string()
        } else {
            state.todos.numbered()
        };
        blocks.push(ContextBlock::new(Facet::Todos, &todos));

        if let Some(rules) = state.rules.as_deref().filter(|r| !r.trim().is_empty()) {
            blocks.push(ContextBlock::new(Facet::Rules, rules.trim_end()));
        }

        blocks
    }

    /// Builds the index, embedding every block in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or returns the wrong number of vectors.
    pub fn build(state: &GameState, embedder: &dyn Embedder) -> Result<Self> {
        let blocks = Self::render(state);
        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        if embeddings.len() != blocks.len() {
            return Err(Error::Transport {
                operation: "embed_context".to_string(),
                cause: format!(
                    "expected {} embeddings, got {}",
                    blocks.len(),
                    embeddings.len()
                ),
            });
        }

        let mut vectors = MemoryVectorBackend::new();
        for (block, embedding) in blocks.iter().zip(&embeddings) {
            vectors.upsert(block.facet, embedding)?;
        }

        tracing::debug!(
            embedder = embedder.name(),
            vectors = vectors.count(),
            dimensions = vectors.dimensions(),
            "Built context index"
        );

        Ok(Self {
            blocks: blocks.into_iter().map(|b| (b.facet, b)).collect(),
            vectors,
        })
    }

    /// Returns up to `k` blocks most similar to `text`, best first.
    ///
    /// Equal scores keep facet order (character, campaign, todos, rules).
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is blank or the query cannot be embedded.
    pub fn query(&self, text: &str, k: usize, embedder: &dyn Embedder) -> Result<Vec<ContextBlock>> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Cannot query with empty text".to_string()));
        }
        if k == 0 || self.blocks.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed(text)?;
        let hits = self.vectors.search(&query_embedding, k)?;

        tracing::debug!(
            k,
            hits = ?hits.iter().map(|(facet, score)| format!("{facet}:{score:.3}")).collect::<Vec<_>>(),
            "Retrieved context"
        );

        Ok(hits
            .into_iter()
            .filter_map(|(facet, _)| self.blocks.get(&facet).cloned())
            .collect())
    }

    /// Returns the block for a facet, if indexed.
    #[must_use]
    pub fn block(&self, facet: Facet) -> Option<&ContextBlock> {
        self.blocks.get(&facet)
    }

    /// Returns the number of indexed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::models::{Record, TaskList};
    use std::path::Path;

    fn full_state() -> GameState {
        let path = Path::new("test.yaml");
        GameState {
            character: Record::from_yaml("name: Thane\nclass: Ranger\n", path).unwrap(),
            campaign: Record::from_yaml("setting: Ashfall\n", path).unwrap(),
            todos: TaskList::parse("Buy sword\nTrain archery"),
            rules: Some("Dragons breathe fire.\nGold buys swords.\n".to_string()),
            character_path: None,
        }
    }

    #[test]
    fn test_render_all_facets() {
        let blocks = ContextIndex::render(&full_state());
        let facets: Vec<Facet> = blocks.iter().map(|b| b.facet).collect();
        assert_eq!(facets, Facet::all());
        assert_eq!(blocks[2].text, "Current Todo List:\n1. Buy sword\n2. Train archery");
        assert_eq!(blocks[3].text, "Game Rules:\nDragons breathe fire.\nGold buys swords.");
        assert!(blocks[0].text.starts_with("Character Stats: {"));
        assert!(blocks[1].text.contains("\"setting\": \"Ashfall\""));
    }

    #[test]
    fn test_render_skips_absent_facets() {
        let state = GameState::with_todos(TaskList::default());
        let blocks = ContextIndex::render(&state);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Current Todo List:\n(no tasks)");
    }

    #[test]
    fn test_blank_rules_are_skipped() {
        let mut state = GameState::with_todos(TaskList::parse("Train"));
        state.rules = Some("  \n".to_string());
        assert_eq!(ContextIndex::render(&state).len(), 1);
    }

    #[test]
    fn test_query_returns_at_most_k() {
        let embedder = HashEmbedder::new();
        let index = ContextIndex::build(&full_state(), &embedder).unwrap();
        assert_eq!(index.len(), 4);

        for k in 0..6 {
            let blocks = index.query("complete task 1", k, &embedder).unwrap();
            assert_eq!(blocks.len(), k.min(4));
        }
    }

    #[test]
    fn test_query_prefers_matching_facet() {
        let embedder = HashEmbedder::new();
        let index = ContextIndex::build(&full_state(), &embedder).unwrap();

        let top = index.query("Ashfall setting", 1, &embedder).unwrap();
        assert_eq!(top[0].facet, Facet::Campaign);
    }

    #[test]
    fn test_query_is_deterministic() {
        let embedder = HashEmbedder::new();
        let index = ContextIndex::build(&full_state(), &embedder).unwrap();
        let a = index.query("show stats", 3, &embedder).unwrap();
        let b = index.query("show stats", 3, &embedder).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_query_rejected() {
        let embedder = HashEmbedder::new();
        let index = ContextIndex::build(&full_state(), &embedder).unwrap();
        assert!(matches!(
            index.query("  ", 3, &embedder),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_batch_is_transport_error() {
        struct Short;
        impl Embedder for Short {
            fn name(&self) -> &'static str {
                "short"
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0])
            }
            fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
                Ok(vec![vec![1.0]])
            }
        }

        let err = ContextIndex::build(&full_state(), &Short).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
