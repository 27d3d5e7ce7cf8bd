//! Game session pipeline.
//!
//! A session owns the loaded state and its index and runs each utterance
//! through explicit stages:
//!
//! ```text
//! retrieve -> assemble -> narrate -> edits -> persist -> rebuild index
//! ```
//!
//! The first four leave the state untouched ([`GameSession::process`]); the
//! caller decides whether to apply the proposed edits before calling
//! [`GameSession::save`]. The index is built on first use and rebuilt whenever
//! it lags behind the state, so an unreachable embedder fails single commands
//! rather than the whole session.

use crate::embedding::Embedder;
use crate::llm::LlmProvider;
use crate::models::{ContextBlock, Facet, GameState};
use crate::services::context_index::ContextIndex;
use crate::services::edits::ProposedEdits;
use crate::services::prompt;
use crate::storage::traits::StateStore;
use crate::{Error, Result};
use std::time::Instant;

/// Result of processing one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// The narrator's reply, verbatim.
    pub narrative: String,
    /// State replacements found in the reply.
    pub edits: ProposedEdits,
    /// Facets that were handed to the narrator, best first.
    pub retrieved: Vec<Facet>,
}

/// A loaded game with its collaborators.
pub struct GameSession<S, E, P> {
    store: S,
    embedder: E,
    provider: P,
    state: GameState,
    index: Option<ContextIndex>,
    retrieval_k: usize,
    dirty: bool,
}

impl<S, E, P> GameSession<S, E, P>
where
    S: StateStore,
    E: Embedder,
    P: LlmProvider,
{
    /// Number of blocks retrieved per utterance unless configured.
    pub const DEFAULT_RETRIEVAL_K: usize = 3;

    /// Loads the state. The index is built by the first retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or [`Error::Parse`] if the state cannot be
    /// loaded.
    pub fn start(store: S, embedder: E, provider: P) -> Result<Self> {
        let state = store.load()?;

        tracing::info!(
            embedder = embedder.name(),
            provider = provider.name(),
            tasks = state.todos.len(),
            "Game session started"
        );

        Ok(Self {
            store,
            embedder,
            provider,
            state,
            index: None,
            retrieval_k: Self::DEFAULT_RETRIEVAL_K,
            dirty: false,
        })
    }

    /// Sets how many blocks are retrieved per utterance.
    #[must_use]
    pub const fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    /// Returns the blocks most relevant to `input`, building the index first
    /// if it is missing or older than the state.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is blank or the embedder fails.
    pub fn retrieve(&mut self, input: &str) -> Result<Vec<ContextBlock>> {
        self.refresh_index()?;
        match &self.index {
            Some(index) => index.query(input, self.retrieval_k, &self.embedder),
            None => Ok(Vec::new()),
        }
    }

    fn refresh_index(&mut self) -> Result<()> {
        if self.index.is_some() && !self.dirty {
            return Ok(());
        }
        let index = ContextIndex::build(&self.state, &self.embedder)?;
        tracing::debug!(blocks = index.len(), "Refreshed context index");
        self.index = Some(index);
        self.dirty = false;
        Ok(())
    }

    /// Runs one utterance through retrieval, prompting, and narration.
    ///
    /// Nothing is applied or written; see [`Self::apply_edits`] and
    /// [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank input and
    /// [`Error::Transport`] if embedding or narration fails.
    pub fn process(&mut self, input: &str) -> Result<CommandOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput("Empty command".to_string()));
        }

        let start = Instant::now();
        let blocks = self.retrieve(input)?;
        let prompt = prompt::assemble(&blocks, input);

        tracing::debug!(
            blocks = blocks.len(),
            prompt_len = prompt.len(),
            "Assembled prompt"
        );

        let narrative = self.provider.complete(&prompt).inspect_err(|e| {
            tracing::debug!(provider = self.provider.name(), error = %e, "Narration failed");
        })?;
        let edits = ProposedEdits::from_response(&narrative);

        tracing::info!(
            response_len = narrative.len(),
            proposed_edits = !edits.is_empty(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Processed command"
        );

        Ok(CommandOutcome {
            narrative,
            retrieved: blocks.iter().map(|b| b.facet).collect(),
            edits,
        })
    }

    /// Applies proposed edits to the in-memory state.
    ///
    /// Returns true if the state changed. The index is refreshed on the next
    /// [`Self::save`] or retrieval.
    pub fn apply_edits(&mut self, edits: ProposedEdits) -> bool {
        if !edits.changes(&self.state) {
            return false;
        }
        tracing::info!(edits = %edits.summary(), "Applying narrator edits");
        edits.apply(&mut self.state);
        self.dirty = true;
        true
    }

    /// Writes the state back and refreshes the index if the state changed.
    ///
    /// Failures are logged and otherwise ignored so the session can continue;
    /// an index that could not be rebuilt is retried by the next retrieval.
    /// Returns true if the files were written.
    pub fn save(&mut self) -> bool {
        let saved = match self.store.save(&self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save game state");
                false
            },
        };

        let refreshed = if self.dirty { self.refresh_index() } else { Ok(()) };
        if let Err(e) = refreshed {
            tracing::warn!(error = %e, "Failed to rebuild context index");
        }

        saved
    }

    /// Reads the task list as currently stored on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_task_file(&self) -> Result<String> {
        self.store.read_task_file()
    }

    /// Returns the in-memory state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the index, if one has been built.
    #[must_use]
    pub const fn index(&self) -> Option<&ContextIndex> {
        self.index.as_ref()
    }

    /// Returns how many blocks are retrieved per utterance.
    #[must_use]
    pub const fn retrieval_k(&self) -> usize {
        self.retrieval_k
    }
}
