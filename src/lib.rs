//! # todo-rpg
//!
//! A role-playing game master for a plain-text todo list.
//!
//! The character sheet, campaign, `todo.txt`, and optional rules are loaded
//! from a data directory, embedded into a small in-memory index, and the
//! facets relevant to each command are handed to a language model which
//! narrates the result as a fantasy adventure.
//!
//! ## Pipeline
//!
//! ```text
//! load -> index -> retrieve -> assemble -> narrate -> edits -> persist
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use todo_rpg::embedding::OllamaEmbedder;
//! use todo_rpg::llm::OllamaClient;
//! use todo_rpg::services::GameSession;
//! use todo_rpg::storage::FileStateStore;
//!
//! let store = FileStateStore::new("./game-data");
//! let mut session = GameSession::start(store, OllamaEmbedder::new(), OllamaClient::new())?;
//! let outcome = session.process("complete task 2")?;
//! println!("{}", outcome.narrative);
//! session.save();
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::RpgConfig;
pub use embedding::Embedder;
pub use llm::LlmProvider;
pub use models::{ContextBlock, Facet, GameState, Record, TaskList};
pub use services::{ContextIndex, GameSession, ProposedEdits};
pub use storage::{FileStateStore, StateStore};

/// Error type for todo-rpg operations.
///
/// | Variant | Raised When | Effect |
/// |---------|-------------|--------|
/// | `NotFound` | `todo.txt` is missing | aborts load |
/// | `Parse` | a YAML record is malformed | aborts load |
/// | `Transport` | the embedding or model endpoint fails | aborts the current command |
/// | `Write` | saving a state file fails | logged, session continues |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A mandatory state file is missing.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The file that was expected.
        path: PathBuf,
    },

    /// A structured-data file could not be parsed.
    #[error("failed to parse {}: {cause}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying parser message.
        cause: String,
    },

    /// The embedding or language-model service failed.
    #[error("{operation} failed: {cause}")]
    Transport {
        /// The remote call that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A state file could not be written.
    #[error("failed to write {}: {cause}", path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A local operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for todo-rpg operations.
pub type Result<T> = std::result::Result<T, Error>;
