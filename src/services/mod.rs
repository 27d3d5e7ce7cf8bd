//! Game services.
//!
//! Services sit between the state store and the command loop and carry the
//! context pipeline.

pub mod context_index;
pub mod edits;
pub mod prompt;
pub mod session;

pub use context_index::ContextIndex;
pub use edits::ProposedEdits;
pub use session::{CommandOutcome, GameSession};
