//! State store trait.

use crate::Result;
use crate::models::GameState;

/// Reads and writes the game state as a whole.
///
/// Stores are the on-disk side of the session: the in-memory [`GameState`]
/// is authoritative and is written over the files wholesale on every save.
pub trait StateStore: Send + Sync {
    /// Loads the full game state.
    ///
    /// Only a missing task list is an error; every other missing input is
    /// loaded as absent.
    fn load(&self) -> Result<GameState>;

    /// Overwrites the persisted character and task list with `state`.
    ///
    /// The campaign and rules are never written.
    fn save(&self, state: &GameState) -> Result<()>;

    /// Returns the raw contents of the persisted task list.
    fn read_task_file(&self) -> Result<String>;
}
