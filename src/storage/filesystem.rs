//! Filesystem state store.
//!
//! Layout of the data directory:
//!
//! | File | Access |
//! |------|--------|
//! | `*character.yaml` / `*character.yml` | read, written back to the same path |
//! | `*campaign.yaml` / `*campaign.yml` | read only |
//! | `todo.txt` | read and rewritten; mandatory |
//! | `rules.md` | read only; optional |
//!
//! When several files match a suffix, the first in file-name order wins.

use crate::models::{GameState, Record, TaskList};
use crate::storage::traits::StateStore;
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffixes identifying a character sheet.
pub const CHARACTER_SUFFIXES: &[&str] = &["character.yaml", "character.yml"];

/// Suffixes identifying a campaign description.
pub const CAMPAIGN_SUFFIXES: &[&str] = &["campaign.yaml", "campaign.yml"];

/// The task list file name.
pub const TODO_FILE: &str = "todo.txt";

/// The optional rules file name.
pub const RULES_FILE: &str = "rules.md";

/// Where a character is written when none was loaded.
pub const DEFAULT_CHARACTER_FILE: &str = "character.yaml";

/// State store backed by plain files in one directory.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    data_dir: PathBuf,
}

impl FileStateStore {
    /// Creates a store rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of the task list.
    #[must_use]
    pub fn todo_path(&self) -> PathBuf {
        self.data_dir.join(TODO_FILE)
    }

    /// Creates the data directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn bootstrap(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| Error::OperationFailed {
            operation: "create_data_dir".to_string(),
            cause: format!("{}: {e}", self.data_dir.display()),
        })
    }

    /// Finds the first file (by name) ending in one of `suffixes`.
    fn find_by_suffix(&self, suffixes: &[&str]) -> Result<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_data_dir".to_string(),
                    cause: format!("{}: {e}", self.data_dir.display()),
                });
            },
        };

        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| suffixes.iter().any(|suffix| name.ends_with(suffix)))
            .collect();
        names.sort();

        Ok(names.into_iter().next().map(|name| self.data_dir.join(name)))
    }

    /// Loads a record from the first file matching `suffixes`.
    fn load_record(&self, suffixes: &[&str], facet: &str) -> Result<(Option<Record>, Option<PathBuf>)> {
        let Some(path) = self.find_by_suffix(suffixes)? else {
            tracing::info!(facet, "No {facet} file found");
            return Ok((None, None));
        };

        let text = read_file(&path)?;
        let record = Record::from_yaml(&text, &path)?;
        tracing::debug!(facet, path = %path.display(), fields = record.as_ref().map_or(0, Record::len), "Loaded record");
        Ok((record, Some(path)))
    }

    /// Reads the optional rules file.
    fn load_rules(&self) -> Result<Option<String>> {
        let path = self.data_dir.join(RULES_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No rules file found, using campaign defaults");
                Ok(None)
            },
            Err(e) => Err(Error::OperationFailed {
                operation: "read_rules".to_string(),
                cause: format!("{}: {e}", path.display()),
            }),
        }
    }
}

/// Reads a file that is known to exist.
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::OperationFailed {
                operation: "read_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            }
        }
    })
}

/// Overwrites a file with `contents`.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<GameState> {
        let (character, character_path) = self.load_record(CHARACTER_SUFFIXES, "character")?;
        let (campaign, _) = self.load_record(CAMPAIGN_SUFFIXES, "campaign")?;
        let todos = TaskList::parse(&self.read_task_file()?);
        let rules = self.load_rules()?;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            has_character = character.is_some(),
            has_campaign = campaign.is_some(),
            has_rules = rules.is_some(),
            tasks = todos.len(),
            "Loaded game state"
        );

        Ok(GameState {
            character,
            campaign,
            todos,
            rules,
            character_path,
        })
    }

    fn save(&self, state: &GameState) -> Result<()> {
        // Both files are attempted; the first failure is reported.
        let todos = write_file(&self.todo_path(), &state.todos.to_text());
        let character = state.character.as_ref().map_or(Ok(()), |character| {
            let path = state
                .character_path
                .clone()
                .unwrap_or_else(|| self.data_dir.join(DEFAULT_CHARACTER_FILE));
            write_file(&path, &character.to_yaml(&path)?)
        });
        todos.and(character)?;

        tracing::debug!(
            data_dir = %self.data_dir.display(),
            tasks = state.todos.len(),
            "Saved game state"
        );
        Ok(())
    }

    fn read_task_file(&self) -> Result<String> {
        read_file(&self.todo_path())
    }
}
