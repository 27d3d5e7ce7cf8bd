//! In-memory game state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};

/// A free-form structured record such as a character sheet or campaign.
///
/// No schema is enforced. The mapping is carried as-is, key order included,
/// and only ever replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Mapping);

impl Record {
    /// Creates a record from a YAML mapping.
    #[must_use]
    pub const fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    /// Parses YAML text into a record.
    ///
    /// Returns `Ok(None)` for an empty or `null` document. A document whose
    /// top level is not a mapping is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not valid YAML or is not a mapping.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Option<Self>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_yaml_ng::from_str(text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;

        match value {
            Value::Null => Ok(None),
            Value::Mapping(mapping) => Ok(Some(Self(mapping))),
            other => Err(Error::Parse {
                path: path.to_path_buf(),
                cause: format!("expected a mapping at the top level, found {}", kind(&other)),
            }),
        }
    }

    /// Serializes the record back to YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if serialization fails.
    pub fn to_yaml(&self, path: &Path) -> Result<String> {
        serde_yaml_ng::to_string(&self.0).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }

    /// Renders the record as indented JSON for prompts.
    ///
    /// Falls back to YAML when a key cannot be expressed in JSON.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0)
            .or_else(|_| serde_yaml_ng::to_string(&self.0))
            .unwrap_or_default()
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Returns the number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// The ordered task list from `todo.txt`.
///
/// Each entry is an opaque line; priority, date, and tag syntax are left to
/// the narrator. Task *N* is the 1-based position in this list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList(Vec<String>);

impl TaskList {
    /// Creates a task list from entries, dropping blank ones.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(Into::into)
                .filter(|line| !line.trim().is_empty())
                .collect(),
        )
    }

    /// Parses newline-delimited text, dropping blank and whitespace-only lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Joins the entries with newlines, without a trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }

    /// Renders the entries with 1-based line numbers for display.
    #[must_use]
    pub fn numbered(&self) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{}. {task}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the tasks as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// The session's game state: the single source of truth between load and save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    /// The character sheet, if a character file was found.
    pub character: Option<Record>,
    /// The campaign description, if a campaign file was found.
    pub campaign: Option<Record>,
    /// The task list.
    pub todos: TaskList,
    /// The rules text, if `rules.md` exists.
    pub rules: Option<String>,
    /// Where the character was read from; saves write back to the same file.
    pub character_path: Option<PathBuf>,
}

impl GameState {
    /// Creates a state holding only a task list.
    #[must_use]
    pub fn with_todos(todos: TaskList) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_list_drops_blank_lines() {
        let todos = TaskList::parse("Buy sword\n\n   \nTrain\n\t\n");
        assert_eq!(todos.as_slice(), ["Buy sword", "Train"]);
    }

    #[test]
    fn test_task_list_handles_crlf() {
        let todos = TaskList::parse("Buy sword\r\nTrain\r\n");
        assert_eq!(todos.as_slice(), ["Buy sword", "Train"]);
    }

    #[test]
    fn test_task_list_text_has_no_trailing_newline() {
        let todos = TaskList::parse("a\nb\n");
        assert_eq!(todos.to_text(), "a\nb");
    }

    #[test]
    fn test_task_numbers_skip_blank_lines() {
        let todos = TaskList::parse("first\n\n  \nsecond");
        assert_eq!(todos.len(), 2);
        assert_eq!(todos.numbered(), "1. first\n2. second");
    }

    #[test]
    fn test_numbered() {
        let todos = TaskList::parse("(A) Slay dragon +quest\nBuy sword");
        assert_eq!(todos.numbered(), "1. (A) Slay dragon +quest\n2. Buy sword");
        assert_eq!(TaskList::default().numbered(), "");
    }

    #[test]
    fn test_new_ignores_blank() {
        let todos = TaskList::new(["  ", "Train", ""]);
        assert_eq!(todos.as_slice(), ["Train"]);
    }

    #[test]
    fn test_record_from_yaml() {
        let path = Path::new("hero.character.yaml");
        let record = Record::from_yaml("name: Thane\nlevel: 3\n", path)
            .unwrap()
            .unwrap();
        assert_eq!(record.get("name"), Some(&Value::String("Thane".to_string())));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_empty_document_is_absent() {
        let path = Path::new("hero.character.yaml");
        assert!(Record::from_yaml("", path).unwrap().is_none());
        assert!(Record::from_yaml("~\n", path).unwrap().is_none());
    }

    #[test]
    fn test_record_rejects_non_mapping() {
        let path = Path::new("hero.character.yaml");
        let err = Record::from_yaml("- a\n- b\n", path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        let err = Record::from_yaml("name: [unclosed", path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_record_yaml_preserves_key_order() {
        let path = Path::new("hero.character.yaml");
        let text = "zeta: 1\nalpha: 2\nmid:\n  inner: true\n";
        let record = Record::from_yaml(text, path).unwrap().unwrap();
        assert_eq!(record.to_yaml(path).unwrap(), text);
    }

    #[test]
    fn test_record_pretty_json() {
        let path = Path::new("camp.campaign.yaml");
        let record = Record::from_yaml("setting: Ashfall\n", path)
            .unwrap()
            .unwrap();
        assert_eq!(record.to_pretty_json(), "{\n  \"setting\": \"Ashfall\"\n}");
    }
}
