//! State edits proposed by the narrator.
//!
//! The narrator returns changed files as fenced blocks tagged with the file
//! name. Each block replaces its facet wholesale; nothing is merged.

use crate::models::{GameState, Record, TaskList};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Fenced blocks: info string in group 1, body in group 2.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*```[ \t]*([A-Za-z0-9_.\-]+)[ \t]*\r?\n([\s\S]*?)^[ \t]*```")
        .unwrap_or_else(|_| unreachable!())
});

/// A display-numbered task line: `3. task` or `3) task`.
static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)[.)]\s+(.*)$").unwrap_or_else(|_| unreachable!()));

/// Replacements extracted from a narrator reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposedEdits {
    /// Replacement task list.
    pub todos: Option<TaskList>,
    /// Replacement character sheet.
    pub character: Option<Record>,
}

impl ProposedEdits {
    /// Extracts edits from a narrator reply.
    ///
    /// The last block of each kind wins. Character blocks that are not a YAML
    /// mapping are dropped with a warning.
    #[must_use]
    pub fn from_response(response: &str) -> Self {
        let mut edits = Self::default();

        for caps in FENCED_BLOCK.captures_iter(response) {
            let tag = caps[1].to_lowercase();
            let body = &caps[2];

            if tag == "todo.txt" {
                edits.todos = Some(parse_task_block(body));
            } else if tag.ends_with("character.yaml") || tag.ends_with("character.yml") {
                match Record::from_yaml(body, Path::new(&tag)) {
                    Ok(Some(record)) => edits.character = Some(record),
                    Ok(None) => tracing::warn!("Ignoring empty character block"),
                    Err(e) => tracing::warn!(error = %e, "Ignoring malformed character block"),
                }
            }
        }

        edits
    }

    /// Returns true if the reply proposed no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.todos.is_none() && self.character.is_none()
    }

    /// Returns true if applying would change `state`.
    #[must_use]
    pub fn changes(&self, state: &GameState) -> bool {
        self.todos.as_ref().is_some_and(|t| *t != state.todos)
            || self
                .character
                .as_ref()
                .is_some_and(|c| state.character.as_ref() != Some(c))
    }

    /// One-line description for the approval prompt.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(todos) = &self.todos {
            parts.push(format!("todo.txt ({} tasks)", todos.len()));
        }
        if self.character.is_some() {
            parts.push("character sheet".to_string());
        }
        parts.join(", ")
    }

    /// Replaces the affected facets of `state`.
    pub fn apply(self, state: &mut GameState) {
        if let Some(todos) = self.todos {
            state.todos = todos;
        }
        if let Some(character) = self.character {
            state.character = Some(character);
        }
    }
}

/// Parses a `todo.txt` block, stripping display numbering if every line has it.
fn parse_task_block(body: &str) -> TaskList {
    let lines: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();

    let stripped: Option<Vec<String>> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let caps = NUMBERED_LINE.captures(line)?;
            let number: usize = caps[1].parse().ok()?;
            (number == i + 1).then(|| caps[2].to_string())
        })
        .collect();

    match stripped {
        Some(tasks) if !tasks.is_empty() => TaskList::new(tasks),
        _ => TaskList::new(lines),
    }
}
