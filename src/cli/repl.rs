//! Command loop.
//!
//! Single-command and interactive modes share one path: process the utterance,
//! show the narrative, ask before applying edits, then save.

use crate::embedding::Embedder;
use crate::llm::LlmProvider;
use crate::services::GameSession;
use crate::storage::traits::StateStore;
use crate::{Error, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use std::io::Write;

/// Prompt shown before each interactive line.
pub const PROMPT: &str = "⚔️ > ";

/// Question asked before narrator edits are applied.
pub const APPROVAL_PROMPT: &str = "Apply these changes? [y/N] ";

/// Static command summary printed by `help`.
pub const HELP_TEXT: &str = r#"
📜 AVAILABLE COMMANDS:
- "add task: morning workout @fitness !25 💪"
- "complete task 5" or "done 5"
- "update task 3 progress 10"
- "show stats" or "show character"
- "show todos" or "list tasks"
- "change priority of task 7 to A"
- "help" - show this help
- "exit" - quit the game
"#;

const BANNER: &str = "🎮 TodoTxtAiRPG Interactive Mode\n\
Type 'exit' to quit, 'help' for commands\n\n\
Complete tasks to gain XP and level up your character!\n";

const FAREWELL: &str = "🏰 I bid thee adieu, brave adventurer! Until next time!";

/// A source of input lines.
pub trait LineSource {
    /// Reads one line, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Terminal input with line editing and history.
pub struct RustylineSource {
    editor: DefaultEditor,
}

impl RustylineSource {
    /// Opens the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the line editor cannot be initialised.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| Error::OperationFailed {
            operation: "init_readline".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self { editor })
    }
}

impl LineSource for RustylineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    note_history(self.editor.add_history_entry(line.as_str()));
                }
                Ok(Some(line))
            },
            // Ctrl-C drops the line but keeps the session.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(Error::OperationFailed {
                operation: "readline".to_string(),
                cause: e.to_string(),
            }),
        }
    }
}

/// Returns whether the line entered history.
fn note_history(result: rustyline::Result<bool>) -> bool {
    result.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Failed to record history");
        false
    })
}

/// Pre-recorded input, for scripting and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    /// Creates a source yielding `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns how many lines have not been read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Commands handled by the loop itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// Print the command summary.
    Help,
    /// End the session.
    Exit,
}

impl MetaCommand {
    /// Recognises a meta-command, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "help" => Some(Self::Help),
            "exit" | "quit" | "goodbye" | "bye" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Where the loop writes and what it asks.
pub struct Console<'a> {
    /// Input lines and approval answers.
    pub lines: &'a mut dyn LineSource,
    /// Narrative and informational output.
    pub out: &'a mut dyn Write,
    /// Diagnostics.
    pub err: &'a mut dyn Write,
    /// Apply edits without asking.
    pub auto_apply: bool,
}

impl Console<'_> {
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").map_err(output_error)
    }

    fn warn(&mut self, text: &str) -> Result<()> {
        writeln!(self.err, "{text}").map_err(output_error)
    }

    fn approve(&mut self, summary: &str) -> Result<bool> {
        if self.auto_apply {
            return Ok(true);
        }
        self.say(&format!("📝 Proposed changes: {summary}"))?;
        self.out.flush().map_err(output_error)?;
        let answer = self.lines.read_line(APPROVAL_PROMPT)?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn output_error(e: std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}

/// Processes one utterance: narrate, confirm edits, save.
///
/// # Errors
///
/// Returns an error if processing fails; nothing is saved in that case.
pub fn handle_command<S, E, P>(
    session: &mut GameSession<S, E, P>,
    input: &str,
    console: &mut Console<'_>,
) -> Result<()>
where
    S: StateStore,
    E: Embedder,
    P: LlmProvider,
{
    let outcome = session.process(input)?;
    console.say(&format!("\n{}\n", outcome.narrative))?;

    let edits = outcome.edits;
    if edits.changes(session.state()) {
        let summary = edits.summary();
        if console.approve(&summary)? {
            session.apply_edits(edits);
            console.say("✅ Changes applied.")?;
        } else {
            tracing::info!(edits = %summary, "Narrator edits declined");
            console.say("Changes discarded.")?;
        }
    }

    session.save();
    Ok(())
}

/// Runs one command and returns.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run_single<S, E, P>(
    session: &mut GameSession<S, E, P>,
    command: &str,
    console: &mut Console<'_>,
) -> Result<()>
where
    S: StateStore,
    E: Embedder,
    P: LlmProvider,
{
    tracing::debug!(command, "Single-command mode");
    handle_command(session, command, console)
}

/// Runs the interactive loop until `exit` or end of input.
///
/// Command failures are reported and the loop continues.
///
/// # Errors
///
/// Returns an error only if input or output itself fails.
pub fn run_interactive<S, E, P>(
    session: &mut GameSession<S, E, P>,
    console: &mut Console<'_>,
) -> Result<()>
where
    S: StateStore,
    E: Embedder,
    P: LlmProvider,
{
    console.say(BANNER)?;

    loop {
        let Some(line) = console.lines.read_line(PROMPT)? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match MetaCommand::parse(input) {
            Some(MetaCommand::Exit) => break,
            Some(MetaCommand::Help) => console.say(HELP_TEXT)?,
            None => {
                if let Err(e) = handle_command(session, input, console) {
                    tracing::debug!(error = %e, "Command failed");
                    console.warn(&format!("❌ Error: {e}"))?;
                }
            },
        }
    }

    farewell(session, console)
}

fn farewell<S, E, P>(session: &GameSession<S, E, P>, console: &mut Console<'_>) -> Result<()>
where
    S: StateStore,
    E: Embedder,
    P: LlmProvider,
{
    console.say(FAREWELL)?;
    match session.read_task_file() {
        Ok(contents) => console.say(&format!("\nYour current todo.txt:\n{contents}")),
        Err(e) => console.warn(&format!("Could not read todo.txt: {e}")),
    }
}
