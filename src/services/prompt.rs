//! Prompt assembly.
//!
//! Merges retrieved context and the user's utterance into the game-master
//! template. Pure: no I/O, identical inputs give identical prompts.

use crate::models::ContextBlock;
use once_cell::sync::Lazy;
use regex::Regex;

/// Template variables: `{{name}}`.
static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap_or_else(|_| unreachable!()));

/// The game-master instruction template.
///
/// `{{context}}` receives the retrieved blocks, `{{input}}` the raw utterance.
pub const GAME_MASTER_TEMPLATE: &str = r#"
You are a TodoTxtAiRPG Game Master managing a gamified todo.txt system.

CURRENT GAME STATE:
{{context}}

AVAILABLE COMMANDS:
- Add tasks: "add task: [description]"
- Complete tasks: "complete task [number]" or "done [number]"
- Update progress: "update task [number] progress [amount]"
- Show status: "show stats", "show todos", "show character"
- Modify tasks: "change priority of task [number] to [A-F]"

Task numbers are 1-based positions in the current todo list.

USER INPUT: {{input}}

Respond as an epic fantasy game master. If this involves game mechanics:
1. Update the appropriate files (character.yaml, todo.txt)
2. Narrate the action using encounter descriptions from the campaign
3. Award XP and treasure as appropriate
4. Show updated character stats if relevant, with the change for each stat

If this is just a question, answer helpfully in character.

To update a file, end your reply with the complete new file in a fenced block
tagged with its name, one block per file:

```todo.txt
(A) first task
second task
```

```character.yaml
name: ...
```

Only include files that changed. Always write the full file, never a diff.

IMPORTANT: Always show line numbers with the todo list for easy reference, but don't put line numbers in todo.txt.
"#;

/// Joins retrieved blocks into the context section of the prompt.
#[must_use]
pub fn format_context(blocks: &[ContextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the narrator prompt from retrieved context and the user's input.
#[must_use]
pub fn assemble(blocks: &[ContextBlock], user_input: &str) -> String {
    render(GAME_MASTER_TEMPLATE, &format_context(blocks), user_input)
}

/// Substitutes `{{context}}` and `{{input}}` in one pass.
///
/// Values are never re-scanned, so braces inside a task or the utterance are
/// left alone.
fn render(template: &str, context: &str, input: &str) -> String {
    VARIABLE_PATTERN
        .replace_all(template, |caps: &regex::Captures| match &caps[1] {
            "context" => context.to_string(),
            "input" => input.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
