//! Binary entry point for todo-rpg.
//!
//! With words on the command line, runs them as one command; with none,
//! starts an interactive session.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use std::io;
use std::process::ExitCode;
use todo_rpg::cli::{self, Console, RustylineSource};
use todo_rpg::observability::{self, LoggingConfig};
use todo_rpg::services::GameSession;
use todo_rpg::storage::FileStateStore;
use todo_rpg::{Result, RpgConfig};

/// A role-playing game master for your todo.txt.
#[derive(Parser)]
#[command(name = "todo-rpg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A command for the game master, e.g. `complete task 2`. Omit for an
    /// interactive session.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RpgConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&LoggingConfig::from_settings(&config.logging)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "todo-rpg failed");
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads the game and runs the selected mode.
fn run(cli: &Cli, config: &RpgConfig) -> Result<()> {
    let store = FileStateStore::new(&config.data_dir);
    store.bootstrap()?;

    let embedder = cli::build_embedder(config);
    let narrator = cli::build_llm_client(config);
    let mut session =
        GameSession::start(store, embedder, narrator)?.with_retrieval_k(config.retrieval_k);

    let mut lines = RustylineSource::new()?;
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut console = Console {
        lines: &mut lines,
        out: &mut stdout,
        err: &mut stderr,
        auto_apply: config.auto_apply_edits,
    };

    if cli.command.is_empty() {
        cli::run_interactive(&mut session, &mut console)
    } else {
        cli::run_single(&mut session, &cli.command.join(" "), &mut console)
    }
}
