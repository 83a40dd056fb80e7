//! # Drillboard
//!
//! Terminal task board for drilling-site field activities, with a period
//! report and an optional AI-written executive summary.
//!
//! ## Usage
//!
//! Run without arguments to open the interactive board:
//!
//! ```bash
//! drillboard
//! # or explicitly
//! drillboard ui
//! ```
//!
//! #### Board Key Bindings
//!
//! *   `q`: Quit
//! *   `Tab`: Switch between Board and Report
//! *   `←`/`→` (`h`/`l`): Change column
//! *   `↑`/`↓` (`k`/`j`): Select task
//! *   `]` / `[`: Advance / move back the selected task
//! *   `a`: Add task, `e`: Edit title, `c`: Edit category, `n`: Edit quantity
//! *   `d`: Delete selected task (confirm with `y`)
//! *   `s` (Report): Generate executive summary
//!
//! **Command line**
//! ```bash
//! drillboard add "DDH-001 tramo 1" --category perf_pq --quantity 42.5
//! drillboard start 1
//! drillboard done 1
//! drillboard list
//! drillboard report --from 2025-03-01 --to 2025-03-31
//! drillboard summary
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory (`drillboard/tasks.json`).
//! Override with `DRILLBOARD_DB`. The summary service reads its key from
//! `GEMINI_API_KEY` (or `API_KEY`); a `.env` file is honoured.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use drillboard::commands::*;
use drillboard::config::Config;
use drillboard::error::BoardResult;
use drillboard::models::{TaskPatch, TaskStatus};
use drillboard::storage::TaskStore;
use drillboard::tui::run_tui;

#[derive(Parser)]
#[command(name = "drillboard")]
#[command(about = "Field activity board for drilling sites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Category id or name (see `categories`)
        #[arg(short, long)]
        category: String,
        /// Quantity in the category's unit
        #[arg(short, long, default_value_t = 0.0)]
        quantity: f64,
        /// Free-text notes
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List tasks by column
    List {
        /// Only show one column (pending, in-progress, done)
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    /// Edit a task
    Edit {
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New category id or name
        #[arg(short, long)]
        category: Option<String>,
        /// New quantity
        #[arg(short, long)]
        quantity: Option<f64>,
        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    /// Move a task to a column (pending, in-progress, done)
    Move {
        id: u64,
        status: TaskStatus,
    },
    /// Start a task (move to in-progress)
    Start {
        id: u64,
    },
    /// Mark a task as done
    Done {
        id: u64,
    },
    /// Send a task back to pending
    Reset {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Consolidated report of completed work (defaults to the current month)
    Report {
        /// First day, YYYY-MM-DD
        #[arg(short, long)]
        from: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Report plus an AI-written executive summary
    Summary {
        /// First day, YYYY-MM-DD
        #[arg(short, long)]
        from: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(short, long)]
        to: Option<String>,
    },
    /// List known categories and their units
    Categories,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive board
    Ui,
}

fn init_logging(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli, config: Config) -> BoardResult<()> {
    let store = TaskStore::new(&config.db_path);
    match cli.command {
        Some(Commands::Add { title, category, quantity, description }) => {
            cmd_add(&store, title, category, quantity, description, false).map(|_| ())
        }
        Some(Commands::List { status }) => {
            cmd_list(&store, status);
            Ok(())
        }
        Some(Commands::Edit { id, title, category, quantity, description, status }) => {
            let patch = TaskPatch { title, category, quantity, description, status };
            cmd_edit(&store, id, patch, false)
        }
        Some(Commands::Move { id, status }) => cmd_move(&store, id, status, false),
        Some(Commands::Start { id }) => cmd_move(&store, id, TaskStatus::InProgress, false),
        Some(Commands::Done { id }) => cmd_move(&store, id, TaskStatus::Done, false),
        Some(Commands::Reset { id }) => cmd_move(&store, id, TaskStatus::Pending, false),
        Some(Commands::Remove { id }) => cmd_remove(&store, id, false),
        Some(Commands::Report { from, to }) => cmd_report(&store, from, to),
        Some(Commands::Summary { from, to }) => {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            rt.block_on(cmd_summary(&store, &config, from, to))
        }
        Some(Commands::Categories) => {
            cmd_categories();
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "drillboard", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(store, &config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    // The board owns the terminal; log lines would tear the screen.
    if !matches!(cli.command, Some(Commands::Ui) | None) {
        init_logging(&config.log_filter);
    }
    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
