//! CLI entry point for todolist.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use todolist_app::{ProjectConfig, TaskService};
use todolist_core::Priority;
use todolist_store::FileStore;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// To-do list with derived overdue status.
#[derive(Parser, Debug)]
#[command(
    name = "todolist",
    version,
    about = "todolist: tasks with due dates, priorities and an automatic overdue status"
)]
struct Cli {
    /// Directory holding `.todolist/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Store file to use instead of the configured one.
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new pending task.
    Add {
        #[arg(short = 'd', long)]
        description: String,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Due time, HH:MM.
        #[arg(long)]
        time: String,
        #[arg(short = 'p', long, default_value = "normal")]
        priority: Priority,
    },

    /// List tasks after refreshing overdue status.
    Ls {
        /// Status or priority to keep (repeatable, combined with OR).
        #[arg(short = 'f', long = "filter")]
        filters: Vec<String>,
        /// Sort by time, priority or status (description otherwise).
        #[arg(short = 's', long)]
        sort: Option<String>,
        /// Case-insensitive text to look for in descriptions.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Flip a task between Completed and Pending.
    Toggle {
        /// Task id, or the short id shown by `ls`.
        task: String,
    },

    /// Delete a task.
    Rm {
        /// Task id, or the short id shown by `ls`.
        task: String,
    },

    /// Show one task as JSON.
    Show {
        /// Task id, or the short id shown by `ls`.
        task: String,
    },
}

/// Output layout for `ls`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
    Html,
}

fn main() -> Result<()> {
    let Cli { dir, store, cmd } = Cli::parse();

    install_tracing();

    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::load(&dir)?;
    let store_path = config.store_path(&dir, store.as_deref())?;
    let mut service = TaskService::new(FileStore::open(&store_path), config.storage.key.clone());
    commands::run(cmd, &mut service, &config.view, &mut io::stdout().lock())
}

fn install_tracing() {
    // RUST_LOG overrides the INFO default.
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}
