use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed to-do list with a task detail screen.
/// Storage defaults to the platform data directory or a path passed via --store.
#[derive(Parser)]
#[command(name = "memo", version, about = "To-do detail view and task list")]
pub struct Cli {
    /// Directory holding the task list.
    #[arg(long, global = true, env = "MEMO_STORE")]
    pub store: Option<PathBuf>,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "MEMO_LOG")]
    pub log_level: Option<String>,

    /// Log file path.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
