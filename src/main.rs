use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

use memo::cli::Cli;
use memo::cmd::*;
use memo::config::Config;
use memo::events::EventBus;
use memo::store::{FileBlobStore, TaskStore};

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Logs go to a file; the TUI owns the terminal.
    let _log_guard = init_logging(&config.log_level, &config.log_path());
    tracing::info!(store = %config.store_dir.display(), "memo starting");

    let store = TaskStore::new(FileBlobStore::new(config.store_dir.clone()));
    let bus = EventBus::new();

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(store, &config),

        Commands::List { all, category } => cmd_list(&store, all, category),

        Commands::Add { title, category, due } => cmd_add(&store, title, category, due),

        Commands::View { id } => cmd_view(&open_detail(&store, &bus, id)),

        Commands::Edit { id, title, due, category } =>
            cmd_edit(&mut open_detail(&store, &bus, id), title, due, category),

        Commands::Complete { id } => cmd_set_completed(&mut open_detail(&store, &bus, id), true),

        Commands::Reopen { id } => cmd_set_completed(&mut open_detail(&store, &bus, id), false),

        Commands::Delete { id } => cmd_delete(&mut open_detail(&store, &bus, id)),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so buffered log
/// lines are flushed. When the log file cannot be opened, logging stays off
/// and `None` is returned.
fn init_logging(level: &str, log_path: &Path) -> Option<WorkerGuard> {
    let file_appender = match log_appender(log_path) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {}: {e}", log_path.display());
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Open `log_path` for appending, never rotating.
fn log_appender(log_path: &Path) -> Result<RollingFileAppender, InitError> {
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "memo.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
}
