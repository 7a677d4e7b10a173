//! Command implementations for the CLI interface.
//!
//! Every command that changes a task goes through a [`DetailPresenter`], so
//! the command line applies exactly the same edit and delete rules as the
//! detail screen.

use std::io;

use chrono::{Local, NaiveDateTime, Timelike};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::config::Config;
use crate::events::EventBus;
use crate::fields::{format_due, parse_due, Category};
use crate::presenter::{DetailPresenter, EditOutcome, EditSubmission, Navigation};
use crate::store::{BlobStore, TaskStore};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// List tasks.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Only show this category.
        #[arg(long, value_enum)]
        category: Option<Category>,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        #[arg(long, value_enum, default_value_t = Category::Other)]
        category: Category,
        /// Due date as "YYYY-MM-DD HH:mm". Defaults to now.
        #[arg(long)]
        due: Option<String>,
    },

    /// Show the detail view of a task.
    View {
        id: u64,
    },

    /// Edit a task. Omitted fields keep their current values.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        /// Due date as "YYYY-MM-DD HH:mm".
        #[arg(long)]
        due: Option<String>,
        /// One of the category labels; anything else leaves the category as is.
        #[arg(long)]
        category: Option<String>,
    },

    /// Mark a task done.
    Complete {
        id: u64,
    },

    /// Mark a task not done.
    Reopen {
        id: u64,
    },

    /// Delete a task.
    Delete {
        id: u64,
    },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn cmd_ui<B: BlobStore + Clone>(store: TaskStore<B>, config: &Config) {
    if let Err(e) = run_tui(store, config.poll_timeout) {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}

pub fn cmd_list<B: BlobStore>(store: &TaskStore<B>, all: bool, category: Option<Category>) {
    let tasks: Vec<Task> = store
        .load_all()
        .into_iter()
        .filter(|t| all || !t.is_completed)
        .filter(|t| category.map_or(true, |c| t.category == c))
        .collect();
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    print_table(&tasks);
}

pub fn cmd_add<B: BlobStore>(store: &TaskStore<B>, title: String, category: Category, due: Option<String>) {
    let due_date = match due {
        Some(text) => parse_due(&text).unwrap_or_else(|| {
            eprintln!("Unrecognised due date '{text}'. Use YYYY-MM-DD HH:mm.");
            std::process::exit(1);
        }),
        None => now_to_minute(),
    };
    match store.insert(title, category, due_date) {
        Ok(task) => println!("Added task {}", task.id),
        Err(e) => {
            eprintln!("Could not add task: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_view<B: BlobStore>(presenter: &DetailPresenter<B>) {
    let view = presenter.view();
    println!("Title:        {}", view.title);
    println!("{}", view.category);
    println!("Completed:    {}", if view.completion_segment == 1 { "yes" } else { "no" });
    println!("Due:          {}", view.due);
}

pub fn cmd_edit<B: BlobStore>(
    presenter: &mut DetailPresenter<B>,
    title: Option<String>,
    due: Option<String>,
    category: Option<String>,
) {
    let Some(draft) = presenter.begin_edit() else {
        eprintln!("No task loaded.");
        std::process::exit(1);
    };
    let mut submission = EditSubmission::from(draft);
    if title.is_some() { submission.title = title; }
    if due.is_some() { submission.due_date = due; }
    if category.is_some() { submission.category = category; }
    match presenter.commit_edit(submission) {
        EditOutcome::Committed(task) => {
            println!("Updated task {}", task.id);
            cmd_view(presenter);
        }
        EditOutcome::InvalidDueDate => {
            eprintln!("Unrecognised due date. Use YYYY-MM-DD HH:mm. Nothing was changed.");
            std::process::exit(1);
        }
        EditOutcome::Missing | EditOutcome::NoCurrentTask => {
            eprintln!("Task no longer exists.");
            std::process::exit(1);
        }
    }
}

pub fn cmd_set_completed<B: BlobStore>(presenter: &mut DetailPresenter<B>, is_completed: bool) {
    match presenter.set_completed(is_completed) {
        Some(task) if is_completed => println!("Completed task {}", task.id),
        Some(task) => println!("Reopened task {}", task.id),
        None => {
            eprintln!("Task no longer exists.");
            std::process::exit(1);
        }
    }
}

pub fn cmd_delete<B: BlobStore>(presenter: &mut DetailPresenter<B>) {
    let id = presenter.current().map(|t| t.id);
    match (presenter.commit_delete(), id) {
        (Navigation::Back, Some(id)) => println!("Deleted task {id}."),
        _ => println!("Nothing to delete."),
    }
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Load the task with `id` into a fresh presenter, or exit.
pub fn open_detail<B: BlobStore + Clone>(store: &TaskStore<B>, bus: &EventBus, id: u64) -> DetailPresenter<B> {
    let Some(task) = store.find(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    DetailPresenter::with_task(store.clone(), bus.clone(), task)
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!("{:<5} {:<4} {:<10} {:<16} {}", "ID", "Done", "Category", "Due", "Title");
    for t in tasks {
        println!(
            "{:<5} {:<4} {:<10} {:<16} {}",
            t.id,
            if t.is_completed { "x" } else { "" },
            t.category.label(),
            format_due(t.due_date),
            t.title
        );
    }
}

/// Current local time with seconds dropped.
pub fn now_to_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
