//! # memo - to-do detail view
//!
//! A single-screen to-do item detail view backed by a flat, file-stored task
//! list. The detail screen shows one task's title, category, completion state
//! and due date, and lets the user edit or delete it through modal dialogs.
//!
//! ## Layout
//!
//! - [`task`] and [`fields`]: the `Task` record, the closed `Category` set and
//!   the `YYYY-MM-DD HH:mm` due date format.
//! - [`store`]: the task list persisted as one JSON blob under a fixed key,
//!   loaded and rewritten in full on every change.
//! - [`events`]: the publish/subscribe handle screens use to tell each other
//!   that the list changed.
//! - [`presenter`]: the detail screen logic, independent of any UI toolkit.
//! - `tui`: a ratatui front end hosting the list and detail screens.
//!
//! ## Quick Start
//!
//! ```bash
//! memo add "Buy milk" --category Shopping --due "2024-01-01 09:00"
//! memo list
//! memo edit 1 --title "Buy oat milk"
//! memo ui
//! ```
//!
//! Data is stored under the platform data directory (`~/.local/share/memo`
//! on Linux) unless `--store` says otherwise.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod events;
pub mod fields;
pub mod presenter;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod edit_form;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}
