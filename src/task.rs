//! Task data structure.
//!
//! This module defines the `Task` struct, the single entity kept in the
//! persisted to-do list.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::fields::Category;

/// One to-do entry.
///
/// `id` is the only key used to match a task inside the stored list; it is
/// never changed after the task is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub category: Category,
    pub is_completed: bool,
    pub due_date: NaiveDateTime,
}

impl Task {
    /// Position of the two-state completion selector: 0 open, 1 done.
    pub fn completion_segment(&self) -> usize {
        completion_segment(self.is_completed)
    }
}

/// Map a completion flag onto the selector position.
pub fn completion_segment(is_completed: bool) -> usize {
    if is_completed { 1 } else { 0 }
}
