//! Enumerations and field formats for to-do items.
//!
//! This module defines the closed category set a task may carry and the fixed
//! `YYYY-MM-DD HH:mm` text format used for every human-facing due date, both
//! when displaying it and when reading it back from an edit form.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Pattern shared by [`format_due`] and [`parse_due`].
pub const DUE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Closed set of labels a task can be filed under.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Category {
    #[value(name = "Work")]
    Work,
    #[value(name = "Home")]
    Home,
    #[value(name = "Personal")]
    Personal,
    #[value(name = "Shopping")]
    Shopping,
    #[value(name = "Study")]
    Study,
    #[default]
    #[value(name = "Other")]
    Other,
}

impl Category {
    /// Every category, in picker order.
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Home,
        Category::Personal,
        Category::Shopping,
        Category::Study,
        Category::Other,
    ];

    /// The exact label stored and displayed for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Home => "Home",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Study => "Study",
            Category::Other => "Other",
        }
    }

    /// Position of this category within [`Category::ALL`].
    pub fn index(self) -> usize {
        Category::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when text does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Exact, case-sensitive match against the labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Format a due date for display and for pre-filling edit forms.
pub fn format_due(due: NaiveDateTime) -> String {
    due.format(DUE_FORMAT).to_string()
}

/// Format an optional due date; absent dates render as an empty string.
pub fn format_due_opt(due: Option<NaiveDateTime>) -> String {
    due.map(format_due).unwrap_or_default()
}

/// Parse due date text written in [`DUE_FORMAT`].
pub fn parse_due(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DUE_FORMAT).ok()
}
