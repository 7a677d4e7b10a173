//! Enumerations for TUI state management.

/// Screen currently shown by the terminal user interface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    EditTask,
    Confirm,
    Help,
}

impl AppState {
    /// Label shown in the status bar.
    pub fn title(self) -> &'static str {
        match self {
            AppState::TaskList => "Tasks",
            AppState::TaskDetail => "Task Details",
            AppState::EditTask => "Edit Todo",
            AppState::Confirm => "Delete",
            AppState::Help => "Help",
        }
    }
}
