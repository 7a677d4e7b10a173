//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between the
//! task list, the task detail screen and its edit/delete dialogs.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::events::{EventBus, Subscription};
use crate::fields::format_due;
use crate::presenter::{DetailPresenter, EditOutcome, Navigation};
use crate::store::{BlobStore, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::{category_color, DARK_GREEN, DARK_RED, GOLD},
    edit_form::{EditForm, CATEGORY_ORDER, DUE_ORDER, TITLE_ORDER},
    enums::AppState,
    utils::centered_rect,
};

/// Main application state for the terminal user interface.
pub struct App<B> {
    state: AppState,
    help_return: AppState,
    store: TaskStore<B>,
    bus: EventBus,
    list_events: Subscription,
    tasks: Vec<Task>,
    task_list_state: TableState,
    show_completed: bool,
    detail: Option<DetailPresenter<B>>,
    edit_form: Option<EditForm>,
    status_message: String,
    poll_timeout: Duration,
}

impl<B: BlobStore + Clone> App<B> {
    /// Create a new App instance showing the list stored in `store`.
    pub fn new(store: TaskStore<B>) -> Self {
        let bus = EventBus::new();
        let list_events = bus.subscribe();
        let mut app = App {
            state: AppState::TaskList,
            help_return: AppState::TaskList,
            store,
            bus,
            list_events,
            tasks: Vec::new(),
            task_list_state: TableState::default(),
            show_completed: true,
            detail: None,
            edit_form: None,
            status_message: String::new(),
            poll_timeout: Duration::from_millis(50),
        };
        app.refresh_tasks();
        app
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn detail(&self) -> Option<&DetailPresenter<B>> {
        self.detail.as_ref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Reload the visible list from the store, keeping the selection in range.
    fn refresh_tasks(&mut self) {
        let show_completed = self.show_completed;
        self.tasks = self
            .store
            .load_all()
            .into_iter()
            .filter(|t| show_completed || !t.is_completed)
            .collect();
        let selected = match (self.task_list_state.selected(), self.tasks.len()) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) => Some(0),
        };
        self.task_list_state.select(selected);
    }

    fn selected_task(&self) -> Option<&Task> {
        self.task_list_state.selected().and_then(|i| self.tasks.get(i))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// React to change notifications posted since the last tick.
    pub fn pump_events(&mut self) {
        let events = self.list_events.drain();
        if !events.is_empty() {
            debug!(?events, "task list changed, reloading");
            self.refresh_tasks();
        }
        if let Some(detail) = self.detail.as_mut() {
            detail.pump_events();
        }
    }

    fn open_detail(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        let mut presenter = DetailPresenter::with_task(self.store.clone(), self.bus.clone(), task);
        presenter.will_appear();
        self.detail = Some(presenter);
        self.state = AppState::TaskDetail;
    }

    /// Leave the detail screen for the list.
    fn close_detail(&mut self) {
        self.detail = None;
        self.edit_form = None;
        self.state = AppState::TaskList;
        self.refresh_tasks();
    }

    /// Handle keyboard input on the task list.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.tasks.is_empty() {
                    let i = self.task_list_state.selected().map_or(0, |i| (i + 1) % self.tasks.len());
                    self.task_list_state.select(Some(i));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.tasks.is_empty() {
                    let i = match self.task_list_state.selected() {
                        Some(0) | None => self.tasks.len() - 1,
                        Some(i) => i - 1,
                    };
                    self.task_list_state.select(Some(i));
                }
            }
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('c') => {
                self.show_completed = !self.show_completed;
                self.refresh_tasks();
                self.set_status_message(if self.show_completed {
                    "Showing completed tasks"
                } else {
                    "Hiding completed tasks"
                });
            }
            KeyCode::Char('h') => {
                self.help_return = self.state;
                self.state = AppState::Help;
            }
            _ => {}
        }
        false
    }

    /// Handle keyboard input on the detail screen.
    fn handle_detail_input(&mut self, key: KeyCode) {
        let Some(detail) = self.detail.as_mut() else {
            self.close_detail();
            return;
        };
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.close_detail(),
            KeyCode::Char('e') => {
                if let Some(draft) = detail.begin_edit() {
                    self.edit_form = Some(EditForm::from_draft(&draft));
                    self.state = AppState::EditTask;
                }
            }
            KeyCode::Char('d') => {
                if detail.current().is_some() {
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Left => {
                detail.select_completion_segment(0);
            }
            KeyCode::Right => {
                detail.select_completion_segment(1);
            }
            KeyCode::Char(' ') => {
                let segment = detail.view().completion_segment;
                detail.select_completion_segment(1 - segment);
            }
            KeyCode::Char('h') => {
                self.help_return = self.state;
                self.state = AppState::Help;
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the edit dialog.
    fn handle_form_input(&mut self, key: KeyCode) {
        let Some(form) = self.edit_form.as_mut() else {
            self.state = AppState::TaskDetail;
            return;
        };
        match key {
            KeyCode::Esc => {
                self.edit_form = None;
                self.state = AppState::TaskDetail;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left => form.handle_left_right(false),
            KeyCode::Right => form.handle_left_right(true),
            KeyCode::Up => form.handle_up_down(true),
            KeyCode::Down => form.handle_up_down(false),
            KeyCode::PageUp => form.handle_page(true),
            KeyCode::PageDown => form.handle_page(false),
            KeyCode::Backspace => form.handle_backspace(),
            KeyCode::Delete => form.handle_delete(),
            KeyCode::Char(c) => form.handle_char(c),
            KeyCode::Enter => self.commit_edit(),
            _ => {}
        }
    }

    fn commit_edit(&mut self) {
        let (Some(form), Some(detail)) = (self.edit_form.as_ref(), self.detail.as_mut()) else {
            return;
        };
        match detail.commit_edit(form.submission()) {
            EditOutcome::Committed(task) => {
                self.edit_form = None;
                self.state = AppState::TaskDetail;
                self.set_status_message(format!("Updated task #{}", task.id));
            }
            EditOutcome::InvalidDueDate => {
                // Keep the dialog open so the rest of the input survives.
                self.set_status_message("Due date must look like YYYY-MM-DD HH:mm");
            }
            EditOutcome::Missing | EditOutcome::NoCurrentTask => {
                self.edit_form = None;
                self.state = AppState::TaskDetail;
                self.set_status_message("Task no longer exists");
            }
        }
    }

    /// Handle keyboard input in the delete confirmation.
    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let navigation = self
                    .detail
                    .as_mut()
                    .map_or(Navigation::Back, |d| d.commit_delete());
                match navigation {
                    Navigation::Back => {
                        self.close_detail();
                        self.set_status_message("Deleted.");
                    }
                    Navigation::Stay => self.state = AppState::TaskDetail,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskDetail;
            }
            _ => {}
        }
    }

    /// Route a key press to the active screen. Returns true to quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return true;
        }
        self.status_message.clear();
        match self.state {
            AppState::TaskList => return self.handle_task_list_input(key),
            AppState::TaskDetail => self.handle_detail_input(key),
            AppState::EditTask => self.handle_form_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
            AppState::Help => {
                self.state = self.help_return;
                if self.state == AppState::TaskDetail {
                    if let Some(detail) = self.detail.as_mut() {
                        detail.will_appear();
                    }
                }
            }
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(self.poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    /// Render the task list table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let header = Row::new(vec!["ID", "Done", "Category", "Due", "Title"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = self
            .tasks
            .iter()
            .map(|t| {
                let style = if t.is_completed {
                    Style::default().fg(GOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    t.id.to_string(),
                    if t.is_completed { "x".into() } else { String::new() },
                    t.category.label().to_string(),
                    format_due(t.due_date),
                    t.title.clone(),
                ])
                .style(style)
            })
            .collect();
        let widths = [
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(17),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title("Todo").borders(Borders::ALL))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    /// Render the detail screen from the presenter's view.
    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(detail) = self.detail.as_ref() else {
            return;
        };
        let view = detail.view();
        let accent = detail
            .current()
            .map_or(Color::Gray, |t| category_color(t.category));

        let segment = |label: &'static str, index: usize| {
            if view.completion_segment == index {
                Span::styled(
                    format!(" {label} "),
                    Style::default().fg(Color::Black).bg(GOLD).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(format!(" {label} "))
            }
        };

        let text = vec![
            Line::from(Span::styled(
                view.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(view.category.clone(), Style::default().fg(accent))),
            Line::from(""),
            Line::from(vec![segment("Open", 0), Span::raw("|"), segment("Done", 1)]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Due: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(view.due.clone()),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Todo Detail").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the edit dialog over the detail screen.
    fn render_edit_form(&mut self, f: &mut Frame, area: Rect) {
        let Some(form) = self.edit_form.as_ref() else {
            return;
        };
        let area = centered_rect(60, 50, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .title("Edit Todo")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_GREEN));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        f.render_widget(Paragraph::new("Edit the details of your todo."), chunks[0]);

        let fields = [
            (TITLE_ORDER, "Title", &form.title),
            (DUE_ORDER, "Due (↑↓ day, PgUp/PgDn hour, [ ] 15m)", &form.due),
            (CATEGORY_ORDER, "Category (←→ to pick)", &form.category),
        ];
        for (order, label, field) in fields {
            let style = if form.current_field == order {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let widget = Paragraph::new(field.value.as_str())
                .block(Block::default().title(label).borders(Borders::ALL).border_style(style));
            let rect = chunks[order + 1];
            f.render_widget(widget, rect);
            if field.active && order != CATEGORY_ORDER {
                // Keep the cursor inside the box for values wider than the field.
                let max_col = rect.width.saturating_sub(2);
                let col = u16::try_from(field.cursor).unwrap_or(u16::MAX).min(max_col);
                f.set_cursor_position((rect.x.saturating_add(1).saturating_add(col), rect.y + 1));
            }
        }

        f.render_widget(
            Paragraph::new("Enter to save, Esc to cancel, Tab for next field").alignment(Alignment::Center),
            chunks[4],
        );
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Delete")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to delete this todo?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press 'y' to delete, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(Span::styled("Task list", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  ↑/↓ j/k   move selection"),
            Line::from("  Enter     open task"),
            Line::from("  c         show/hide completed"),
            Line::from("  q Esc     quit"),
            Line::from(""),
            Line::from(Span::styled("Task detail", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  e         edit"),
            Line::from("  d         delete"),
            Line::from("  ←/→ Space completion"),
            Line::from("  q Esc     back"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        let paragraph = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!("Tasks: {} | Press 'h' for help", self.tasks.len()),
                state => state.title().to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(DARK_GREEN).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::EditTask => {
                self.render_task_detail(f, chunks[0]);
                self.render_edit_form(f, chunks[0]);
            }
            AppState::Confirm => {
                self.render_task_detail(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    pub fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> io::Result<()> {
        loop {
            self.pump_events();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
