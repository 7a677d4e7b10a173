//! Detail screen logic for a single task.
//!
//! A [`DetailPresenter`] holds a detached copy of the task being shown and
//! turns user actions (edit, delete, completion toggle) into full-list
//! read/modify/write cycles against the [`TaskStore`]. Change notifications go
//! out on the injected [`EventBus`]; the presenter also listens on the same bus
//! so that an update posted by anyone re-renders it.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::events::{EventBus, Subscription, TaskEvent};
use crate::fields::{format_due, format_due_opt, parse_due, Category};
use crate::store::{BlobStore, TaskStore};
use crate::task::{completion_segment, Task};

/// Text projected onto the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailView {
    pub title: String,
    /// `"Category: <label>"`.
    pub category: String,
    /// 0 while open, 1 once completed.
    pub completion_segment: usize,
    /// `YYYY-MM-DD HH:mm`, or empty when there is no task.
    pub due: String,
}

impl DetailView {
    pub fn from_task(task: Option<&Task>) -> Self {
        DetailView {
            title: task.map(|t| t.title.clone()).unwrap_or_default(),
            category: format!("Category: {}", task.map(|t| t.category.label()).unwrap_or("")),
            completion_segment: completion_segment(task.is_some_and(|t| t.is_completed)),
            due: format_due_opt(task.map(|t| t.due_date)),
        }
    }
}

/// Values an edit form opens with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub title: String,
    pub due: String,
    pub category: String,
    /// Starting point for the date picker.
    pub due_date: NaiveDateTime,
}

/// Raw text submitted from an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSubmission {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl From<EditDraft> for EditSubmission {
    fn from(draft: EditDraft) -> Self {
        EditSubmission {
            title: Some(draft.title),
            due_date: Some(draft.due),
            category: Some(draft.category),
        }
    }
}

/// Result of [`DetailPresenter::commit_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The stored task was rewritten; holds the new copy.
    Committed(Task),
    /// Due date text did not parse; nothing was written.
    InvalidDueDate,
    /// The current task is no longer in the stored list; nothing was written.
    Missing,
    /// No task is loaded.
    NoCurrentTask,
}

/// Where the host should navigate after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Back,
}

/// Presenter for the to-do detail screen.
pub struct DetailPresenter<B> {
    store: TaskStore<B>,
    bus: EventBus,
    subscription: Subscription,
    current: Option<Task>,
    view: DetailView,
}

impl<B: BlobStore> DetailPresenter<B> {
    /// Create a presenter with no task loaded, subscribed to `bus`.
    pub fn new(store: TaskStore<B>, bus: EventBus) -> Self {
        let subscription = bus.subscribe();
        DetailPresenter {
            store,
            bus,
            subscription,
            current: None,
            view: DetailView::from_task(None),
        }
    }

    /// Create a presenter showing `task`.
    pub fn with_task(store: TaskStore<B>, bus: EventBus, task: Task) -> Self {
        let mut presenter = Self::new(store, bus);
        presenter.load(task);
        presenter
    }

    /// Replace the displayed task (navigation into the screen).
    pub fn load(&mut self, task: Task) {
        debug!(id = task.id, "detail presenter loaded task");
        self.current = Some(task);
        self.render();
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    /// Direct access to the displayed copy. Changes show up on the next
    /// refresh.
    pub fn current_mut(&mut self) -> Option<&mut Task> {
        self.current.as_mut()
    }

    /// Last rendered projection.
    pub fn view(&self) -> &DetailView {
        &self.view
    }

    /// Project the current task onto the view.
    pub fn render(&mut self) -> &DetailView {
        self.view = DetailView::from_task(self.current.as_ref());
        &self.view
    }

    /// Called whenever the screen is about to become visible again.
    pub fn will_appear(&mut self) -> &DetailView {
        self.render()
    }

    /// Handle pending bus events. Returns true if the view was re-rendered.
    pub fn pump_events(&mut self) -> bool {
        let updated = self
            .subscription
            .drain()
            .into_iter()
            .any(|event| event == TaskEvent::Updated);
        if updated {
            self.render();
        }
        updated
    }

    /// Open an edit form pre-filled from the current task.
    pub fn begin_edit(&self) -> Option<EditDraft> {
        let task = self.current.as_ref()?;
        Some(EditDraft {
            title: task.title.clone(),
            due: format_due(task.due_date),
            category: task.category.label().to_string(),
            due_date: task.due_date,
        })
    }

    /// Commit an edit form.
    ///
    /// The due date must parse or the whole edit is dropped. An unknown
    /// category only drops the category change.
    pub fn commit_edit(&mut self, submission: EditSubmission) -> EditOutcome {
        let Some(id) = self.current.as_ref().map(|t| t.id) else {
            return EditOutcome::NoCurrentTask;
        };

        let due_text = submission.due_date.unwrap_or_default();
        let Some(due_date) = parse_due(&due_text) else {
            warn!(id, due = %due_text, "edit discarded: unparseable due date");
            return EditOutcome::InvalidDueDate;
        };

        let title = submission.title.unwrap_or_default();
        let category = submission.category.unwrap_or_default();
        let category = match category.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(id, "keeping previous category: {e}");
                None
            }
        };

        let updated = self.store.update(id, |t| {
            t.title = title.clone();
            t.due_date = due_date;
            if let Some(c) = category {
                t.category = c;
            }
        });

        match updated {
            Some(task) => {
                info!(id, "task edited");
                self.current = Some(task.clone());
                self.render();
                self.bus.post(TaskEvent::Updated);
                EditOutcome::Committed(task)
            }
            None => {
                warn!(id, "edit target no longer stored");
                EditOutcome::Missing
            }
        }
    }

    /// Delete the current task from the stored list.
    ///
    /// Posts [`TaskEvent::Deleted`] and asks the host to navigate back. Does
    /// nothing when no task is loaded.
    pub fn commit_delete(&mut self) -> Navigation {
        let Some(task) = self.current.take() else {
            return Navigation::Stay;
        };
        let removed = self.store.delete(task.id);
        info!(id = task.id, removed, "task deleted");
        self.render();
        self.bus.post(TaskEvent::Deleted);
        Navigation::Back
    }

    /// Set the completion flag and persist it.
    pub fn set_completed(&mut self, is_completed: bool) -> Option<Task> {
        let id = self.current.as_ref()?.id;
        let task = self.store.update(id, |t| t.is_completed = is_completed)?;
        info!(id, is_completed, "task completion changed");
        self.current = Some(task.clone());
        self.render();
        self.bus.post(TaskEvent::Updated);
        Some(task)
    }

    /// Select a completion segment: 0 open, anything else done.
    pub fn select_completion_segment(&mut self, segment: usize) -> Option<Task> {
        self.set_completed(segment != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn task(id: u64, title: &str, category: Category) -> Task {
        Task {
            id,
            title: title.into(),
            category,
            is_completed: false,
            due_date: at(2023, 8, 10, 12, 0),
        }
    }

    fn setup(tasks: &[Task], current: usize) -> (TaskStore<MemoryBlobStore>, EventBus, DetailPresenter<MemoryBlobStore>) {
        let store = TaskStore::new(MemoryBlobStore::new());
        store.save_all(tasks);
        let bus = EventBus::new();
        let presenter = DetailPresenter::with_task(store.clone(), bus.clone(), tasks[current].clone());
        (store, bus, presenter)
    }

    fn submission(title: &str, due: &str, category: &str) -> EditSubmission {
        EditSubmission {
            title: Some(title.into()),
            due_date: Some(due.into()),
            category: Some(category.into()),
        }
    }

    #[test]
    fn test_render_projects_fields() {
        let mut t = task(1, "A", Category::Work);
        t.is_completed = true;
        let (_, _, p) = setup(&[t], 0);
        assert_eq!(
            p.view(),
            &DetailView {
                title: "A".into(),
                category: "Category: Work".into(),
                completion_segment: 1,
                due: "2023-08-10 12:00".into(),
            }
        );
    }

    #[test]
    fn test_render_without_task_is_blank() {
        let p = DetailPresenter::new(TaskStore::new(MemoryBlobStore::new()), EventBus::new());
        assert_eq!(p.view().title, "");
        assert_eq!(p.view().category, "Category: ");
        assert_eq!(p.view().completion_segment, 0);
        assert_eq!(p.view().due, "");
        assert!(p.begin_edit().is_none());
    }

    #[test]
    fn test_begin_edit_prefills() {
        let (_, _, p) = setup(&[task(1, "A", Category::Home)], 0);
        let draft = p.begin_edit().unwrap();
        assert_eq!(draft.title, "A");
        assert_eq!(draft.due, "2023-08-10 12:00");
        assert_eq!(draft.category, "Home");
        assert_eq!(draft.due_date, at(2023, 8, 10, 12, 0));
    }

    #[test]
    fn test_invalid_due_date_aborts_whole_edit() {
        let (store, bus, mut p) = setup(&[task(1, "A", Category::Work)], 0);
        let observer = bus.subscribe();

        let outcome = p.commit_edit(submission("B", "not-a-date", "Home"));
        assert_eq!(outcome, EditOutcome::InvalidDueDate);

        let stored = store.find(1).unwrap();
        assert_eq!(stored, task(1, "A", Category::Work));
        assert_eq!(p.current(), Some(&stored));
        assert!(observer.drain().is_empty());
    }

    #[test]
    fn test_unknown_category_commits_the_rest() {
        let (store, _, mut p) = setup(&[task(1, "A", Category::Work)], 0);

        let outcome = p.commit_edit(submission("B", "2024-01-01 09:00", "Bogus"));
        let updated = match outcome {
            EditOutcome::Committed(task) => task,
            other => panic!("expected commit, got {other:?}"),
        };

        let stored = store.find(1).unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.title, "B");
        assert_eq!(stored.category, Category::Work);
        assert_eq!(stored.due_date, at(2024, 1, 1, 9, 0));
        assert_eq!(p.view().title, "B");
        assert_eq!(p.view().due, "2024-01-01 09:00");
    }

    #[test]
    fn test_edit_targets_only_current_id() {
        let tasks: Vec<Task> = (1..=7).map(|i| task(i, "t", Category::Study)).collect();
        let (store, _, mut p) = setup(&tasks, 4);

        p.commit_edit(submission("five", "2024-02-02 08:15", "Personal"));

        for (before, after) in tasks.iter().zip(store.load_all()) {
            if after.id == 5 {
                assert_eq!(after.title, "five");
                assert_eq!(after.category, Category::Personal);
            } else {
                assert_eq!(before, &after);
            }
        }
    }

    #[test]
    fn test_missing_title_becomes_empty() {
        let (store, _, mut p) = setup(&[task(1, "A", Category::Work)], 0);
        let outcome = p.commit_edit(EditSubmission {
            title: None,
            due_date: Some("2024-01-01 09:00".into()),
            category: None,
        });
        assert!(matches!(outcome, EditOutcome::Committed(_)));
        let stored = store.find(1).unwrap();
        assert_eq!(stored.title, "");
        assert_eq!(stored.category, Category::Work);
    }

    #[test]
    fn test_edit_of_vanished_task_writes_nothing() {
        let (store, _, mut p) = setup(&[task(1, "A", Category::Work)], 0);
        store.save_all(&[task(2, "other", Category::Home)]);

        let outcome = p.commit_edit(submission("B", "2024-01-01 09:00", "Home"));
        assert_eq!(outcome, EditOutcome::Missing);
        assert_eq!(store.load_all(), vec![task(2, "other", Category::Home)]);
    }

    #[test]
    fn test_edit_posts_updated() {
        let (_, bus, mut p) = setup(&[task(1, "A", Category::Work)], 0);
        let list_screen = bus.subscribe();
        p.commit_edit(submission("B", "2024-01-01 09:00", "Home"));
        assert_eq!(list_screen.drain(), vec![TaskEvent::Updated]);
    }

    #[test]
    fn test_delete_removes_persists_and_posts_deleted() {
        let tasks = vec![
            task(1, "a", Category::Work),
            task(2, "b", Category::Home),
            task(3, "c", Category::Other),
        ];
        let (store, bus, mut p) = setup(&tasks, 1);
        let list_screen = bus.subscribe();

        assert_eq!(p.commit_delete(), Navigation::Back);

        let left = store.load_all();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|t| t.id != 2));
        assert_eq!(list_screen.drain(), vec![TaskEvent::Deleted]);
        assert!(p.current().is_none());
    }

    #[test]
    fn test_delete_without_task_is_noop() {
        let store = TaskStore::new(MemoryBlobStore::new());
        store.save_all(&[task(1, "a", Category::Work)]);
        let bus = EventBus::new();
        let observer = bus.subscribe();
        let mut p = DetailPresenter::new(store.clone(), bus);

        assert_eq!(p.commit_delete(), Navigation::Stay);
        assert_eq!(store.load_all().len(), 1);
        assert!(observer.drain().is_empty());
    }

    #[test]
    fn test_completion_toggle_persists() {
        let (store, bus, mut p) = setup(&[task(1, "a", Category::Work)], 0);
        let observer = bus.subscribe();

        p.select_completion_segment(1).unwrap();
        assert!(store.find(1).unwrap().is_completed);
        assert_eq!(p.view().completion_segment, 1);

        p.select_completion_segment(0).unwrap();
        assert!(!store.find(1).unwrap().is_completed);
        assert_eq!(observer.drain(), vec![TaskEvent::Updated, TaskEvent::Updated]);
    }

    #[test]
    fn test_refresh_rereads_in_memory_copy() {
        let (_, bus, mut p) = setup(&[task(1, "a", Category::Work)], 0);
        if let Some(t) = p.current_mut() {
            t.title = "changed elsewhere".into();
        }
        assert_eq!(p.view().title, "a");

        bus.post(TaskEvent::Deleted);
        assert!(!p.pump_events());
        assert_eq!(p.view().title, "a");

        bus.post(TaskEvent::Updated);
        assert!(p.pump_events());
        assert_eq!(p.view().title, "changed elsewhere");

        p.current_mut().unwrap().title = "again".into();
        assert_eq!(p.will_appear().title, "again");
    }
}
