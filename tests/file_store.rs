//! End-to-end detail screen behaviour against the file-backed store.

use chrono::{NaiveDate, NaiveDateTime};

use memo::events::{EventBus, TaskEvent};
use memo::fields::Category;
use memo::presenter::{DetailPresenter, EditOutcome, EditSubmission, Navigation};
use memo::store::{BlobStore, FileBlobStore, StoreError, TaskStore, TASK_LIST_KEY};
use memo::task::Task;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
}

fn task(id: u64, title: &str, category: Category) -> Task {
    Task {
        id,
        title: title.into(),
        category,
        is_completed: false,
        due_date: at(2023, 8, 2, 10, 0),
    }
}

#[test]
fn test_never_written_directory_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileBlobStore::new(dir.path().join("missing")));
    assert!(store.load_all().is_empty());
}

#[test]
fn test_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    std::fs::write(blobs.path_for(TASK_LIST_KEY), "definitely not json").unwrap();
    assert!(TaskStore::new(blobs).load_all().is_empty());
}

#[test]
fn test_unreadable_blob_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    std::fs::create_dir(blobs.path_for(TASK_LIST_KEY)).unwrap();

    assert!(matches!(blobs.get(TASK_LIST_KEY), Err(StoreError::Io { .. })));
    assert!(TaskStore::new(blobs).load_all().is_empty());
}

#[test]
fn test_save_failure_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, "occupied").unwrap();
    let store = TaskStore::new(FileBlobStore::new(not_a_dir.join("store")));
    let tasks = [task(1, "A", Category::Work)];

    store.save_all(&tasks);
    assert!(matches!(store.try_save_all(&tasks), Err(StoreError::Io { .. })));
    assert!(store.load_all().is_empty());
    assert_eq!(std::fs::read_to_string(&not_a_dir).unwrap(), "occupied");
}

#[test]
fn test_writes_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    let first = TaskStore::new(FileBlobStore::new(dir.path().join("nested")));
    let added = first.insert("Walk dog".into(), Category::Home, at(2024, 5, 1, 7, 30)).unwrap();

    let second = TaskStore::new(FileBlobStore::new(dir.path().join("nested")));
    assert_eq!(second.load_all(), vec![added]);
    assert!(!dir.path().join("nested").join("todoListKey.json.tmp").exists());
}

#[test]
fn test_blob_layout_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FileBlobStore::new(dir.path());
    TaskStore::new(blobs.clone()).save_all(&[task(1, "A", Category::Work)]);

    let raw = blobs.get(TASK_LIST_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json[0]["isCompleted"], false);
    assert_eq!(json[0]["dueDate"], "2023-08-02T10:00:00");
    assert_eq!(json[0]["category"], "Work");
}

#[test]
fn test_edit_then_delete_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileBlobStore::new(dir.path()));
    store.save_all(&[
        task(1, "A", Category::Work),
        task(2, "B", Category::Study),
        task(3, "C", Category::Other),
    ]);

    let bus = EventBus::new();
    let list_screen = bus.subscribe();
    let mut presenter = DetailPresenter::with_task(store.clone(), bus.clone(), store.find(1).unwrap());

    let outcome = presenter.commit_edit(EditSubmission {
        title: Some("B".into()),
        due_date: Some("not-a-date".into()),
        category: Some("Home".into()),
    });
    assert_eq!(outcome, EditOutcome::InvalidDueDate);
    assert_eq!(store.find(1).unwrap(), task(1, "A", Category::Work));

    let outcome = presenter.commit_edit(EditSubmission {
        title: Some("B".into()),
        due_date: Some("2024-01-01 09:00".into()),
        category: Some("Bogus".into()),
    });
    assert!(matches!(outcome, EditOutcome::Committed(_)));
    let stored = store.find(1).unwrap();
    assert_eq!(stored.title, "B");
    assert_eq!(stored.category, Category::Work);
    assert_eq!(stored.due_date, at(2024, 1, 1, 9, 0));
    assert_eq!(list_screen.drain(), vec![TaskEvent::Updated]);

    assert_eq!(presenter.commit_delete(), Navigation::Back);
    let left = store.load_all();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|t| t.id != 1));
    assert_eq!(list_screen.drain(), vec![TaskEvent::Deleted]);

    assert_eq!(presenter.commit_delete(), Navigation::Stay);
}
