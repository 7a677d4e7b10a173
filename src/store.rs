//! Persistence for the to-do list.
//!
//! The whole list is the unit of persistence: it is serialized as one JSON
//! blob and kept under [`TASK_LIST_KEY`] in a [`BlobStore`]. Every mutation
//! reads the full list, changes it in memory and writes the full list back.
//! Read and write failures never reach the caller of [`TaskStore::load_all`]
//! or [`TaskStore::save_all`]; they are logged and treated as "no data" or
//! dropped respectively.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::fields::Category;
use crate::task::Task;

/// Key the serialized task list lives under.
pub const TASK_LIST_KEY: &str = "todoListKey";

/// Errors raised by blob storage and (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid task list data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no task id left above {0}")]
    IdsExhausted(u64),
}

/// Opaque byte storage keyed by string.
pub trait BlobStore {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace whatever is stored under `key`.
    fn set(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// Blob store keeping one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err(&tmp))?;
        f.write_all(data).map_err(io_err(&tmp))?;
        f.flush().map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// In-memory blob store. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes directly, bypassing serialization.
    pub fn put_raw(&self, key: &str, data: &[u8]) {
        self.blobs.borrow_mut().insert(key.to_string(), data.to_vec());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(key).cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.put_raw(key, data);
        Ok(())
    }
}

/// Canonical to-do list, loaded and saved as a whole.
#[derive(Debug, Clone)]
pub struct TaskStore<B> {
    blobs: B,
}

impl<B: BlobStore> TaskStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// Load every task. Missing or unreadable data yields an empty list.
    pub fn load_all(&self) -> Vec<Task> {
        let data = match self.blobs.get(TASK_LIST_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Error reading task list, starting fresh: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("Error parsing task list, starting fresh: {e}");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list, reporting failures.
    pub fn try_save_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(tasks)?;
        self.blobs.set(TASK_LIST_KEY, &data)?;
        debug!(count = tasks.len(), "saved task list");
        Ok(())
    }

    /// Overwrite the stored list. Failures are logged and dropped.
    pub fn save_all(&self, tasks: &[Task]) {
        if let Err(e) = self.try_save_all(tasks) {
            warn!("Failed to save task list: {e}");
        }
    }

    /// Get a task by ID.
    pub fn find(&self, id: u64) -> Option<Task> {
        self.load_all().into_iter().find(|t| t.id == id)
    }

    /// Apply `edit` to every task with this ID and persist the list.
    ///
    /// Returns the last edited copy, or `None` (writing nothing) when no task
    /// matched.
    pub fn update(&self, id: u64, mut edit: impl FnMut(&mut Task)) -> Option<Task> {
        let mut tasks = self.load_all();
        let mut updated = None;
        for t in tasks.iter_mut().filter(|t| t.id == id) {
            edit(t);
            updated = Some(t.clone());
        }
        if updated.is_some() {
            self.save_all(&tasks);
        }
        updated
    }

    /// Remove every task with this ID, persist the list, and return how many
    /// were removed.
    pub fn delete(&self, id: u64) -> usize {
        let mut tasks = self.load_all();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        self.save_all(&tasks);
        before - tasks.len()
    }

    /// Append a new open task with the next free ID.
    ///
    /// Fails without writing when the highest stored ID is already `u64::MAX`.
    pub fn insert(&self, title: String, category: Category, due_date: NaiveDateTime) -> Result<Task, StoreError> {
        let mut tasks = self.load_all();
        let id = next_id(&tasks).ok_or(StoreError::IdsExhausted(u64::MAX))?;
        let task = Task {
            id,
            title,
            category,
            is_completed: false,
            due_date,
        };
        tasks.push(task.clone());
        self.save_all(&tasks);
        Ok(task)
    }
}

/// Generate the next available task ID, or `None` once IDs run out.
pub fn next_id(tasks: &[Task]) -> Option<u64> {
    tasks.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1)
}
