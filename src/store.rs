use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::models::{Priority, Task, TaskPatch, TasksFile};
use crate::storage::Persistence;

const SCHEMA_VERSION: u32 = 1;

/// Owns the task collection and the daily seeding marker. Every mutation
/// rewrites the whole collection through the persistence adapter; a failed
/// write is logged and swallowed, leaving the in-memory state authoritative
/// for the rest of the session.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<Vec<Task>>>,
    storage: Arc<dyn Persistence + Send + Sync>,
}

impl TaskStore {
    /// Loads whatever valid state exists. A missing file, unparseable JSON,
    /// or a schema-version mismatch all degrade to an empty collection.
    pub fn open(storage: Arc<dyn Persistence + Send + Sync>) -> Self {
        let tasks = storage
            .load_tasks()
            .ok()
            .filter(|file| file.schema_version == SCHEMA_VERSION)
            .map(|file| file.tasks)
            .unwrap_or_default();
        Self {
            inner: Arc::new(Mutex::new(tasks)),
            storage,
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.clone()
    }

    pub fn tasks_file(&self) -> TasksFile {
        TasksFile {
            schema_version: SCHEMA_VERSION,
            tasks: self.tasks(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.iter().find(|t| t.id == id).cloned()
    }

    /// Inserts a new task at the head of the collection. An empty-after-trim
    /// title rejects the whole create and nothing is persisted.
    pub fn create(
        &self,
        title: &str,
        description: &str,
        priority: Priority,
        due: Option<NaiveDate>,
    ) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            log::debug!("create rejected: empty title");
            return None;
        }
        let mut task = Task::new(title, description.trim(), priority, due);
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            // created_at only breaks sort ties; nudge it past the current
            // maximum so same-millisecond creations stay ordered.
            let floor = guard.iter().map(|t| t.created_at).max().unwrap_or(0);
            if task.created_at <= floor {
                task.created_at = floor + 1;
            }
            guard.insert(0, task.clone());
            guard.clone()
        };
        self.persist(snapshot);
        Some(task)
    }

    /// Applies a partial patch to the matching task; unknown ids are a no-op.
    /// An empty-after-trim title in the patch is dropped so an edit can never
    /// erase an existing title.
    pub fn update(&self, id: &str, patch: TaskPatch) {
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let Some(task) = guard.iter_mut().find(|t| t.id == id) else {
                return;
            };
            if let Some(title) = patch.title {
                let trimmed = title.trim();
                if !trimmed.is_empty() {
                    task.title = trimmed.to_string();
                }
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due) = patch.due {
                task.due = due;
            }
            if let Some(done) = patch.done {
                task.done = done;
            }
            guard.clone()
        };
        self.persist(snapshot);
    }

    pub fn remove(&self, id: &str) {
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            guard.retain(|task| task.id != id);
            guard.clone()
        };
        self.persist(snapshot);
    }

    pub fn toggle_done(&self, id: &str) {
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let Some(task) = guard.iter_mut().find(|t| t.id == id) else {
                return;
            };
            task.done = !task.done;
            guard.clone()
        };
        self.persist(snapshot);
    }

    pub fn clear_completed(&self) {
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            guard.retain(|task| !task.done);
            guard.clone()
        };
        self.persist(snapshot);
    }

    /// Splices a batch in front of the existing collection, keeping the
    /// batch's own order. Used by the daily seeder; one write for the whole
    /// merge.
    pub fn prepend(&self, batch: Vec<Task>) {
        if batch.is_empty() {
            return;
        }
        let snapshot = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let mut floor = guard.iter().map(|t| t.created_at).max().unwrap_or(0);
            let mut merged = batch;
            for task in &mut merged {
                if task.created_at <= floor {
                    task.created_at = floor + 1;
                }
                floor = task.created_at;
            }
            merged.extend(guard.drain(..));
            *guard = merged;
            guard.clone()
        };
        self.persist(snapshot);
    }

    pub fn last_seeded(&self) -> Option<NaiveDate> {
        self.storage.load_seed_marker().ok().flatten()
    }

    pub fn mark_seeded(&self, day: NaiveDate) {
        if let Err(error) = self.storage.save_seed_marker(day) {
            log::warn!("seed marker save failed: {error}");
        }
    }

    fn persist(&self, tasks: Vec<Task>) {
        let file = TasksFile {
            schema_version: SCHEMA_VERSION,
            tasks,
        };
        if let Err(error) = self.storage.save_tasks(&file) {
            log::warn!("task save failed, keeping in-memory state: {error}");
        }
    }
}
