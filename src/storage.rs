use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{CatalogFile, TasksFile};

const TASKS_FILE: &str = "tasks.json";
const MARKER_FILE: &str = "last_daily.json";
const CATALOG_FILE: &str = "daily_tasks.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// Persistence seam for the task store. The real backend writes JSON files;
/// tests swap in [`MemoryStorage`].
pub trait Persistence {
    fn load_tasks(&self) -> Result<TasksFile, StorageError>;
    fn save_tasks(&self, data: &TasksFile) -> Result<(), StorageError>;
    /// An unreadable or unparseable marker is reported as `None`, not an error.
    fn load_seed_marker(&self) -> Result<Option<NaiveDate>, StorageError>;
    fn save_seed_marker(&self, day: NaiveDate) -> Result<(), StorageError>;
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Daily-template catalog is read-only input; callers fall back to the
    /// built-in catalog when the file is absent or malformed.
    pub fn load_catalog(&self) -> Result<CatalogFile, StorageError> {
        self.load_json(self.root.join(CATALOG_FILE))
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, StorageError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl Persistence for Storage {
    fn load_tasks(&self) -> Result<TasksFile, StorageError> {
        self.load_json(self.root.join(TASKS_FILE))
    }

    fn save_tasks(&self, data: &TasksFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(TASKS_FILE), data)
    }

    fn load_seed_marker(&self) -> Result<Option<NaiveDate>, StorageError> {
        // Serialized as a bare JSON date string; anything else counts as absent.
        Ok(self.load_json::<NaiveDate>(self.root.join(MARKER_FILE)).ok())
    }

    fn save_seed_marker(&self, day: NaiveDate) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(MARKER_FILE), &day)
    }
}

/// In-memory backend for tests and ephemeral sessions. `set_fail_writes`
/// simulates a full storage device.
#[derive(Default)]
pub struct MemoryStorage {
    tasks: Mutex<Option<TasksFile>>,
    marker: Mutex<Option<NaiveDate>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of what would be on disk; used by tests to observe writes.
    pub fn stored_tasks(&self) -> Option<TasksFile> {
        self.tasks.lock().expect("state poisoned").clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("storage full")));
        }
        Ok(())
    }
}

impl Persistence for MemoryStorage {
    fn load_tasks(&self) -> Result<TasksFile, StorageError> {
        self.tasks
            .lock()
            .expect("state poisoned")
            .clone()
            .ok_or_else(|| {
                StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no task data",
                ))
            })
    }

    fn save_tasks(&self, data: &TasksFile) -> Result<(), StorageError> {
        self.check_writable()?;
        *self.tasks.lock().expect("state poisoned") = Some(data.clone());
        Ok(())
    }

    fn load_seed_marker(&self) -> Result<Option<NaiveDate>, StorageError> {
        Ok(*self.marker.lock().expect("state poisoned"))
    }

    fn save_seed_marker(&self, day: NaiveDate) -> Result<(), StorageError> {
        self.check_writable()?;
        *self.marker.lock().expect("state poisoned") = Some(day);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Task};

    fn sample_file() -> TasksFile {
        TasksFile {
            schema_version: 1,
            tasks: vec![Task::new("Check open receipts", "", Priority::Med, None)],
        }
    }

    #[test]
    fn tasks_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");

        let original = sample_file();
        storage.save_tasks(&original).expect("save tasks");
        let loaded = storage.load_tasks().expect("load tasks");
        assert_eq!(loaded.schema_version, original.schema_version);
        assert_eq!(loaded.tasks, original.tasks);
    }

    #[test]
    fn load_tasks_reports_missing_file_as_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        assert!(storage.load_tasks().is_err());
    }

    #[test]
    fn load_tasks_reports_corrupt_json_as_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");
        fs::write(dir.path().join(TASKS_FILE), "{not json").expect("write garbage");
        assert!(matches!(
            storage.load_tasks(),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn seed_marker_round_trips_and_tolerates_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");

        assert_eq!(storage.load_seed_marker().expect("load marker"), None);

        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        storage.save_seed_marker(day).expect("save marker");
        assert_eq!(storage.load_seed_marker().expect("load marker"), Some(day));

        fs::write(dir.path().join(MARKER_FILE), "\"02/01/2025\"").expect("write garbage");
        assert_eq!(storage.load_seed_marker().expect("load marker"), None);
    }

    #[test]
    fn catalog_loads_from_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");

        assert!(storage.load_catalog().is_err());

        let json = r#"{ "tasks": [ { "title": "Walk the dock", "priority": "High" } ] }"#;
        fs::write(dir.path().join(CATALOG_FILE), json).expect("write catalog");
        let catalog = storage.load_catalog().expect("load catalog");
        assert_eq!(catalog.tasks.len(), 1);
        assert_eq!(catalog.tasks[0].title, "Walk the dock");
        assert_eq!(catalog.tasks[0].priority, Priority::High);
    }

    #[test]
    fn memory_storage_simulates_write_failure() {
        let storage = MemoryStorage::new();
        storage.save_tasks(&sample_file()).expect("save ok");
        storage.set_fail_writes(true);
        assert!(storage.save_tasks(&sample_file()).is_err());
        assert!(storage
            .save_seed_marker(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap())
            .is_err());
        // The previously stored snapshot is untouched.
        assert!(storage.stored_tasks().is_some());
    }
}
