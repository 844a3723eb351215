pub mod editor;
pub mod logging;
pub mod models;
pub mod query;
pub mod seeder;
pub mod storage;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::CatalogFile;
use crate::seeder::seed_daily;
use crate::storage::{Storage, StorageError};
use crate::store::TaskStore;

/// One-shot subsystem startup, independent of any UI lifecycle: open the
/// file-backed store under `data_dir`, load the daily catalog (falling back to
/// the built-in routines), and run today's seeding pass.
pub fn initialize(data_dir: PathBuf) -> Result<TaskStore, StorageError> {
    let storage = Storage::new(data_dir);
    storage.ensure_dirs()?;

    let catalog = storage.load_catalog().unwrap_or_default();
    let store = TaskStore::open(Arc::new(storage));
    let today = chrono::Local::now().date_naive();
    seed_daily(&store, &catalog.tasks, today);
    Ok(store)
}

/// Startup against an arbitrary persistence adapter; seeding is the caller's
/// choice of day. Used by tests and embedders that bring their own backend.
pub fn initialize_with(
    storage: Arc<dyn storage::Persistence + Send + Sync>,
    catalog: &CatalogFile,
    today: chrono::NaiveDate,
) -> TaskStore {
    let store = TaskStore::open(storage);
    seed_daily(&store, &catalog.tasks, today);
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    #[test]
    fn initialize_with_seeds_default_catalog_once() {
        let storage = Arc::new(MemoryStorage::new());
        let catalog = CatalogFile::default();
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();

        let store = initialize_with(storage.clone(), &catalog, today);
        assert_eq!(store.tasks().len(), catalog.tasks.len());
        assert!(store.tasks().iter().all(|t| t.due == Some(today)));

        // Re-activation within the same day adds nothing.
        let store = initialize_with(storage, &catalog, today);
        assert_eq!(store.tasks().len(), catalog.tasks.len());
    }
}
