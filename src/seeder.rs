use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{DailyTemplate, Task};
use crate::store::TaskStore;

/// Injects the recurring daily templates once per calendar day. Returns the
/// number of tasks added.
///
/// The marker alone is not enough: the collection write and the marker write
/// are separate, so a rerun after a half-failed pass must still not duplicate.
/// The case-insensitive title set over tasks already due today covers that.
pub fn seed_daily(store: &TaskStore, catalog: &[DailyTemplate], today: NaiveDate) -> usize {
    if store.last_seeded() == Some(today) {
        return 0;
    }

    let existing: HashSet<String> = store
        .tasks()
        .iter()
        .filter(|task| task.due == Some(today))
        .map(|task| task.title.to_lowercase())
        .collect();

    let batch: Vec<Task> = catalog
        .iter()
        .filter(|template| {
            let key = template.title.trim().to_lowercase();
            !key.is_empty() && !existing.contains(&key)
        })
        .map(|template| {
            Task::new(
                template.title.trim(),
                template.description.trim(),
                template.priority,
                Some(today),
            )
        })
        .collect();

    let added = batch.len();
    if added > 0 {
        store.prepend(batch);
        log::info!("daily seed added {added} task(s) for {today}");
    }
    store.mark_seeded(today);
    added
}
