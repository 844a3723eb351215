use crate::models::{Task, TaskPatch};
use crate::store::TaskStore;

/// Staged edit of one task's free-text fields. Title and description live in
/// buffers until `save`; the committed values stay untouched so the patch can
/// carry only real changes. Bounded-choice fields (priority, due, done) skip
/// staging and go straight to the store.
#[derive(Debug, Clone)]
pub struct RowEditor {
    task_id: String,
    committed_title: String,
    committed_description: String,
    pub title: String,
    pub description: String,
}

impl RowEditor {
    pub fn new(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            committed_title: task.title.clone(),
            committed_description: task.description.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Diff of the trimmed buffers against the committed values. An
    /// empty-after-trim title never makes it into the patch, so saving a
    /// cleared title field leaves the task's title alone.
    pub fn patch(&self) -> TaskPatch {
        let mut patch = TaskPatch::default();
        let title = self.title.trim();
        if !title.is_empty() && title != self.committed_title {
            patch.title = Some(title.to_string());
        }
        let description = self.description.trim();
        if description != self.committed_description {
            patch.description = Some(description.to_string());
        }
        patch
    }

    /// Submits the diff to the store. Returns false when there was nothing to
    /// submit.
    pub fn save(&self, store: &TaskStore) -> bool {
        let patch = self.patch();
        if patch.is_empty() {
            return false;
        }
        store.update(&self.task_id, patch);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn store_with_task() -> (TaskStore, Task) {
        let store = TaskStore::open(Arc::new(MemoryStorage::new()));
        let task = store
            .create("Check open receipts", "morning pass", Priority::Med, None)
            .unwrap();
        (store, task)
    }

    #[test]
    fn patch_contains_only_changed_fields() {
        let (_, task) = store_with_task();
        let mut editor = RowEditor::new(&task);
        editor.title = "Check open receipts and POs".to_string();

        let patch = editor.patch();
        assert_eq!(patch.title.as_deref(), Some("Check open receipts and POs"));
        assert!(patch.description.is_none());
    }

    #[test]
    fn unchanged_buffers_produce_empty_patch() {
        let (store, task) = store_with_task();
        let editor = RowEditor::new(&task);
        assert!(editor.patch().is_empty());
        assert!(!editor.save(&store));
    }

    #[test]
    fn whitespace_only_title_is_dropped_from_patch() {
        let (store, task) = store_with_task();
        let mut editor = RowEditor::new(&task);
        editor.title = "   ".to_string();
        editor.description = "afternoon pass".to_string();

        assert!(editor.save(&store));
        let current = store.get(&task.id).unwrap();
        assert_eq!(current.title, "Check open receipts");
        assert_eq!(current.description, "afternoon pass");
    }

    #[test]
    fn buffers_are_trimmed_before_diffing() {
        let (store, task) = store_with_task();
        let mut editor = RowEditor::new(&task);
        editor.title = "  Check open receipts  ".to_string();
        editor.description = "  morning pass  ".to_string();

        // Trims back to the committed values, so nothing is submitted.
        assert!(editor.patch().is_empty());
        assert!(!editor.save(&store));
    }

    #[test]
    fn description_can_be_cleared() {
        let (store, task) = store_with_task();
        let mut editor = RowEditor::new(&task);
        editor.description = String::new();

        assert!(editor.save(&store));
        assert_eq!(store.get(&task.id).unwrap().description, "");
    }
}
