use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Med,
    High,
}

impl Priority {
    /// Rank used by the sort comparator; higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Med => 2,
            Priority::Low => 1,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Priority::Low => "Low",
            Priority::Med => "Med",
            Priority::High => "High",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
    pub created_at: Timestamp,
}

impl Task {
    pub fn new(title: &str, description: &str, priority: Priority, due: Option<NaiveDate>) -> Self {
        Self {
            id: new_task_id(),
            title: title.to_string(),
            description: description.to_string(),
            priority,
            due,
            done: false,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// Partial edit over a task's mutable fields. `due` is doubly optional so
/// "clear the date" and "leave it alone" stay distinct.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<Option<NaiveDate>>,
    pub done: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due.is_none()
            && self.done.is_none()
    }
}

/// Recurring-task template from the daily catalog. The catalog is external
/// read-only configuration; missing fields fall back leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyTemplate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TasksFile {
    pub schema_version: u32,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogFile {
    pub tasks: Vec<DailyTemplate>,
}

impl Default for CatalogFile {
    fn default() -> Self {
        // Built-in receiving routines, used when no daily_tasks.json overrides them.
        Self {
            tasks: vec![
                DailyTemplate {
                    title: "Check open receipts".to_string(),
                    description: "Review receipts from yesterday still waiting on putaway"
                        .to_string(),
                    priority: Priority::Med,
                },
                DailyTemplate {
                    title: "Verify ASN queue".to_string(),
                    description: "Match advance ship notices against today's dock schedule"
                        .to_string(),
                    priority: Priority::High,
                },
                DailyTemplate {
                    title: "Count pallets in staging".to_string(),
                    description: String::new(),
                    priority: Priority::Med,
                },
                DailyTemplate {
                    title: "Clear damage hold area".to_string(),
                    description: "Disposition anything sitting in damage hold".to_string(),
                    priority: Priority::Low,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ranks_high_over_med_over_low() {
        assert_eq!(Priority::High.rank(), 3);
        assert_eq!(Priority::Med.rank(), 2);
        assert_eq!(Priority::Low.rank(), 1);
        assert_eq!(Priority::default(), Priority::Med);
    }

    #[test]
    fn priority_serializes_as_catalog_labels() {
        assert_eq!(
            serde_json::to_value(Priority::High).expect("serialize priority"),
            serde_json::json!("High")
        );
        let back: Priority = serde_json::from_str("\"Low\"").expect("deserialize priority");
        assert_eq!(back, Priority::Low);
    }

    #[test]
    fn task_serde_applies_defaults_for_missing_optional_fields() {
        let json = r#"
        {
          "id": "t1",
          "title": "task",
          "created_at": 1
        }
        "#;

        let task: Task = serde_json::from_str(json).expect("task should deserialize");
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Med);
        assert_eq!(task.due, None);
        assert!(!task.done);
    }

    #[test]
    fn task_due_round_trips_as_iso_date() {
        let mut task = Task::new("t", "", Priority::Med, None);
        task.due = Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        let value = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(value["due"], serde_json::json!("2025-01-15"));
        let back: Task = serde_json::from_value(value).expect("deserialize task");
        assert_eq!(back.due, task.due);
    }

    #[test]
    fn template_defaults_description_and_priority() {
        let json = r#"{ "title": "Check open receipts" }"#;
        let template: DailyTemplate = serde_json::from_str(json).expect("template deserializes");
        assert_eq!(template.description, "");
        assert_eq!(template.priority, Priority::Med);
    }

    #[test]
    fn task_ids_are_distinct() {
        let a = new_task_id();
        let b = new_task_id();
        assert_ne!(a, b);
    }

    #[test]
    fn default_catalog_has_nonempty_titles() {
        let catalog = CatalogFile::default();
        assert!(!catalog.tasks.is_empty());
        assert!(catalog.tasks.iter().all(|t| !t.title.trim().is_empty()));
    }
}
