//! Persistence of the planning week.
//!
//! The week is stored as one JSON document under a single key. Backends only
//! move strings; [`encode_week`] and [`decode_week`] own the document shape.

pub mod json_store;
mod memory;

pub use json_store::FileBackend;
pub use memory::MemoryBackend;

use crate::error::AppError;
use crate::model::{Day, Priority, Task, WeekData};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Key the week document is stored under.
pub const STORAGE_KEY: &str = "week-planner-todos";

/// Key-value store holding serialized documents.
pub trait PersistenceBackend {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    fn write(&self, key: &str, value: &str) -> Result<(), AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: String,
    text: String,
    completed: bool,
    created_at: String,
    #[serde(default)]
    priority: Priority,
}

impl StoredTask {
    fn from_task(task: &Task) -> Result<Self, AppError> {
        let created_at = task
            .created_at
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        Ok(Self {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            created_at,
            priority: task.priority,
        })
    }

    fn into_task(self) -> Result<Task, AppError> {
        let created_at = OffsetDateTime::parse(&self.created_at, &Rfc3339).map_err(|_| {
            AppError::invalid_data(format!("createdAt of task {} must be RFC3339", self.id))
        })?;
        Ok(Task {
            id: self.id,
            text: self.text,
            completed: self.completed,
            created_at,
            priority: self.priority,
        })
    }
}

/// Serializes every day of `week`, empty ones included.
pub fn encode_week(week: &WeekData) -> Result<String, AppError> {
    let mut stored = BTreeMap::new();
    for (day, tasks) in week.iter() {
        let tasks = tasks
            .iter()
            .map(StoredTask::from_task)
            .collect::<Result<Vec<_>, _>>()?;
        stored.insert(day, tasks);
    }
    Ok(serde_json::to_string(&stored)?)
}

/// Rebuilds a week from its stored form.
///
/// Days absent from the document come back empty. Unknown day keys, wrong
/// field types, bad timestamps and ids repeated across the week are rejected.
pub fn decode_week(content: &str) -> Result<WeekData, AppError> {
    let stored: BTreeMap<Day, Vec<StoredTask>> = serde_json::from_str(content)?;
    let mut week = WeekData::empty();
    let mut seen = HashSet::new();

    for (day, tasks) in stored {
        for stored_task in tasks {
            if !seen.insert(stored_task.id.clone()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate task id {}",
                    stored_task.id
                )));
            }
            week.day_mut(day).push(stored_task.into_task()?);
        }
    }

    Ok(week)
}

#[cfg(test)]
mod tests {
    use super::{decode_week, encode_week};
    use crate::model::{Day, Priority, Task, WeekData};
    use time::macros::datetime;

    fn sample_week() -> WeekData {
        let mut week = WeekData::empty();
        let mut done = Task::new("ship it", Priority::High, datetime!(2025-12-20 08:30:15.123456789 UTC));
        done.completed = true;
        week.day_mut(Day::Monday).push(done);
        week.day_mut(Day::Monday)
            .push(Task::new("review", Priority::Low, datetime!(2025-12-21 09:00 UTC)));
        week.day_mut(Day::Sunday)
            .push(Task::new("rest", Priority::Medium, datetime!(2025-12-22 10:00 UTC)));
        week
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let week = sample_week();
        let decoded = decode_week(&encode_week(&week).unwrap()).unwrap();
        assert_eq!(decoded, week);
    }

    #[test]
    fn round_trip_of_empty_week() {
        let decoded = decode_week(&encode_week(&WeekData::empty()).unwrap()).unwrap();
        assert_eq!(decoded, WeekData::empty());
    }

    #[test]
    fn encoded_document_lists_all_days_with_camel_case_fields() {
        let encoded = encode_week(&sample_week()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();

        for day in Day::ALL {
            assert!(value[day.key()].is_array(), "missing {day}");
        }
        let first = &value["monday"][0];
        assert_eq!(first["text"], "ship it");
        assert_eq!(first["completed"], true);
        assert_eq!(first["priority"], "high");
        assert_eq!(first["createdAt"], "2025-12-20T08:30:15.123456789Z");
    }

    #[test]
    fn decodes_browser_style_document() {
        let content = r#"{
            "monday": [
                {"id": "a1", "text": "Buy milk", "completed": false,
                 "createdAt": "2025-12-20T08:00:00.000Z", "priority": "low"}
            ],
            "tuesday": [], "wednesday": [], "thursday": [],
            "friday": [], "saturday": [], "sunday": []
        }"#;

        let week = decode_week(content).unwrap();
        let monday = week.day(Day::Monday);
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].id, "a1");
        assert_eq!(monday[0].priority, Priority::Low);
        assert_eq!(monday[0].created_at, datetime!(2025-12-20 08:00 UTC));
    }

    #[test]
    fn missing_days_and_priority_fall_back_to_defaults() {
        let content = r#"{"friday": [{"id": "f1", "text": "gym", "completed": true,
            "createdAt": "2025-12-20T08:00:00Z"}]}"#;

        let week = decode_week(content).unwrap();
        assert_eq!(week.day(Day::Friday)[0].priority, Priority::Medium);
        assert!(week.day(Day::Monday).is_empty());
        assert_eq!(week.total_tasks(), 1);
    }

    #[test]
    fn rejects_malformed_documents() {
        for content in [
            "not json",
            "[]",
            r#"{"someday": []}"#,
            r#"{"monday": [{"id": "a", "text": "x", "completed": "yes", "createdAt": "2025-12-20T08:00:00Z"}]}"#,
            r#"{"monday": [{"id": "a", "text": "x", "completed": false, "createdAt": "yesterday"}]}"#,
            r#"{"monday": [{"id": "a", "text": "x", "completed": false, "createdAt": "2025-12-20T08:00:00Z", "priority": "urgent"}]}"#,
        ] {
            let err = decode_week(content).unwrap_err();
            assert_eq!(err.code(), "invalid_data", "accepted {content}");
        }
    }

    #[test]
    fn rejects_ids_repeated_across_days() {
        let content = r#"{
            "monday": [{"id": "dup", "text": "a", "completed": false, "createdAt": "2025-12-20T08:00:00Z"}],
            "tuesday": [{"id": "dup", "text": "b", "completed": false, "createdAt": "2025-12-20T08:00:00Z"}]
        }"#;

        assert_eq!(decode_week(content).unwrap_err().code(), "invalid_data");
    }
}
