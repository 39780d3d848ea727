use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::invalid_input(format!(
                "priority must be low, medium or high (got '{}')",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: OffsetDateTime,
    pub priority: Priority,
}

impl Task {
    /// Builds a fresh, incomplete task stamped with `created_at`.
    pub fn new(text: &str, priority: Priority, created_at: OffsetDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.trim().to_string(),
            completed: false,
            created_at,
            priority,
        }
    }

    /// Applies the supplied fields, returning whether anything changed.
    pub fn apply(&mut self, update: &TaskUpdate) -> bool {
        let before = (self.text.clone(), self.completed, self.priority);
        if let Some(text) = update.text.as_deref() {
            self.text = text.trim().to_string();
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        before != (self.text.clone(), self.completed, self.priority)
    }
}

/// Partial update of a [`Task`]. Identity and creation time are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }
}
