//! Task record, creation draft and field validation.
//!
//! # Responsibility
//! - Define the canonical task shape shared by store, snapshot codec and filter.
//! - Reject user input that must never reach the collection.
//!
//! # Invariants
//! - `id` is unique within the collection and never reused after deletion.
//! - `notification_id` is present only while a reminder is scheduled.
//! - `title` is never blank for tasks created through the store.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable task identifier (creation time in epoch milliseconds, bumped for uniqueness).
pub type TaskId = i64;

/// User-selected task priority.
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
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geolocation fix attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both coordinates are finite and inside WGS84 bounds.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TaskValidationError::InvalidField {
                field: "location".to_string(),
                message: format!("latitude {} is out of range", self.latitude),
            });
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TaskValidationError::InvalidField {
                field: "location".to_string(),
                message: format!("longitude {} is out of range", self.longitude),
            });
        }
        Ok(())
    }
}

/// Opaque reference returned by the notification service for one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted task record.
///
/// Serialized with camelCase keys. Optional enrichments are omitted when
/// absent, and unknown keys in stored records are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Free-form label; empty means uncategorized.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    /// Absolute deadline in epoch milliseconds.
    pub deadline: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<NotificationHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Path or URI of a recorded voice clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_note: Option<String>,
    /// Path of the task-scoped copy of an attached document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_file: Option<String>,
}

impl Task {
    /// Builds a fresh task from a draft with the provided id.
    ///
    /// Does not validate the draft; callers run [`TaskDraft::validate`] first.
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            category: draft.category,
            priority: draft.priority,
            deadline: draft.deadline,
            is_checked: false,
            notification_id: None,
            location: None,
            audio_note: None,
            attached_file: None,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category.is_empty()
    }

    pub fn has_reminder(&self) -> bool {
        self.notification_id.is_some()
    }
}

/// Reads an explicit `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// User input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub category: String,
    pub priority: Priority,
    /// Deadline in epoch milliseconds.
    pub deadline: i64,
}

impl TaskDraft {
    /// Creates an uncategorized medium-priority draft.
    pub fn new(title: impl Into<String>, deadline: i64) -> Self {
        Self {
            title: title.into(),
            category: String::new(),
            priority: Priority::default(),
            deadline,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// Rejects empty or whitespace-only titles.
pub fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

/// Validation errors for task input and extras patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trim.
    EmptyTitle,
    /// Patch names a field that cannot be merged.
    UnknownField(String),
    /// Patch value has the wrong shape or is out of range.
    InvalidField { field: String, message: String },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::UnknownField(field) => write!(f, "field cannot be merged: `{field}`"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid value for `{field}`: {message}")
            }
        }
    }
}

impl Error for TaskValidationError {}
