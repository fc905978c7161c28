//! Typed extras patches merged into an existing task.
//!
//! # Responsibility
//! - Describe each mergeable enrichment as an explicit variant.
//! - Validate a patch per kind before any field is touched.
//!
//! # Invariants
//! - Merging preserves every field the patch does not mention.
//! - `Generic` never touches `id`, `deadline`, `isChecked` or `notificationId`;
//!   those change only through dedicated store operations.

use crate::model::task::{validate_title, Location, Priority, Task, TaskValidationError};
use serde_json::Value;
use std::collections::BTreeMap;

const GENERIC_TITLE: &str = "title";
const GENERIC_CATEGORY: &str = "category";
const GENERIC_PRIORITY: &str = "priority";

/// One mergeable enrichment for a task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskExtras {
    Location(Location),
    /// Recorder-provided clip reference (path or URI).
    AudioNote(String),
    /// Path of the task-scoped attachment copy.
    AttachedFile(String),
    /// Field map restricted to `title`, `category` and `priority`.
    Generic(BTreeMap<String, Value>),
}

impl TaskExtras {
    /// Stable kind label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Location(_) => "location",
            Self::AudioNote(_) => "audio_note",
            Self::AttachedFile(_) => "attached_file",
            Self::Generic(_) => "generic",
        }
    }

    /// Validates this patch and applies it to `task`.
    ///
    /// On error `task` is left unchanged.
    pub fn apply_to(&self, task: &mut Task) -> Result<(), TaskValidationError> {
        match self {
            Self::Location(location) => {
                location.validate()?;
                task.location = Some(*location);
            }
            Self::AudioNote(reference) => {
                task.audio_note = Some(require_reference("audioNote", reference)?);
            }
            Self::AttachedFile(reference) => {
                task.attached_file = Some(require_reference("attachedFile", reference)?);
            }
            Self::Generic(fields) => {
                let patch = GenericPatch::parse(fields)?;
                if let Some(title) = patch.title {
                    task.title = title;
                }
                if let Some(category) = patch.category {
                    task.category = category;
                }
                if let Some(priority) = patch.priority {
                    task.priority = priority;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct GenericPatch {
    title: Option<String>,
    category: Option<String>,
    priority: Option<Priority>,
}

impl GenericPatch {
    fn parse(fields: &BTreeMap<String, Value>) -> Result<Self, TaskValidationError> {
        let mut patch = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                GENERIC_TITLE => {
                    let title = value.as_str().ok_or_else(|| invalid(key, "expected string"))?;
                    validate_title(title)?;
                    patch.title = Some(title.to_string());
                }
                GENERIC_CATEGORY => {
                    patch.category = match value {
                        Value::Null => Some(String::new()),
                        Value::String(category) => Some(category.clone()),
                        _ => return Err(invalid(key, "expected string or null")),
                    };
                }
                GENERIC_PRIORITY => {
                    let priority = serde_json::from_value::<Priority>(value.clone())
                        .map_err(|_| invalid(key, "expected low|medium|high"))?;
                    patch.priority = Some(priority);
                }
                other => return Err(TaskValidationError::UnknownField(other.to_string())),
            }
        }
        Ok(patch)
    }
}

fn require_reference(field: &str, reference: &str) -> Result<String, TaskValidationError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "resource reference must not be blank"));
    }
    Ok(trimmed.to_string())
}

fn invalid(field: &str, message: &str) -> TaskValidationError {
    TaskValidationError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}
