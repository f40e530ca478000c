//! Request payload types for the Taskdeck API.
//!
//! [`TaskPatch`] implements a true sparse update: a field that is absent
//! from the JSON body is left unchanged, while an explicit `null` clears
//! the optional `due_date`/`notes` fields. The distinction is carried by
//! the outer `Option` of a double-`Option` field.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{Priority, TaskId};

/// Payload for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Title of the new task (validated non-empty by the store).
    pub title: String,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Priority, defaulting to `med` when omitted.
    #[serde(default)]
    pub priority: Priority,
    /// Optional free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with just a title, all other fields defaulted.
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            due_date: None,
            priority: Priority::default(),
            notes: None,
        }
    }
}

/// Sparse update of a task's editable fields.
///
/// `position` and `completed` are deliberately absent: they change only
/// through the dedicated reorder/defer/complete operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title, if supplied (validated like create).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New due date: absent = unchanged, `null` = cleared.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    /// New priority, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New notes: absent = unchanged, `null` = cleared.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl TaskPatch {
    /// Returns `true` if the patch carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
    }
}

/// Deserializes a present-but-maybe-null field into `Some(Option<T>)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None` while
/// `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One entry of a batch reorder request: assign `position` to the task
/// identified by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    /// Task to reposition.
    pub id: TaskId,
    /// New position value (the caller supplies a consistent permutation).
    pub position: u64,
}
