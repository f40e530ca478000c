//! Task entity for the Taskdeck service.
//!
//! Defines the [`Task`] record persisted by the store, its identifier and
//! priority types, and the validation errors shared between the store and
//! the HTTP layer. Among incomplete tasks, `position` defines a total order;
//! completed tasks keep their last position but it carries no meaning.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal priority (the default).
    #[default]
    Med,
    /// Needs attention soon.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Med => write!(f, "med"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A single task as stored and served by Taskdeck.
///
/// `position` is a positive integer and is unique among tasks with
/// `completed == false`; that uniqueness is a behavioral contract of every
/// store operation, not a schema constraint. Completing a task freezes its
/// position. `id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Task title, non-empty.
    pub title: String,
    /// Optional due date (calendar date, no time component).
    pub due_date: Option<NaiveDate>,
    /// Task priority.
    pub priority: Priority,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// Ordering key among incomplete tasks.
    pub position: u64,
    /// Whether the task has been completed (one-way transition).
    pub completed: bool,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max {MAX_TITLE_LENGTH} characters)")]
    TitleTooLong,
    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Mutation attempted on a completed task.
    #[error("task already completed: {0}")]
    CompletedImmutable(TaskId),
}

/// Validates a task title against the emptiness and length rules.
///
/// # Errors
///
/// Returns [`TaskError::TitleEmpty`] if the title is all whitespace, or
/// [`TaskError::TitleTooLong`] if it exceeds [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::TitleEmpty);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskError::TitleTooLong);
    }
    Ok(())
}
