//! Shared entity and request types for Taskdeck.

pub mod request;
pub mod task;

pub use request::{ReorderItem, TaskDraft, TaskPatch};
pub use task::{MAX_TITLE_LENGTH, Priority, Task, TaskError, TaskId};
