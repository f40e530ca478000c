//! The Task Ordering Store: sole owner of position assignment and ordering.
//!
//! [`TaskTable`] is the synchronous core holding the task map and every
//! ordering rule; [`TaskStore`] wraps it in a [`RwLock`] and adds snapshot
//! persistence. All mutations, including the read-max-then-insert of
//! create/defer and the whole reorder batch, run inside a single write-lock
//! critical section, which serializes position allocation and makes batches
//! all-or-nothing. That is the entire concurrency story: two concurrent
//! creates can never compute the same `max + 1`.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use taskdeck_model::task::validate_title;
use taskdeck_model::{ReorderItem, Task, TaskDraft, TaskError, TaskId, TaskPatch};
use tokio::sync::RwLock;

use crate::snapshot::{self, SnapshotError};

/// Errors surfaced by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Validation or lookup failure from the task table.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The durable snapshot could not be written; the in-memory state was
    /// rolled back to match the snapshot on disk.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Synchronous task table implementing all ordering rules.
///
/// Position invariants upheld by these methods:
/// - incomplete tasks never share a position at rest (reorder excepted,
///   where the caller supplies the permutation and is trusted);
/// - create allocates `max(position over ALL tasks) + 1` by rescanning the
///   rows (no counter is kept): a completed task's frozen position still
///   counts, while deleting the highest-positioned task makes its value
///   allocatable again;
/// - defer allocates `max(position over incomplete tasks) + 1`;
/// - delete leaves gaps; only relative order matters, not contiguity.
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    tasks: HashMap<TaskId, Task>,
}

impl TaskTable {
    /// Creates an empty task table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from previously persisted tasks.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Returns all tasks in unspecified order, for persistence.
    #[must_use]
    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Returns the number of tasks, complete and incomplete.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the table holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All incomplete tasks, ascending by position.
    ///
    /// Positions are unique among incomplete tasks by contract; the id is a
    /// secondary key so the order stays deterministic even when a caller
    /// has submitted a colliding reorder permutation.
    #[must_use]
    pub fn list_incomplete(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| !t.completed)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.position, t.id));
        tasks
    }

    /// All completed tasks, newest first by creation time.
    ///
    /// Ties on `created_at` are broken by id (descending), so the order is
    /// consistent across calls.
    #[must_use]
    pub fn list_completed(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.completed)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| std::cmp::Reverse((t.created_at, t.id)));
        tasks
    }

    /// Highest position across ALL tasks, completed included.
    ///
    /// Create scans completed tasks too, so completing the top task never
    /// frees its position. Only the rows are consulted: there is no
    /// high-water counter, and deleting the top task does free its value.
    fn max_position_all(&self) -> u64 {
        self.tasks.values().map(|t| t.position).max().unwrap_or(0)
    }

    /// Highest position among incomplete tasks only.
    ///
    /// Defer scans this narrower scope; the new position may collide
    /// numerically with a completed task's frozen position, which is
    /// harmless since completed tasks are outside the uniqueness domain.
    fn max_position_incomplete(&self) -> u64 {
        self.tasks
            .values()
            .filter(|t| !t.completed)
            .map(|t| t.position)
            .max()
            .unwrap_or(0)
    }

    /// Creates a new incomplete task at the end of the ordering.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TitleEmpty`] or [`TaskError::TitleTooLong`] if
    /// the draft title fails validation.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        validate_title(&draft.title)?;
        let task = Task {
            id: TaskId::new(),
            title: draft.title,
            due_date: draft.due_date,
            priority: draft.priority,
            notes: draft.notes,
            // Saturating: a reorder can push a position arbitrarily high,
            // and allocation must never panic or wrap past it.
            position: self.max_position_all().saturating_add(1),
            completed: false,
            created_at: Utc::now(),
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    /// Applies a sparse update to a task's editable fields.
    ///
    /// Absent patch fields are left unchanged; explicit `null` clears
    /// `due_date`/`notes`. Position and completion are untouchable here.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id,
    /// [`TaskError::CompletedImmutable`] for a completed task, and title
    /// validation errors when the patch carries a title. Lookup errors win:
    /// a bad title against a missing task is still a missing task.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        if task.completed {
            return Err(TaskError::CompletedImmutable(id));
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(notes) = patch.notes {
            task.notes = notes;
        }
        Ok(task.clone())
    }

    /// Marks a task completed, freezing its position.
    ///
    /// Idempotent: completing an already-completed task re-confirms the
    /// flag without error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id.
    pub fn complete(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.completed = true;
        Ok(task.clone())
    }

    /// Moves an incomplete task to the end of the incomplete ordering.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id and
    /// [`TaskError::CompletedImmutable`] for a completed task (a completed
    /// task's position is frozen; repositioning it is rejected rather than
    /// silently re-activating it).
    pub fn defer(&mut self, id: TaskId) -> Result<Task, TaskError> {
        match self.tasks.get(&id) {
            None => return Err(TaskError::NotFound(id)),
            Some(task) if task.completed => return Err(TaskError::CompletedImmutable(id)),
            Some(_) => {}
        }
        let end = self.max_position_incomplete().saturating_add(1);
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.position = end;
        Ok(task.clone())
    }

    /// Applies a batch of position assignments and returns the new
    /// incomplete ordering.
    ///
    /// Unknown ids are silently skipped; the supplied positions are trusted
    /// to form a consistent permutation and are not validated for
    /// uniqueness or contiguity. Callers submit a full re-numbering.
    pub fn reorder(&mut self, items: &[ReorderItem]) -> Vec<Task> {
        for item in items {
            if let Some(task) = self.tasks.get_mut(&item.id) {
                task.position = item.position;
            }
        }
        self.list_incomplete()
    }

    /// Removes a task regardless of completion state.
    ///
    /// Returns whether a task was found and removed. Positions of the
    /// remaining tasks are untouched; gaps are permitted.
    pub fn delete(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }
}

/// Thread-safe Task Ordering Store with optional snapshot persistence.
///
/// Reads take the read lock; every mutation holds the write lock for its
/// whole scan-and-mutate sequence and, when a snapshot path is configured,
/// persists the table before releasing it. A failed snapshot write rolls
/// the table back so memory and disk never diverge.
pub struct TaskStore {
    table: RwLock<TaskTable>,
    snapshot_path: Option<PathBuf>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TaskStore {
    /// Creates an empty store with no persistence (used by tests).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            table: RwLock::new(TaskTable::new()),
            snapshot_path: None,
        }
    }

    /// Opens a store backed by a JSON snapshot file, loading any existing
    /// snapshot. A missing file starts an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if an existing snapshot cannot be read or
    /// parsed.
    pub fn open(path: PathBuf) -> Result<Self, SnapshotError> {
        let tasks = snapshot::load(&path)?;
        Ok(Self {
            table: RwLock::new(TaskTable::from_tasks(tasks)),
            snapshot_path: Some(path),
        })
    }

    /// All incomplete tasks, ascending by position. The first three form
    /// the client-side "focus batch"; the store does not special-case it.
    pub async fn list_incomplete(&self) -> Vec<Task> {
        self.table.read().await.list_incomplete()
    }

    /// All completed tasks, newest first.
    pub async fn list_completed(&self) -> Vec<Task> {
        self.table.read().await.list_completed()
    }

    /// Creates a new task at the end of the ordering.
    ///
    /// # Errors
    ///
    /// Returns validation errors from the draft title, or a snapshot error
    /// if persistence fails (the create is then rolled back).
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        self.mutate(|table| table.create(draft)).await
    }

    /// Applies a sparse update to a task.
    ///
    /// # Errors
    ///
    /// See [`TaskTable::update`]; additionally fails on snapshot errors.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        self.mutate(|table| table.update(id, patch)).await
    }

    /// Marks a task completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id, or a snapshot
    /// error if persistence fails.
    pub async fn complete(&self, id: TaskId) -> Result<Task, StoreError> {
        self.mutate(|table| table.complete(id)).await
    }

    /// Moves an incomplete task to the end of the incomplete ordering.
    ///
    /// # Errors
    ///
    /// See [`TaskTable::defer`]; additionally fails on snapshot errors.
    pub async fn defer(&self, id: TaskId) -> Result<Task, StoreError> {
        self.mutate(|table| table.defer(id)).await
    }

    /// Applies a batch reorder atomically and returns the new incomplete
    /// ordering.
    ///
    /// # Errors
    ///
    /// Returns a snapshot error if persistence fails; the whole batch is
    /// then rolled back, never left half-applied.
    pub async fn reorder(&self, items: Vec<ReorderItem>) -> Result<Vec<Task>, StoreError> {
        self.mutate(|table| Ok(table.reorder(&items))).await
    }

    /// Deletes a task, returning whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns a snapshot error if persistence fails.
    pub async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        self.mutate(|table| Ok(table.delete(id))).await
    }

    /// Runs a mutation under the write lock and persists the result.
    ///
    /// On a snapshot write failure the pre-mutation table is restored, so
    /// the in-memory state always matches the last durable snapshot.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut TaskTable) -> Result<T, TaskError>,
    ) -> Result<T, StoreError> {
        let mut table = self.table.write().await;
        let before = self.snapshot_path.as_ref().map(|_| table.clone());
        let out = op(&mut table)?;
        if let Some(path) = &self.snapshot_path {
            if let Err(e) = snapshot::save(path, &table.all_tasks()) {
                tracing::error!(error = %e, "snapshot write failed, rolling back mutation");
                if let Some(before) = before {
                    *table = before;
                }
                return Err(e.into());
            }
        }
        Ok(out)
    }
}
