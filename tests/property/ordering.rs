//! Property tests for the position-ordering rules of the task table.
//!
//! Drives random operation sequences against a [`TaskTable`] and checks the
//! ordering invariants after every step: incomplete positions stay unique
//! and strictly ascending in the listing, deferred tasks land at the end,
//! and completion freezes position.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use taskdeck_model::{ReorderItem, TaskDraft, TaskId};
use taskdeck_server::store::TaskTable;

/// One step of a random operation sequence. Target indices are resolved
/// modulo the set of ids created so far, so they stay valid as the table
/// shrinks and grows.
#[derive(Debug, Clone)]
enum Op {
    Create,
    Complete(usize),
    Defer(usize),
    Delete(usize),
    /// Reorder the whole incomplete set, rotated left by the given amount
    /// and renumbered 1..=n (a consistent permutation, as callers submit).
    Reorder(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        1 => (0..16usize).prop_map(Op::Complete),
        1 => (0..16usize).prop_map(Op::Defer),
        1 => (0..16usize).prop_map(Op::Delete),
        1 => (0..16usize).prop_map(Op::Reorder),
    ]
}

/// Picks a known id by index, if any were created yet.
fn pick(ids: &[TaskId], index: usize) -> Option<TaskId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

/// Asserts the at-rest ordering invariants of the incomplete listing.
fn check_invariants(table: &TaskTable) -> Result<(), TestCaseError> {
    let list = table.list_incomplete();
    for window in list.windows(2) {
        prop_assert!(
            window[0].position < window[1].position,
            "incomplete listing must be strictly ascending by position: {} then {}",
            window[0].position,
            window[1].position,
        );
    }
    for task in &list {
        prop_assert!(task.position >= 1, "positions are positive integers");
    }
    Ok(())
}

proptest! {
    /// No operation sequence produces duplicate positions among
    /// incomplete tasks, and the listing is always strictly ascending.
    #[test]
    fn random_sequences_preserve_ordering(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut table = TaskTable::new();
        let mut ids: Vec<TaskId> = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Create => {
                    let task = table
                        .create(TaskDraft::titled(&format!("task {step}")))
                        .unwrap();
                    ids.push(task.id);
                }
                Op::Complete(i) => {
                    if let Some(id) = pick(&ids, i) {
                        // May fail with NotFound after a delete; both fine.
                        let _ = table.complete(id);
                    }
                }
                Op::Defer(i) => {
                    if let Some(id) = pick(&ids, i)
                        && let Ok(deferred) = table.defer(id)
                    {
                        // The deferred task lists last.
                        let list = table.list_incomplete();
                        prop_assert_eq!(list.last().map(|t| t.id), Some(deferred.id));
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = pick(&ids, i) {
                        table.delete(id);
                    }
                }
                Op::Reorder(rotation) => {
                    let incomplete = table.list_incomplete();
                    if !incomplete.is_empty() {
                        let n = incomplete.len();
                        let items: Vec<ReorderItem> = incomplete
                            .iter()
                            .cycle()
                            .skip(rotation % n)
                            .take(n)
                            .enumerate()
                            .map(|(i, task)| ReorderItem {
                                id: task.id,
                                position: (i + 1) as u64,
                            })
                            .collect();
                        table.reorder(&items);
                    }
                }
            }
            check_invariants(&table)?;
        }
    }

    /// Position allocation is `max over all tasks + 1`, starting at 1.
    #[test]
    fn allocation_is_monotonic(count in 1..30usize) {
        let mut table = TaskTable::new();
        for expected in 1..=count {
            let task = table.create(TaskDraft::titled("t")).unwrap();
            prop_assert_eq!(task.position, expected as u64);
        }
    }

    /// Completing any task changes the flag and nothing else.
    #[test]
    fn completion_freezes_all_fields(target in 0..8usize, count in 1..8usize) {
        let mut table = TaskTable::new();
        let mut ids = Vec::new();
        for i in 0..count {
            ids.push(table.create(TaskDraft::titled(&format!("t{i}"))).unwrap().id);
        }
        let id = ids[target % ids.len()];
        let before = table
            .list_incomplete()
            .into_iter()
            .find(|t| t.id == id)
            .unwrap();
        let after = table.complete(id).unwrap();
        prop_assert!(after.completed);
        prop_assert_eq!(after.position, before.position);
        prop_assert_eq!(after.title, before.title);
        prop_assert_eq!(after.priority, before.priority);
        prop_assert_eq!(after.created_at, before.created_at);
    }
}
