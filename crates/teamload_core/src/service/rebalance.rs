//! Greedy rebalancing primitives.
//!
//! # Responsibility
//! - Order receivers by live workload and hand out free slots one at a time.
//! - Pick which tasks leave an overloaded member.
//!
//! # Invariants
//! - The receiver queue only holds members with `workload < capacity`.
//! - The queue is re-ordered by `(workload, registration index)` after every
//!   recorded assignment, so no receiver is filled ahead of a less-loaded one.
//! - `High` priority tasks are never selected; `Low` leaves before `Medium`.

use crate::model::member::MemberId;
use crate::model::task::{Task, TaskId};
use crate::service::workload::MemberWorkload;
use serde::Serialize;

/// One committed reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
}

/// Result of a completed rebalance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebalanceOutcome {
    /// Number of tasks moved, equal to `moves.len()`.
    pub reassigned_count: u32,
    /// Members that were over capacity when the pass started.
    pub overloaded_members: u32,
    /// Excess tasks left in place (protected priority or no receiver room).
    pub unresolved_excess: u32,
    pub moves: Vec<TaskMove>,
}

impl RebalanceOutcome {
    pub(crate) fn record_move(&mut self, task_move: TaskMove) {
        self.moves.push(task_move);
        self.reassigned_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Receiver {
    member_id: MemberId,
    registration_index: usize,
    workload: u32,
    capacity: u32,
}

impl Receiver {
    fn has_room(&self) -> bool {
        self.workload < self.capacity
    }
}

/// Available members ordered by live workload, least loaded first.
#[derive(Debug, Clone, Default)]
pub struct ReceiverQueue {
    receivers: Vec<Receiver>,
}

impl ReceiverQueue {
    /// Builds the queue from workloads listed in registration order.
    pub fn from_workloads(workloads: &[MemberWorkload]) -> Self {
        let receivers = workloads
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_available())
            .map(|(registration_index, entry)| Receiver {
                member_id: entry.member.id,
                registration_index,
                workload: entry.workload,
                capacity: entry.member.capacity,
            })
            .collect();
        let mut queue = Self { receivers };
        queue.reorder();
        queue
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.receivers.len()
    }

    /// Least-loaded member that can still take one more task.
    pub fn next_receiver(&self) -> Option<MemberId> {
        self.receivers
            .iter()
            .find(|receiver| receiver.has_room())
            .map(|receiver| receiver.member_id)
    }

    #[cfg(test)]
    fn workload_of(&self, member_id: MemberId) -> Option<u32> {
        self.receivers
            .iter()
            .find(|receiver| receiver.member_id == member_id)
            .map(|receiver| receiver.workload)
    }

    /// Counts one new task against `member_id` and re-orders the queue.
    ///
    /// Receivers that reach capacity leave the queue.
    pub fn record_assignment(&mut self, member_id: MemberId) {
        if let Some(receiver) = self
            .receivers
            .iter_mut()
            .find(|receiver| receiver.member_id == member_id)
        {
            receiver.workload += 1;
        }
        self.receivers.retain(Receiver::has_room);
        self.reorder();
    }

    fn reorder(&mut self) {
        self.receivers
            .sort_by_key(|receiver| (receiver.workload, receiver.registration_index));
    }
}

/// Picks up to `excess` tasks allowed to leave their member.
///
/// Non-open and `High` priority tasks are dropped; the rest are ordered
/// `Low` before `Medium`, keeping input order within a priority.
pub fn select_movable_tasks(candidates: Vec<Task>, excess: u32) -> Vec<Task> {
    let mut movable: Vec<Task> = candidates
        .into_iter()
        .filter(|task| task.is_open() && task.priority.is_auto_movable())
        .collect();
    movable.sort_by_key(|task| task.priority);
    movable.truncate(usize::try_from(excess).unwrap_or(usize::MAX));
    movable
}
