//! Workload balancing use-case service.
//!
//! # Responsibility
//! - Expose workload listing, auto-assign suggestion and full rebalance.
//! - Commit rebalance moves one task at a time through the task repository.
//!
//! # Invariants
//! - Auto-assign has no side effects.
//! - Rebalance moves are not rolled back; a failure mid-pass reports the
//!   number of moves already committed.
//! - At most one balancing operation per owner should run at a time; this
//!   service does not lock.

use crate::model::member::MemberId;
use crate::model::owner::OwnerId;
use crate::model::task::TaskPriority;
use crate::repo::member_repo::MemberRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::service::auto_assign::{select_least_loaded, AutoAssignment};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::rebalance::{select_movable_tasks, ReceiverQueue, RebalanceOutcome, TaskMove};
use crate::service::workload::{MemberWorkload, WorkloadCalculator};
use log::{debug, info, warn};
use std::time::Instant;

/// Balancing service over member and task repositories.
pub struct BalanceService<M: MemberRepository, T: TaskRepository> {
    members: M,
    tasks: T,
}

impl<M: MemberRepository, T: TaskRepository> BalanceService<M, T> {
    pub fn new(members: M, tasks: T) -> Self {
        Self { members, tasks }
    }

    fn calculator(&self) -> WorkloadCalculator<'_, M, T> {
        WorkloadCalculator::new(&self.members, &self.tasks)
    }

    /// Open-task count of one member.
    pub fn workload_of(&self, owner: &OwnerId, member_id: MemberId) -> ServiceResult<u32> {
        self.calculator().workload_of(owner, member_id)
    }

    /// Members of `owner` with their workload, in registration order.
    pub fn members_with_workload(&self, owner: &OwnerId) -> ServiceResult<Vec<MemberWorkload>> {
        self.calculator().members_with_workload(owner)
    }

    /// Suggests the least-loaded member for a new task.
    ///
    /// # Errors
    /// - `NoMembersAvailable` when `owner` has no members.
    pub fn select_member_for_new_task(&self, owner: &OwnerId) -> ServiceResult<AutoAssignment> {
        let workloads = self.members_with_workload(owner)?;
        let picked = select_least_loaded(&workloads).ok_or(ServiceError::NoMembersAvailable)?;
        let assignment = AutoAssignment::from(picked);

        info!(
            "event=auto_assign module=balance status=ok member_id={} workload={} capacity={} warning={}",
            assignment.member.id,
            assignment.workload,
            assignment.member.capacity,
            assignment.needs_capacity_warning()
        );
        Ok(assignment)
    }

    /// Moves excess low/medium-priority tasks off overloaded members.
    ///
    /// Overloaded members are processed in registration order. Each moved
    /// task goes to the currently least-loaded member with room; the pass
    /// stops entirely once no member has room.
    ///
    /// # Errors
    /// - `NoMembersAvailable` when `owner` has no members.
    /// - `NoCapacityAvailable` when someone is overloaded but nobody is
    ///   under capacity; nothing is moved.
    /// - `RebalanceInterrupted` when the store fails after some moves.
    pub fn rebalance(&self, owner: &OwnerId) -> ServiceResult<RebalanceOutcome> {
        let started_at = Instant::now();
        let workloads = self.members_with_workload(owner)?;
        if workloads.is_empty() {
            return Err(ServiceError::NoMembersAvailable);
        }

        let overloaded: Vec<&MemberWorkload> = workloads
            .iter()
            .filter(|entry| entry.is_overloaded())
            .collect();
        if overloaded.is_empty() {
            info!(
                "event=rebalance module=balance status=noop members={} duration_ms={}",
                workloads.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(RebalanceOutcome::default());
        }

        let mut receivers = ReceiverQueue::from_workloads(&workloads);
        if receivers.is_empty() {
            warn!(
                "event=rebalance module=balance status=error error_code=no_capacity overloaded={}",
                overloaded.len()
            );
            return Err(ServiceError::NoCapacityAvailable);
        }

        let mut outcome = RebalanceOutcome {
            overloaded_members: u32::try_from(overloaded.len()).unwrap_or(u32::MAX),
            ..RebalanceOutcome::default()
        };

        let mut exhausted = false;
        for source in &overloaded {
            let excess = source.excess();
            if exhausted {
                outcome.unresolved_excess += excess;
                continue;
            }

            let candidates = self
                .tasks
                .list_todo_tasks_by_member(owner, source.member.id, &TaskPriority::MOVABLE)
                .map_err(|err| interrupted(&outcome, err))?;
            let selected = select_movable_tasks(candidates, excess);
            let mut moved_here = 0_u32;

            for task in selected {
                let Some(receiver_id) = receivers.next_receiver() else {
                    exhausted = true;
                    break;
                };
                self.tasks
                    .update_task_assignment(owner, task.id, Some(receiver_id))
                    .map_err(|err| interrupted(&outcome, err))?;
                receivers.record_assignment(receiver_id);
                outcome.record_move(TaskMove {
                    task_id: task.id,
                    from_member_id: source.member.id,
                    to_member_id: receiver_id,
                });
                moved_here += 1;
                debug!(
                    "event=rebalance_move module=balance task_id={} from_member_id={} to_member_id={}",
                    task.id, source.member.id, receiver_id
                );
            }

            outcome.unresolved_excess += excess - moved_here;
            if receivers.next_receiver().is_none() {
                exhausted = true;
            }
        }

        info!(
            "event=rebalance module=balance status=ok overloaded={} reassigned={} unresolved={} duration_ms={}",
            outcome.overloaded_members,
            outcome.reassigned_count,
            outcome.unresolved_excess,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

fn interrupted(outcome: &RebalanceOutcome, err: RepoError) -> ServiceError {
    warn!(
        "event=rebalance module=balance status=error error_code=store_failed reassigned={} error={}",
        outcome.reassigned_count, err
    );
    if outcome.reassigned_count == 0 {
        return ServiceError::from(err);
    }
    ServiceError::RebalanceInterrupted {
        reassigned_count: outcome.reassigned_count,
        source: err,
    }
}
