//! Workload calculation.
//!
//! # Responsibility
//! - Define workload as the number of a member's open (`Todo`) tasks.
//! - Provide both a store-backed calculator and pure in-memory forms.
//!
//! # Invariants
//! - Workload is recomputed on every call; nothing is cached.
//! - `Done` tasks never contribute to workload.
//! - Results keep member registration order.

use crate::model::member::{CapacityStatus, Member, MemberId};
use crate::model::owner::OwnerId;
use crate::model::task::Task;
use crate::repo::member_repo::MemberRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::error::{ServiceError, ServiceResult};
use serde::Serialize;

/// One member paired with its current open-task count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWorkload {
    pub member: Member,
    pub workload: u32,
}

impl MemberWorkload {
    pub fn capacity_status(&self) -> CapacityStatus {
        self.member.capacity_status(self.workload)
    }

    /// `workload > capacity`.
    pub fn is_overloaded(&self) -> bool {
        self.capacity_status() == CapacityStatus::Over
    }

    /// `workload < capacity`.
    pub fn is_available(&self) -> bool {
        self.capacity_status() == CapacityStatus::Under
    }

    /// Number of tasks that must leave to get back to capacity.
    pub fn excess(&self) -> u32 {
        self.workload.saturating_sub(self.member.capacity)
    }
}

/// Counts open tasks assigned to `member_id`.
pub fn count_open_tasks<'a>(
    member_id: MemberId,
    tasks: impl IntoIterator<Item = &'a Task>,
) -> u32 {
    let count = tasks
        .into_iter()
        .filter(|task| task.is_assigned_to(member_id) && task.is_open())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Pairs each member with its workload computed from an in-memory task list.
///
/// Member order is preserved.
pub fn workloads_from_tasks(members: Vec<Member>, tasks: &[Task]) -> Vec<MemberWorkload> {
    members
        .into_iter()
        .map(|member| {
            let workload = count_open_tasks(member.id, tasks);
            MemberWorkload { member, workload }
        })
        .collect()
}

/// Store-backed workload calculator.
pub struct WorkloadCalculator<'r, M: MemberRepository, T: TaskRepository> {
    members: &'r M,
    tasks: &'r T,
}

impl<'r, M: MemberRepository, T: TaskRepository> WorkloadCalculator<'r, M, T> {
    pub fn new(members: &'r M, tasks: &'r T) -> Self {
        Self { members, tasks }
    }

    /// Returns the open-task count of one member.
    ///
    /// # Errors
    /// - `MemberNotFound` when the member is absent or owned by someone else.
    pub fn workload_of(&self, owner: &OwnerId, member_id: MemberId) -> ServiceResult<u32> {
        if self.members.get_member(owner, member_id)?.is_none() {
            return Err(ServiceError::MemberNotFound(member_id));
        }
        Ok(self.tasks.count_todo_tasks(owner, member_id)?)
    }

    /// Returns every member of `owner` with its workload, in registration order.
    pub fn members_with_workload(&self, owner: &OwnerId) -> ServiceResult<Vec<MemberWorkload>> {
        let members = self.members.list_members(owner)?;
        let mut result = Vec::with_capacity(members.len());
        for member in members {
            let workload = self.tasks.count_todo_tasks(owner, member.id)?;
            result.push(MemberWorkload { member, workload });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::{count_open_tasks, workloads_from_tasks, MemberWorkload};
    use crate::model::member::Member;
    use crate::model::owner::OwnerId;
    use crate::model::task::{Task, TaskPriority, TaskStatus};
    use uuid::Uuid;

    fn member(name: &str, capacity: u32, created_at: i64) -> Member {
        Member {
            id: Uuid::new_v4(),
            owner_id: OwnerId::parse("owner").unwrap(),
            name: name.to_string(),
            capacity,
            created_at,
        }
    }

    fn task(assignee: Option<&Member>, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: OwnerId::parse("owner").unwrap(),
            title: "task".to_string(),
            assigned_member_id: assignee.map(|member| member.id),
            priority: TaskPriority::Medium,
            status,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn done_and_unassigned_tasks_do_not_count() {
        let ada = member("Ada", 3, 1);
        let tasks = vec![
            task(Some(&ada), TaskStatus::Todo),
            task(Some(&ada), TaskStatus::Done),
            task(None, TaskStatus::Todo),
        ];
        assert_eq!(count_open_tasks(ada.id, &tasks), 1);
    }

    #[test]
    fn completing_a_task_lowers_only_its_assignee() {
        let ada = member("Ada", 3, 1);
        let bob = member("Bob", 3, 2);
        let mut tasks = vec![
            task(Some(&ada), TaskStatus::Todo),
            task(Some(&ada), TaskStatus::Todo),
            task(Some(&bob), TaskStatus::Todo),
        ];

        let before = workloads_from_tasks(vec![ada.clone(), bob.clone()], &tasks);
        tasks[0].status = TaskStatus::Done;
        let after = workloads_from_tasks(vec![ada, bob], &tasks);

        assert_eq!(before[0].workload - 1, after[0].workload);
        assert_eq!(before[1].workload, after[1].workload);
    }

    #[test]
    fn workloads_keep_member_order() {
        let first = member("First", 1, 10);
        let second = member("Second", 1, 20);
        let result = workloads_from_tasks(vec![first.clone(), second.clone()], &[]);
        assert_eq!(result[0].member.id, first.id);
        assert_eq!(result[1].member.id, second.id);
    }

    #[test]
    fn excess_and_availability_follow_capacity() {
        let entry = MemberWorkload {
            member: member("Ada", 2, 1),
            workload: 4,
        };
        assert!(entry.is_overloaded());
        assert!(!entry.is_available());
        assert_eq!(entry.excess(), 2);

        let idle = MemberWorkload {
            member: member("Bob", 2, 2),
            workload: 0,
        };
        assert!(idle.is_available());
        assert_eq!(idle.excess(), 0);
    }
}
