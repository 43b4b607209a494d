//! Dashboard summary use-case.

use crate::model::owner::OwnerId;
use crate::repo::member_repo::MemberRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::error::ServiceResult;
use crate::service::workload::workloads_from_tasks;
use serde::Serialize;

/// Owner-level counters shown above the member and task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_tasks: u32,
    pub open_tasks: u32,
    pub member_count: u32,
    pub overloaded_members: u32,
}

pub struct DashboardService<M: MemberRepository, T: TaskRepository> {
    members: M,
    tasks: T,
}

impl<M: MemberRepository, T: TaskRepository> DashboardService<M, T> {
    pub fn new(members: M, tasks: T) -> Self {
        Self { members, tasks }
    }

    /// Computes counters from one member listing and one task listing.
    pub fn stats(&self, owner: &OwnerId) -> ServiceResult<DashboardStats> {
        let members = self.members.list_members(owner)?;
        let tasks: Vec<_> = self
            .tasks
            .list_tasks(owner)?
            .into_iter()
            .map(|record| record.task)
            .collect();

        let member_count = members.len();
        let overloaded = workloads_from_tasks(members, &tasks)
            .iter()
            .filter(|entry| entry.is_overloaded())
            .count();
        let open = tasks.iter().filter(|task| task.is_open()).count();

        Ok(DashboardStats {
            total_tasks: saturating_u32(tasks.len()),
            open_tasks: saturating_u32(open),
            member_count: saturating_u32(member_count),
            overloaded_members: saturating_u32(overloaded),
        })
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
