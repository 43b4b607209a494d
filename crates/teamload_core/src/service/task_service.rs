//! Task use-case service.
//!
//! # Responsibility
//! - Provide task create/list/update/delete entry points.
//! - Flag assignments that land on a member already at or over capacity.
//!
//! # Invariants
//! - A capacity warning never blocks the write; it is advisory only.
//! - Assignment targets must belong to the same owner.

use crate::model::member::MemberId;
use crate::model::owner::OwnerId;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
use crate::repo::member_repo::MemberRepository;
use crate::repo::task_repo::{TaskRecord, TaskRepository};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::workload::WorkloadCalculator;
use log::{info, warn};

/// Task write result with advisory capacity flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWrite {
    pub task: Task,
    /// Assignee was already at or over capacity before this write.
    pub capacity_warning: bool,
}

/// Task service facade over member and task repositories.
pub struct TaskService<M: MemberRepository, T: TaskRepository> {
    members: M,
    tasks: T,
}

impl<M: MemberRepository, T: TaskRepository> TaskService<M, T> {
    pub fn new(members: M, tasks: T) -> Self {
        Self { members, tasks }
    }

    /// Creates one task, optionally assigned.
    pub fn create_task(&self, owner: &OwnerId, draft: TaskDraft) -> ServiceResult<TaskWrite> {
        draft.validate()?;
        let capacity_warning = match draft.assigned_member_id {
            Some(member_id) if draft.status == TaskStatus::Todo => {
                self.assignee_is_full(owner, member_id)?
            }
            Some(member_id) => {
                self.ensure_member(owner, member_id)?;
                false
            }
            None => false,
        };

        let task = self.tasks.create_task(owner, &draft)?;
        log_write("task_create", &task, capacity_warning);
        Ok(TaskWrite {
            task,
            capacity_warning,
        })
    }

    pub fn get_task(&self, owner: &OwnerId, id: TaskId) -> ServiceResult<Option<Task>> {
        Ok(self.tasks.get_task(owner, id)?)
    }

    /// Lists tasks newest first with assignee display fields.
    pub fn list_tasks(&self, owner: &OwnerId) -> ServiceResult<Vec<TaskRecord>> {
        Ok(self.tasks.list_tasks(owner)?)
    }

    /// Applies a partial update.
    ///
    /// The capacity warning is only evaluated when the assignee changes and
    /// the task stays open.
    pub fn update_task(
        &self,
        owner: &OwnerId,
        id: TaskId,
        patch: &TaskPatch,
    ) -> ServiceResult<TaskWrite> {
        if let Some(title) = patch.title.as_ref() {
            TaskDraft::new(title).validate()?;
        }
        let current = self
            .tasks
            .get_task(owner, id)?
            .ok_or(ServiceError::TaskNotFound(id))?;

        let mut next = current.clone();
        patch.apply_to(&mut next);
        let capacity_warning = match next.assigned_member_id {
            Some(member_id) if next.assigned_member_id != current.assigned_member_id => {
                let full = self.assignee_is_full(owner, member_id)?;
                full && next.is_open()
            }
            _ => false,
        };

        let task = self.tasks.update_task(owner, id, patch)?;
        log_write("task_update", &task, capacity_warning);
        Ok(TaskWrite {
            task,
            capacity_warning,
        })
    }

    /// Marks a task `Todo` or `Done`.
    pub fn set_status(&self, owner: &OwnerId, id: TaskId, status: TaskStatus) -> ServiceResult<Task> {
        let patch = TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        };
        let task = self.tasks.update_task(owner, id, &patch)?;
        info!(
            "event=task_status module=service status=ok task_id={} task_status={}",
            task.id,
            task.status.as_str()
        );
        Ok(task)
    }

    pub fn delete_task(&self, owner: &OwnerId, id: TaskId) -> ServiceResult<()> {
        self.tasks.delete_task(owner, id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    fn ensure_member(&self, owner: &OwnerId, member_id: MemberId) -> ServiceResult<()> {
        if self.members.get_member(owner, member_id)?.is_none() {
            return Err(ServiceError::MemberNotFound(member_id));
        }
        Ok(())
    }

    fn assignee_is_full(&self, owner: &OwnerId, member_id: MemberId) -> ServiceResult<bool> {
        let member = self
            .members
            .get_member(owner, member_id)?
            .ok_or(ServiceError::MemberNotFound(member_id))?;
        let workload =
            WorkloadCalculator::new(&self.members, &self.tasks).workload_of(owner, member_id)?;
        Ok(member.capacity_status(workload).is_warning())
    }
}

fn log_write(event: &'static str, task: &Task, capacity_warning: bool) {
    if capacity_warning {
        warn!(
            "event={event} module=service status=ok task_id={} member_id={} capacity_warning=true",
            task.id,
            task.assigned_member_id
                .map(|id| id.to_string())
                .unwrap_or_default()
        );
        return;
    }
    info!(
        "event={event} module=service status=ok task_id={} priority={}",
        task.id,
        task.priority.as_str()
    );
}
