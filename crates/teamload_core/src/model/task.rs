//! Task domain model.
//!
//! # Invariants
//! - `title` is non-empty after trim.
//! - `assigned_member_id`, when set, names a member of the same owner.
//!   The store enforces this; the model only carries the reference.
//! - Only `Todo` tasks count toward a member's workload.

use crate::model::member::MemberId;
use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Task urgency. Ordering is `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Priorities the rebalancer is allowed to move, least urgent first.
    pub const MOVABLE: [TaskPriority; 2] = [TaskPriority::Low, TaskPriority::Medium];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// High-priority tasks stay with their member during rebalancing.
    pub fn is_auto_movable(self) -> bool {
        !matches!(self, Self::High)
    }
}

impl FromStr for TaskPriority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TaskValidationError::UnknownPriority(other.to_string())),
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Open work; counts toward workload.
    Todo,
    /// Completed; never counts toward workload.
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "done" => Ok(Self::Done),
            other => Err(TaskValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    pub assigned_member_id: Option<MemberId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Task {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(self.title.as_str())
    }

    /// Whether this task counts toward its assignee's workload.
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Todo
    }

    pub fn is_assigned_to(&self, member_id: MemberId) -> bool {
        self.assigned_member_id == Some(member_id)
    }
}

/// Input shape for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub assigned_member_id: Option<MemberId>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
}

impl TaskDraft {
    /// Builds an unassigned `Medium`/`Todo` draft with a trimmed title.
    pub fn new(title: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            assigned_member_id: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
        }
    }

    pub fn assigned_to(mut self, member_id: MemberId) -> Self {
        self.assigned_member_id = Some(member_id);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(self.title.as_str())
    }
}

/// Partial update; `None` leaves a field unchanged.
///
/// `assigned_member_id: Some(None)` clears the assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub assigned_member_id: Option<Option<MemberId>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.assigned_member_id.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    /// Applies the patch on top of `task`, trimming a replacement title.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = self.title.as_ref() {
            task.title = title.trim().to_string();
        }
        if let Some(assigned) = self.assigned_member_id {
            task.assigned_member_id = assigned;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Validation errors for task records and task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    UnknownPriority(String),
    UnknownStatus(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::UnknownPriority(value) => {
                write!(f, "unknown priority `{value}`; expected low|medium|high")
            }
            Self::UnknownStatus(value) => write!(f, "unknown status `{value}`; expected todo|done"),
        }
    }
}

impl Error for TaskValidationError {}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}
