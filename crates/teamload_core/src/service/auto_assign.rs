//! Least-loaded member selection for new tasks.
//!
//! # Invariants
//! - The minimum workload wins; ties go to the earliest registered member.
//! - Capacity is not a filter. An at/over-capacity member can be suggested
//!   and the result flags it so callers can warn before confirming.

use crate::model::member::{CapacityStatus, Member};
use crate::service::workload::MemberWorkload;
use serde::Serialize;

/// Suggested assignee for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoAssignment {
    pub member: Member,
    pub workload: u32,
    pub capacity_status: CapacityStatus,
}

impl AutoAssignment {
    /// Whether the suggested member is already at or over capacity.
    pub fn needs_capacity_warning(&self) -> bool {
        self.capacity_status.is_warning()
    }
}

impl From<&MemberWorkload> for AutoAssignment {
    fn from(value: &MemberWorkload) -> Self {
        Self {
            member: value.member.clone(),
            workload: value.workload,
            capacity_status: value.capacity_status(),
        }
    }
}

/// Picks the least-loaded entry from `workloads` (given in registration order).
///
/// Returns `None` only when `workloads` is empty.
pub fn select_least_loaded(workloads: &[MemberWorkload]) -> Option<&MemberWorkload> {
    workloads
        .iter()
        .enumerate()
        .min_by_key(|(registration_index, entry)| (entry.workload, *registration_index))
        .map(|(_, entry)| entry)
}
