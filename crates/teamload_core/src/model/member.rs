//! Member domain model.
//!
//! # Invariants
//! - `name` is non-empty after trim.
//! - `capacity` stays within `0..=MAX_MEMBER_CAPACITY`.
//! - `created_at` defines registration order for every balancing decision.

use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable member identifier.
pub type MemberId = Uuid;

/// Upper bound for a member's declared capacity.
pub const MAX_MEMBER_CAPACITY: u32 = 5;

/// Team member with a bounded number of open tasks they should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub owner_id: OwnerId,
    pub name: String,
    /// Number of open tasks this member is expected to handle.
    pub capacity: u32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Member {
    /// Checks persisted/constructed state against member invariants.
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        validate_name(self.name.as_str())?;
        validate_capacity(i64::from(self.capacity))
    }

    /// Classifies a workload against this member's capacity.
    pub fn capacity_status(&self, workload: u32) -> CapacityStatus {
        CapacityStatus::classify(workload, self.capacity)
    }
}

/// Input shape for member creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    pub name: String,
    /// Kept signed so out-of-range host input reaches validation intact.
    pub capacity: i64,
}

impl MemberDraft {
    /// Builds a draft with a trimmed name.
    pub fn new(name: impl AsRef<str>, capacity: i64) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            capacity,
        }
    }

    pub fn validate(&self) -> Result<(), MemberValidationError> {
        validate_capacity(self.capacity)?;
        validate_name(self.name.as_str())
    }
}

/// Load level of a member relative to capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityStatus {
    /// `workload < capacity`; can receive more tasks.
    Under,
    /// `workload == capacity`.
    AtCapacity,
    /// `workload > capacity`; eligible for rebalancing.
    Over,
}

impl CapacityStatus {
    pub fn classify(workload: u32, capacity: u32) -> Self {
        if workload < capacity {
            Self::Under
        } else if workload == capacity {
            Self::AtCapacity
        } else {
            Self::Over
        }
    }

    /// Whether a new assignment to this member deserves a warning.
    pub fn is_warning(self) -> bool {
        !matches!(self, Self::Under)
    }
}

/// Validation errors for member records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    CapacityOutOfRange(i64),
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name is required"),
            Self::CapacityOutOfRange(_) => {
                write!(f, "Capacity must be between 0 and {MAX_MEMBER_CAPACITY}")
            }
        }
    }
}

impl Error for MemberValidationError {}

fn validate_name(name: &str) -> Result<(), MemberValidationError> {
    if name.trim().is_empty() {
        return Err(MemberValidationError::EmptyName);
    }
    Ok(())
}

fn validate_capacity(capacity: i64) -> Result<(), MemberValidationError> {
    if !(0..=i64::from(MAX_MEMBER_CAPACITY)).contains(&capacity) {
        return Err(MemberValidationError::CapacityOutOfRange(capacity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CapacityStatus, MemberDraft, MemberValidationError};

    #[test]
    fn draft_trims_name() {
        let draft = MemberDraft::new("  Ada  ", 3);
        assert_eq!(draft.name, "Ada");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_rejects_capacity_outside_bounds() {
        for capacity in [-1, 6] {
            let err = MemberDraft::new("Ada", capacity).validate().unwrap_err();
            assert_eq!(err, MemberValidationError::CapacityOutOfRange(capacity));
        }
        assert!(MemberDraft::new("Ada", 0).validate().is_ok());
        assert!(MemberDraft::new("Ada", 5).validate().is_ok());
    }

    #[test]
    fn capacity_status_boundaries() {
        assert_eq!(CapacityStatus::classify(1, 2), CapacityStatus::Under);
        assert_eq!(CapacityStatus::classify(2, 2), CapacityStatus::AtCapacity);
        assert_eq!(CapacityStatus::classify(3, 2), CapacityStatus::Over);
        assert_eq!(CapacityStatus::classify(0, 0), CapacityStatus::AtCapacity);
        assert!(!CapacityStatus::Under.is_warning());
        assert!(CapacityStatus::AtCapacity.is_warning());
    }
}
