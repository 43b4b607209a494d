//! Service error taxonomy shared by every public operation.
//!
//! # Invariants
//! - Each `ServiceError` maps to exactly one stable `ErrorKind`.
//! - Display text is user-facing and surfaced verbatim by callers.

use crate::model::member::{MemberId, MemberValidationError};
use crate::model::owner::MissingOwnerError;
use crate::model::task::{TaskId, TaskValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable error categories reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    NotFound,
    ValidationError,
    NoMembersAvailable,
    NoCapacityAvailable,
    StoreError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::ValidationError => "validation_error",
            Self::NoMembersAvailable => "no_members_available",
            Self::NoCapacityAvailable => "no_capacity_available",
            Self::StoreError => "store_error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from member/task/balancing services.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller presented no valid identity.
    Unauthenticated,
    /// Member is absent or owned by someone else.
    MemberNotFound(MemberId),
    /// Task is absent or owned by someone else.
    TaskNotFound(TaskId),
    InvalidMember(MemberValidationError),
    InvalidTask(TaskValidationError),
    /// Owner has no members to pick from.
    NoMembersAvailable,
    /// Overloaded members exist but nobody has spare capacity.
    NoCapacityAvailable,
    /// Persistence failure before any state change.
    Store(RepoError),
    /// Persistence failure during rebalancing after some moves committed.
    RebalanceInterrupted {
        reassigned_count: u32,
        source: RepoError,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::MemberNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::InvalidMember(_) | Self::InvalidTask(_) => ErrorKind::ValidationError,
            Self::NoMembersAvailable => ErrorKind::NoMembersAvailable,
            Self::NoCapacityAvailable => ErrorKind::NoCapacityAvailable,
            Self::Store(_) | Self::RebalanceInterrupted { .. } => ErrorKind::StoreError,
        }
    }

    /// Moves already committed when a rebalance pass failed midway.
    pub fn committed_moves(&self) -> Option<u32> {
        match self {
            Self::RebalanceInterrupted {
                reassigned_count, ..
            } => Some(*reassigned_count),
            _ => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Not authenticated"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidMember(err) => write!(f, "{err}"),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::NoMembersAvailable => write!(f, "No members available"),
            Self::NoCapacityAvailable => write!(f, "No available members to reassign tasks to"),
            Self::Store(err) => write!(f, "{err}"),
            Self::RebalanceInterrupted {
                reassigned_count,
                source,
            } => write!(
                f,
                "{source} (rebalance stopped after {reassigned_count} task(s) reassigned)"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMember(err) => Some(err),
            Self::InvalidTask(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::RebalanceInterrupted { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::MemberNotFound(id) => Self::MemberNotFound(id),
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            RepoError::InvalidMember(err) => Self::InvalidMember(err),
            RepoError::InvalidTask(err) => Self::InvalidTask(err),
            other => Self::Store(other),
        }
    }
}

impl From<MissingOwnerError> for ServiceError {
    fn from(_: MissingOwnerError) -> Self {
        Self::Unauthenticated
    }
}

impl From<MemberValidationError> for ServiceError {
    fn from(value: MemberValidationError) -> Self {
        Self::InvalidMember(value)
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ServiceError};
    use crate::db::DbError;
    use crate::model::member::MemberValidationError;
    use crate::model::owner::OwnerId;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_not_found_maps_to_not_found_kind() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(RepoError::MemberNotFound(id));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn validation_maps_to_validation_kind_with_user_message() {
        let err = ServiceError::from(RepoError::InvalidMember(
            MemberValidationError::CapacityOutOfRange(9),
        ));
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.to_string(), "Capacity must be between 0 and 5");
    }

    #[test]
    fn blank_owner_maps_to_unauthenticated() {
        let err = ServiceError::from(OwnerId::parse("").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[test]
    fn interrupted_rebalance_reports_store_kind_and_committed_moves() {
        let err = ServiceError::RebalanceInterrupted {
            reassigned_count: 2,
            source: RepoError::Db(DbError::UnsupportedSchemaVersion {
                db_version: 9,
                latest_supported: 2,
            }),
        };
        assert_eq!(err.kind(), ErrorKind::StoreError);
        assert_eq!(err.committed_moves(), Some(2));
        assert!(err.to_string().contains("after 2 task(s)"));
    }

    #[test]
    fn capacity_messages_are_stable() {
        assert_eq!(
            ServiceError::NoCapacityAvailable.to_string(),
            "No available members to reassign tasks to"
        );
        assert_eq!(
            ServiceError::NoMembersAvailable.to_string(),
            "No members available"
        );
        assert_eq!(ErrorKind::NoCapacityAvailable.as_str(), "no_capacity_available");
    }
}
