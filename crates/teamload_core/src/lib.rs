//! Core domain logic for teamload.
//! Owns member/task records and the workload balancing rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{
    CapacityStatus, Member, MemberDraft, MemberId, MemberValidationError, MAX_MEMBER_CAPACITY,
};
pub use model::owner::{MissingOwnerError, OwnerId};
pub use model::task::{
    Task, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskValidationError,
};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRecord, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auto_assign::AutoAssignment;
pub use service::balance_service::BalanceService;
pub use service::dashboard_service::{DashboardService, DashboardStats};
pub use service::error::{ErrorKind, ServiceError, ServiceResult};
pub use service::member_service::MemberService;
pub use service::rebalance::{RebalanceOutcome, TaskMove};
pub use service::task_service::{TaskService, TaskWrite};
pub use service::workload::MemberWorkload;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
