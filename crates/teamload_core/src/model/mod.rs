//! Domain model for members, tasks and their owner scope.
//!
//! # Responsibility
//! - Define canonical records used by repositories and balancing services.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every record is scoped to exactly one `OwnerId`.
//! - Workload is derived from tasks and never stored on a member.

pub mod member;
pub mod owner;
pub mod task;
