//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the workload balancing rules (calculation, auto-assign, rebalance).
//! - Keep FFI/UI layers decoupled from storage details.
//!
//! # Invariants
//! - Every operation takes the owner identity as an explicit argument.
//! - Services never bypass repository validation/ownership checks.

pub mod auto_assign;
pub mod balance_service;
pub mod dashboard_service;
pub mod error;
pub mod member_service;
pub mod rebalance;
pub mod task_service;
pub mod workload;
