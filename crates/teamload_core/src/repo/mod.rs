//! Record store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define owner-scoped data access contracts for members and tasks.
//! - Isolate SQLite query details from balancing and use-case services.
//!
//! # Invariants
//! - Every query filters on `owner_id`; no cross-owner reads or writes.
//! - Write paths validate models before SQL mutations.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::member::{MemberId, MemberValidationError};
use crate::model::task::{TaskId, TaskValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod member_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from member/task repository operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidMember(MemberValidationError),
    InvalidTask(TaskValidationError),
    Db(DbError),
    /// Member does not exist or belongs to another owner.
    MemberNotFound(MemberId),
    /// Task does not exist or belongs to another owner.
    TaskNotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMember(err) => write!(f, "{err}"),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMember(err) => Some(err),
            Self::InvalidTask(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemberValidationError> for RepoError {
    fn from(value: MemberValidationError) -> Self {
        Self::InvalidMember(value)
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn count_to_u32(value: i64, what: &'static str) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| RepoError::InvalidData(format!("invalid {what} `{value}`")))
}
