//! SQLite store bootstrap for members and tasks.
//!
//! # Responsibility
//! - Open connections backing the member/task store.
//! - Bring the schema to the latest version and confirm the tables the
//!   repositories depend on are present.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection handed out by this module has passed schema verification.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Store bootstrap failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// One migration step failed; the whole batch was rolled back.
    MigrationFailed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// Schema claims `version` but a table introduced by it is absent.
    MissingTable {
        version: u32,
        table: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema v{db_version} is newer than this build (max v{latest_supported})"
            ),
            Self::MigrationFailed {
                version,
                name,
                source,
            } => write!(f, "migration v{version} `{name}` failed: {source}"),
            Self::MissingTable { version, table } => {
                write!(f, "table `{table}` from schema v{version} is missing")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::MigrationFailed { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
