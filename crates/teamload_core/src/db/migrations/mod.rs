//! Member/task schema steps and the runner that applies them.
//!
//! # Invariants
//! - Step versions are contiguous from 1.
//! - Pending steps run inside one transaction; a failing step rolls back
//!   every step of the batch and reports its own version.
//! - After migrating (or when already current) every table introduced by
//!   an applied step must exist.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, Transaction};

/// One schema step and the tables it introduces.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
    tables: &'static [&'static str],
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "members",
        sql: include_str!("0001_members.sql"),
        tables: &["members"],
    },
    SchemaStep {
        version: 2,
        name: "tasks",
        sql: include_str!("0002_tasks.sql"),
        tables: &["tasks"],
    },
];

/// Schema version produced by this build.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` to [`latest_version`] and verifies the resulting tables.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `MigrationFailed` naming the first step that failed.
/// - `MissingTable` when a table from an applied step is absent.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run_steps(conn, SCHEMA_STEPS)
}

fn run_steps(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let target = steps.last().map_or(0, |step| step.version);
    if from_version > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: target,
        });
    }

    let pending: Vec<&SchemaStep> = steps
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in &pending {
            apply_step(&tx, step)?;
        }
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok from_version={from_version} to_version={target} steps={}",
            pending.len()
        );
    }

    verify_tables(conn, steps)
}

fn apply_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    let applied = tx
        .execute_batch(step.sql)
        .and_then(|()| tx.pragma_update(None, "user_version", step.version));
    match applied {
        Ok(()) => {
            info!(
                "event=db_migrate_step module=db status=ok version={} name={}",
                step.version, step.name
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=db_migrate_step module=db status=error version={} name={} error={}",
                step.version, step.name, source
            );
            Err(DbError::MigrationFailed {
                version: step.version,
                name: step.name,
                source,
            })
        }
    }
}

fn verify_tables(conn: &Connection, steps: &[SchemaStep]) -> DbResult<()> {
    for step in steps {
        for &table in step.tables {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(DbError::MissingTable {
                    version: step.version,
                    table,
                });
            }
        }
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
