//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `teamload_core` linkage.
//! - Confirm migrations apply on a fresh in-memory store.

use std::process::ExitCode;
use teamload_core::db::migrations::latest_version;
use teamload_core::db::open_db_in_memory;

fn main() -> ExitCode {
    println!("teamload_core ping={}", teamload_core::ping());
    println!("teamload_core version={}", teamload_core::core_version());

    match open_db_in_memory() {
        Ok(_conn) => {
            println!("teamload_core schema_version={}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("teamload_core db_open failed: {err}");
            ExitCode::FAILURE
        }
    }
}
