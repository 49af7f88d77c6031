//! CLI smoke entry point.
//!
//! Verifies `qms_core` linkage and that a fresh store migrates and carries
//! the seeded event types, without touching any on-disk database.

use qms_core::db::migrations::schema_version;
use qms_core::db::open_db_in_memory;
use qms_core::{EventStore, SqliteEventStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("qms_core ping={}", qms_core::ping());
    println!("qms_core version={}", qms_core::core_version());

    match probe_store() {
        Ok((version, types)) => {
            println!("qms_core schema_version={version}");
            println!("qms_core event_types={}", types.join(","));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("qms_core store probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_store() -> Result<(u32, Vec<String>), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let version = schema_version(&conn)?;
    let store = SqliteEventStore::try_new(&conn)?;
    let types = store
        .list_event_types()?
        .into_iter()
        .map(|event_type| event_type.name)
        .collect();
    Ok((version, types))
}
