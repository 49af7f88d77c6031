//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the Event Store, Attendance Ledger and Staff Directory contracts
//!   the scheduler consumes.
//! - Keep SQL and column encodings inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only accept connections migrated to `latest_version()`.

pub mod attendance_repo;
mod codec;
pub mod event_repo;
pub mod event_type_cache;
pub mod schedule_repo;
pub mod staff_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::event::{EventId, EventTypeId, EventValidationError};
use crate::model::staff::{StaffId, StaffValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by all compliance repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    StaffValidation(StaffValidationError),
    Db(DbError),
    EventNotFound(EventId),
    AttendanceNotFound {
        event_id: EventId,
        staff_id: StaffId,
    },
    /// `event_type_id` does not reference a seeded type.
    UnknownEventType(EventTypeId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted state that cannot be decoded back into the model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StaffValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "compliance event not found: {id}"),
            Self::AttendanceNotFound { event_id, staff_id } => write!(
                f,
                "attendance record not found: event {event_id}, staff {staff_id}"
            ),
            Self::UnknownEventType(id) => write!(f, "unknown compliance event type: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "compliance repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "compliance repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted compliance data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StaffValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StaffValidationError> for RepoError {
    fn from(value: StaffValidationError) -> Self {
        Self::StaffValidation(value)
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

/// Verifies schema version and presence of `tables` on `conn`.
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
