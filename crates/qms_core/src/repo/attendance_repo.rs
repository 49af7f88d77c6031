//! Attendance Ledger contract and SQLite implementation.
//!
//! # Invariants
//! - Rows are keyed by `(event_id, staff_id)`; inserting a duplicate fails.
//! - Bulk inserts are all-or-nothing.
//! - Only completion mutates a row after creation.

use super::codec::{attendance_status_to_db, date_to_db, parse_attendance_status, parse_date};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::event::EventId;
use crate::model::staff::StaffId;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    event_id,
    staff_id,
    status,
    completion_date
FROM attendance_records";

/// Attendance Ledger contract.
pub trait AttendanceLedger {
    fn insert_attendance(&self, record: &AttendanceRecord) -> RepoResult<()>;
    /// Inserts all records in one transaction and returns the inserted count.
    fn insert_attendance_bulk(&self, records: &[AttendanceRecord]) -> RepoResult<usize>;
    /// Lists every record ordered by `event_id ASC, staff_id ASC`.
    fn list_attendance(&self) -> RepoResult<Vec<AttendanceRecord>>;
    fn list_attendance_for_event(&self, event_id: EventId) -> RepoResult<Vec<AttendanceRecord>>;
    /// Marks one obligation completed on `completion_date`.
    fn complete_attendance(
        &self,
        event_id: EventId,
        staff_id: StaffId,
        completion_date: NaiveDate,
    ) -> RepoResult<()>;
}

/// SQLite-backed Attendance Ledger.
pub struct SqliteAttendanceLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceLedger<'conn> {
    /// Creates the ledger from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["attendance_records"])?;
        Ok(Self { conn })
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }
}

impl AttendanceLedger for SqliteAttendanceLedger<'_> {
    fn insert_attendance(&self, record: &AttendanceRecord) -> RepoResult<()> {
        insert_attendance_row(self.conn, record)
    }

    fn insert_attendance_bulk(&self, records: &[AttendanceRecord]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for record in records {
            insert_attendance_row(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn list_attendance(&self) -> RepoResult<Vec<AttendanceRecord>> {
        self.query_records(
            &format!("{ATTENDANCE_SELECT_SQL} ORDER BY event_id ASC, staff_id ASC;"),
            [],
        )
    }

    fn list_attendance_for_event(&self, event_id: EventId) -> RepoResult<Vec<AttendanceRecord>> {
        self.query_records(
            &format!("{ATTENDANCE_SELECT_SQL} WHERE event_id = ?1 ORDER BY staff_id ASC;"),
            [event_id],
        )
    }

    fn complete_attendance(
        &self,
        event_id: EventId,
        staff_id: StaffId,
        completion_date: NaiveDate,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE attendance_records
             SET status = ?1, completion_date = ?2
             WHERE event_id = ?3 AND staff_id = ?4;",
            params![
                attendance_status_to_db(AttendanceStatus::Completed),
                date_to_db(completion_date),
                event_id,
                staff_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::AttendanceNotFound { event_id, staff_id });
        }
        Ok(())
    }
}

/// Inserts one record on `conn`, which may be an open transaction.
pub(crate) fn insert_attendance_row(
    conn: &Connection,
    record: &AttendanceRecord,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO attendance_records (event_id, staff_id, status, completion_date)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            record.event_id,
            record.staff_id,
            attendance_status_to_db(record.status),
            record.completion_date.map(date_to_db),
        ],
    )?;
    Ok(())
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let status_text: String = row.get("status")?;
    let completion_date = match row.get::<_, Option<String>>("completion_date")? {
        Some(value) => Some(parse_date(&value, "attendance_records.completion_date")?),
        None => None,
    };

    Ok(AttendanceRecord {
        event_id: row.get("event_id")?,
        staff_id: row.get("staff_id")?,
        status: parse_attendance_status(&status_text)?,
        completion_date,
    })
}
