//! Atomic persistence of a fully planned training series.
//!
//! # Responsibility
//! - Write the anchor event, generated events, and every attendance
//!   snapshot of one scheduling request as a single unit.
//!
//! # Invariants
//! - A failed commit leaves no event or attendance row of the series behind.
//! - Committed instances are returned in plan order.

use super::attendance_repo::insert_attendance_row;
use super::event_repo::insert_event;
use super::{ensure_connection_ready, RepoResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::event::{ComplianceEvent, NewComplianceEvent};
use crate::model::staff::StaffId;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// One event of a series plus the staff snapshotted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstance {
    pub event: NewComplianceEvent,
    pub staff_ids: Vec<StaffId>,
}

/// One persisted event of a series with its attendance rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedInstance {
    pub event: ComplianceEvent,
    pub attendance: Vec<AttendanceRecord>,
}

/// Writes a planned series all-or-nothing.
pub trait ScheduleWriter {
    fn commit_schedule(&self, plan: &[PlannedInstance]) -> RepoResult<Vec<CommittedInstance>>;
}

/// SQLite writer using one `IMMEDIATE` transaction per series.
pub struct SqliteScheduleWriter<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScheduleWriter<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["compliance_events", "attendance_records"])?;
        Ok(Self { conn })
    }
}

impl ScheduleWriter for SqliteScheduleWriter<'_> {
    fn commit_schedule(&self, plan: &[PlannedInstance]) -> RepoResult<Vec<CommittedInstance>> {
        // Dropping `tx` on any early return rolls the series back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut committed = Vec::with_capacity(plan.len());

        for instance in plan {
            let event = insert_event(&tx, &instance.event)?;
            let mut attendance = Vec::with_capacity(instance.staff_ids.len());
            for &staff_id in &instance.staff_ids {
                let record = AttendanceRecord::pending(event.id, staff_id);
                insert_attendance_row(&tx, &record)?;
                attendance.push(record);
            }
            committed.push(CommittedInstance { event, attendance });
        }

        tx.commit()?;
        Ok(committed)
    }
}
