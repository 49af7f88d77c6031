//! Per-staff attendance obligations.
//!
//! # Invariants
//! - One record per `(event_id, staff_id)`.
//! - The staff set of an event is fixed when the event is scheduled.
//! - `completion_date` is set exactly when `status == Completed`.

use crate::model::event::EventId;
use crate::model::staff::StaffId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub event_id: EventId,
    pub staff_id: StaffId,
    pub status: AttendanceStatus,
    pub completion_date: Option<NaiveDate>,
}

impl AttendanceRecord {
    /// Snapshot row written at scheduling time.
    pub fn pending(event_id: EventId, staff_id: StaffId) -> Self {
        Self {
            event_id,
            staff_id,
            status: AttendanceStatus::Pending,
            completion_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttendanceStatus::Completed
    }
}
