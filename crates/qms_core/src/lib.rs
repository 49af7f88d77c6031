//! Compliance training scheduler core.
//!
//! Expands recurring training requirements into dated events, snapshots
//! per-staff attendance, derives live status on read and aggregates the
//! staff competency matrix. Persistence is SQLite-backed.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{SchedulerConfig, ALL_STAFF_SENTINEL, DEFAULT_RECURRENCE_HORIZON};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{AttendanceRecord, AttendanceStatus};
pub use model::event::{
    ComplianceEvent, ComplianceEventType, EffectiveStatus, EventId, EventTypeId,
    EventValidationError, NewComplianceEvent, Recurrence, SeriesId, StoredStatus,
};
pub use model::staff::{NewStaff, Staff, StaffId, StaffValidationError};
pub use repo::attendance_repo::{AttendanceLedger, SqliteAttendanceLedger};
pub use repo::event_repo::{EventListQuery, EventStore, SqliteEventStore};
pub use repo::event_type_cache::EventTypeCache;
pub use repo::schedule_repo::{
    CommittedInstance, PlannedInstance, ScheduleWriter, SqliteScheduleWriter,
};
pub use repo::staff_repo::{SqliteStaffDirectory, StaffDirectory};
pub use repo::{RepoError, RepoResult};
pub use service::matrix::{build_matrix, CompetencyMatrix, CompetencyStatus};
pub use service::recurrence::generated_due_dates;
pub use service::status::{resolve_events, resolve_status, resolve_stored_status, ResolvedEvent};
pub use service::training_service::{
    ScheduleError, ScheduleOutcome, ScheduleTrainingRequest, ScheduledInstance,
    SqliteTrainingService, TrainingService,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
