//! Training scheduling and view use-cases.
//!
//! # Responsibility
//! - Expand a training request into an anchor plus generated instances and
//!   snapshot the attendees of each instance.
//! - Serve resolved event lists and the competency matrix to view callers.
//!
//! # Invariants
//! - A series is planned completely in memory, then committed atomically.
//! - An unresolved named assignee skips attendance for that instance only;
//!   the event itself is still created.
//! - Read use-cases never write.

use crate::config::SchedulerConfig;
use crate::model::attendance::AttendanceRecord;
use crate::model::event::{
    ComplianceEvent, ComplianceEventType, EventId, NewComplianceEvent, Recurrence, SeriesId,
    StoredStatus,
};
use crate::model::staff::StaffId;
use crate::repo::attendance_repo::{AttendanceLedger, SqliteAttendanceLedger};
use crate::repo::event_repo::{EventListQuery, EventStore, SqliteEventStore};
use crate::repo::event_type_cache::EventTypeCache;
use crate::repo::schedule_repo::{PlannedInstance, ScheduleWriter, SqliteScheduleWriter};
use crate::repo::staff_repo::{SqliteStaffDirectory, StaffDirectory};
use crate::repo::{RepoError, RepoResult};
use crate::service::matrix::{build_matrix, CompetencyMatrix};
use crate::service::recurrence::generated_due_dates;
use crate::service::status::{resolve_events, ResolvedEvent};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Input for scheduling one training requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTrainingRequest {
    /// Module title; must not be blank.
    pub title: String,
    /// Due date of the anchor instance.
    pub due_date: NaiveDate,
    /// Staff name, or the configured all-staff sentinel.
    pub assigned_to: String,
    pub recurrence: Recurrence,
    pub notes: String,
    pub given_by: String,
}

/// One persisted instance of a scheduled series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstance {
    pub event: ComplianceEvent,
    pub attendance: Vec<AttendanceRecord>,
    /// `false` when a named assignee was not found and no attendance was
    /// written for this instance.
    pub assignee_resolved: bool,
}

/// Result of a successful scheduling call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub series_id: SeriesId,
    pub anchor: ScheduledInstance,
    pub generated: Vec<ScheduledInstance>,
}

impl ScheduleOutcome {
    /// Anchor first, then generated instances in due-date order.
    pub fn instances(&self) -> impl Iterator<Item = &ScheduledInstance> {
        std::iter::once(&self.anchor).chain(self.generated.iter())
    }

    pub fn event_count(&self) -> usize {
        1 + self.generated.len()
    }

    pub fn attendance_count(&self) -> usize {
        self.instances()
            .map(|instance| instance.attendance.len())
            .sum()
    }
}

/// Errors from training scheduling.
#[derive(Debug)]
pub enum ScheduleError {
    /// Request input is unusable as given.
    InvalidRequest(&'static str),
    /// The training event type has not been seeded.
    Configuration { type_name: String },
    /// A generated due date falls outside the supported calendar.
    DateOutOfRange { anchor: NaiveDate },
    /// Persistence failure. The series was rolled back.
    Repo(RepoError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(details) => write!(f, "invalid training request: {details}"),
            Self::Configuration { type_name } => write!(
                f,
                "compliance event type `{type_name}` is not configured"
            ),
            Self::DateOutOfRange { anchor } => write!(
                f,
                "recurrence from {anchor} exceeds the supported date range"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Training use-case service over the store collaborators.
pub struct TrainingService<E, A, D, W>
where
    E: EventStore,
    A: AttendanceLedger,
    D: StaffDirectory,
    W: ScheduleWriter,
{
    events: E,
    attendance: A,
    staff: D,
    writer: W,
    config: SchedulerConfig,
}

/// Training service wired to one SQLite connection.
pub type SqliteTrainingService<'conn> = TrainingService<
    SqliteEventStore<'conn>,
    SqliteAttendanceLedger<'conn>,
    SqliteStaffDirectory<'conn>,
    SqliteScheduleWriter<'conn>,
>;

impl<'conn> SqliteTrainingService<'conn> {
    /// Builds all repositories over `conn`, which must be migrated.
    pub fn try_from_connection(
        conn: &'conn Connection,
        config: SchedulerConfig,
    ) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteEventStore::try_new(conn)?,
            SqliteAttendanceLedger::try_new(conn)?,
            SqliteStaffDirectory::try_new(conn)?,
            SqliteScheduleWriter::try_new(conn)?,
            config,
        ))
    }
}

impl<E, A, D, W> TrainingService<E, A, D, W>
where
    E: EventStore,
    A: AttendanceLedger,
    D: StaffDirectory,
    W: ScheduleWriter,
{
    pub fn new(events: E, attendance: A, staff: D, writer: W, config: SchedulerConfig) -> Self {
        Self {
            events,
            attendance,
            staff,
            writer,
            config,
        }
    }

    /// Schedules a training requirement and its recurring instances.
    ///
    /// # Contract
    /// - One-time: exactly one event.
    /// - Recurring: anchor plus `recurrence_horizon` instances, each due one
    ///   cadence step after the previous.
    /// - Attendance is snapshotted from the directory per instance.
    /// - On error nothing from this call is persisted.
    ///
    /// # Errors
    /// - `InvalidRequest` for a blank title.
    /// - `Configuration` when the training type is missing.
    /// - `DateOutOfRange` when expansion leaves the calendar.
    /// - `Repo` when reads or the series commit fail.
    pub fn schedule_training(
        &self,
        cache: &mut EventTypeCache,
        request: &ScheduleTrainingRequest,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ScheduleError::InvalidRequest("title must not be blank"));
        }

        let type_name = self.config.training_type_name.as_str();
        let Some(event_type_id) = cache.resolve(&self.events, type_name)? else {
            warn!("event=schedule_training module=scheduler status=error error_code=training_type_missing");
            return Err(ScheduleError::Configuration {
                type_name: type_name.to_string(),
            });
        };

        let generated = generated_due_dates(
            request.due_date,
            request.recurrence,
            self.config.recurrence_horizon,
        )
        .ok_or(ScheduleError::DateOutOfRange {
            anchor: request.due_date,
        })?;

        let series_id = Uuid::new_v4();
        let assigned_to = request.assigned_to.trim();
        let mut plan = Vec::with_capacity(1 + generated.len());
        let mut resolved_flags = Vec::with_capacity(1 + generated.len());

        for (index, due_date) in std::iter::once(request.due_date).chain(generated).enumerate() {
            let snapshot = self.snapshot_attendees(assigned_to)?;
            if snapshot.is_none() {
                warn!(
                    "event=assignee_unresolved module=scheduler status=skipped series_id={series_id} instance={index} due_date={due_date}"
                );
            }
            resolved_flags.push(snapshot.is_some());
            plan.push(PlannedInstance {
                event: NewComplianceEvent {
                    event_type_id,
                    series_id,
                    title: title.to_string(),
                    due_date,
                    status: StoredStatus::Pending,
                    assigned_to: assigned_to.to_string(),
                    recurrence: request.recurrence,
                    notes: request.notes.clone(),
                    given_by: request.given_by.clone(),
                },
                staff_ids: snapshot.unwrap_or_default(),
            });
        }

        let committed = match self.writer.commit_schedule(&plan) {
            Ok(committed) => committed,
            Err(err) => {
                warn!(
                    "event=schedule_training module=scheduler status=error series_id={series_id} error_code=commit_failed error={err}"
                );
                return Err(err.into());
            }
        };

        let mut instances = committed
            .into_iter()
            .zip(resolved_flags)
            .map(|(instance, assignee_resolved)| ScheduledInstance {
                event: instance.event,
                attendance: instance.attendance,
                assignee_resolved,
            });
        let anchor = instances.next().ok_or_else(|| {
            ScheduleError::Repo(RepoError::InvalidData(
                "schedule commit returned no anchor instance".to_string(),
            ))
        })?;
        let outcome = ScheduleOutcome {
            series_id,
            anchor,
            generated: instances.collect(),
        };

        info!(
            "event=schedule_training module=scheduler status=ok series_id={series_id} recurrence={} events={} attendance={}",
            request.recurrence.as_str(),
            outcome.event_count(),
            outcome.attendance_count()
        );
        Ok(outcome)
    }

    /// Writes a user-driven status change on one event.
    pub fn update_event_status(&self, event_id: EventId, status: StoredStatus) -> RepoResult<()> {
        self.events.update_event_status(event_id, status)
    }

    /// Marks one attendance obligation completed.
    pub fn complete_attendance(
        &self,
        event_id: EventId,
        staff_id: StaffId,
        completion_date: NaiveDate,
    ) -> RepoResult<()> {
        self.attendance
            .complete_attendance(event_id, staff_id, completion_date)
    }

    /// Seeds an event type and drops stale cache entries.
    pub fn seed_event_type(
        &self,
        cache: &mut EventTypeCache,
        name: &str,
    ) -> RepoResult<ComplianceEventType> {
        let created = self.events.create_event_type(name)?;
        cache.invalidate();
        Ok(created)
    }

    /// Lists training events with their effective status as of `today`.
    ///
    /// Returns an empty list when the training type is not seeded.
    pub fn list_resolved_events(
        &self,
        cache: &mut EventTypeCache,
        today: NaiveDate,
    ) -> RepoResult<Vec<ResolvedEvent>> {
        let Some(event_type_id) = cache.resolve(&self.events, &self.config.training_type_name)?
        else {
            return Ok(Vec::new());
        };
        let events = self.events.list_events(&EventListQuery {
            event_type_id: Some(event_type_id),
            ..EventListQuery::default()
        })?;
        Ok(resolve_events(events, today))
    }

    /// Lists one series, e.g. to re-check state after a failed call.
    pub fn list_series(
        &self,
        series_id: SeriesId,
        today: NaiveDate,
    ) -> RepoResult<Vec<ResolvedEvent>> {
        let events = self.events.list_events(&EventListQuery {
            series_id: Some(series_id),
            ..EventListQuery::default()
        })?;
        Ok(resolve_events(events, today))
    }

    /// Builds the staff x module competency matrix as of `today`.
    pub fn competency_matrix(
        &self,
        cache: &mut EventTypeCache,
        today: NaiveDate,
    ) -> RepoResult<CompetencyMatrix> {
        let training_type_id = cache.resolve(&self.events, &self.config.training_type_name)?;
        let staff = self.staff.list_staff()?;
        let events = match training_type_id {
            Some(event_type_id) => self.events.list_events(&EventListQuery {
                event_type_id: Some(event_type_id),
                ..EventListQuery::default()
            })?,
            None => Vec::new(),
        };
        let attendance = self.attendance.list_attendance()?;
        Ok(build_matrix(
            &staff,
            &events,
            &attendance,
            training_type_id,
            today,
        ))
    }

    fn snapshot_attendees(&self, assigned_to: &str) -> RepoResult<Option<Vec<StaffId>>> {
        if assigned_to == self.config.all_staff_sentinel {
            let staff = self.staff.list_staff()?;
            return Ok(Some(staff.into_iter().map(|member| member.id).collect()));
        }
        Ok(self
            .staff
            .find_staff_by_name(assigned_to)?
            .map(|member| vec![member.id]))
    }
}
