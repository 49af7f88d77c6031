//! FFI use-case API for the calendar, matrix and export views.
//!
//! # Responsibility
//! - Expose scheduling and read use-cases to the UI through FRB.
//! - Translate UI strings (dates, recurrence, status) into core types.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures come back as envelopes with `ok=false` and a message; a failed
//!   scheduling call has persisted nothing.
//! - Dates cross the boundary as `YYYY-MM-DD` strings.

use chrono::{Local, NaiveDate};
use log::warn;
use qms_core::db::open_db;
use qms_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EventTypeCache, NewStaff, Recurrence, ScheduleTrainingRequest, SchedulerConfig,
    SqliteStaffDirectory, SqliteTrainingService, StaffDirectory, StoredStatus,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "qms_compliance.sqlite3";
const DB_PATH_ENV: &str = "QMS_DB_PATH";
const DATE_FORMAT: &str = "%Y-%m-%d";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created or touched record, when there is one.
    pub id: Option<i64>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<i64>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Scheduling envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResponse {
    pub ok: bool,
    pub series_id: Option<String>,
    /// Anchor first, then generated instances.
    pub event_ids: Vec<i64>,
    pub attendance_count: u32,
    /// Named assignee was not found; events exist without attendance.
    pub assignee_unresolved: bool,
    pub message: String,
}

impl ScheduleResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            series_id: None,
            event_ids: Vec::new(),
            attendance_count: 0,
            assignee_unresolved: false,
            message: message.into(),
        }
    }
}

/// One row of the calendar / tabular schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarItem {
    pub event_id: i64,
    pub series_id: String,
    pub title: String,
    pub due_date: String,
    /// Effective status (`pending|in-progress|completed|overdue`).
    pub status: String,
    pub assigned_to: String,
    pub recurrence: String,
    pub given_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarResponse {
    pub ok: bool,
    pub items: Vec<CalendarItem>,
    pub message: String,
}

/// One staff row of the competency matrix; `statuses` follows `modules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub staff_id: i64,
    pub staff_name: String,
    pub department: String,
    pub statuses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixResponse {
    pub ok: bool,
    pub modules: Vec<String>,
    pub rows: Vec<MatrixRow>,
    pub message: String,
}

impl MatrixResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            modules: Vec::new(),
            rows: Vec::new(),
            message: message.into(),
        }
    }
}

/// Adds one staff member to the local directory mirror.
#[flutter_rust_bridge::frb(sync)]
pub fn register_staff(name: String, role: String, department: String) -> ActionResponse {
    let result = with_connection(|conn| {
        let directory = SqliteStaffDirectory::try_new(conn).map_err(|err| err.to_string())?;
        directory
            .create_staff(&NewStaff::new(name.trim(), role.trim(), department.trim()))
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(staff) => ActionResponse::success("Staff registered.", Some(staff.id)),
        Err(err) => ActionResponse::failure(format!("register_staff failed: {err}")),
    }
}

/// Schedules a training requirement and its recurring instances.
///
/// # FFI contract
/// - `due_date`: `YYYY-MM-DD`.
/// - `recurrence`: `one-time|monthly|quarterly|yearly`.
/// - `assigned_to`: staff name or `All Staff`.
#[flutter_rust_bridge::frb(sync)]
pub fn schedule_training(
    title: String,
    due_date: String,
    assigned_to: String,
    recurrence: String,
    notes: String,
    given_by: String,
) -> ScheduleResponse {
    let Some(due_date) = parse_date(&due_date) else {
        return ScheduleResponse::failure(format!(
            "schedule_training failed: invalid due date `{due_date}`"
        ));
    };
    let Some(recurrence) = Recurrence::parse(&recurrence) else {
        return ScheduleResponse::failure(format!(
            "schedule_training failed: unsupported recurrence `{recurrence}`"
        ));
    };
    let request = ScheduleTrainingRequest {
        title,
        due_date,
        assigned_to,
        recurrence,
        notes,
        given_by,
    };

    let result = with_training_service(|service, cache| {
        service
            .schedule_training(cache, &request)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(outcome) => {
            let assignee_unresolved = outcome
                .instances()
                .any(|instance| !instance.assignee_resolved);
            let message = if assignee_unresolved {
                format!(
                    "Scheduled {} event(s); assignee not found, no attendance recorded.",
                    outcome.event_count()
                )
            } else {
                format!("Scheduled {} event(s).", outcome.event_count())
            };
            ScheduleResponse {
                ok: true,
                series_id: Some(outcome.series_id.to_string()),
                event_ids: outcome.instances().map(|instance| instance.event.id).collect(),
                attendance_count: u32::try_from(outcome.attendance_count()).unwrap_or(u32::MAX),
                assignee_unresolved,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_schedule_training module=ffi status=error");
            ScheduleResponse::failure(format!(
                "schedule_training failed: {err}. Please re-check the schedule and retry."
            ))
        }
    }
}

/// Writes a user-chosen status. `overdue` is derived and cannot be written.
#[flutter_rust_bridge::frb(sync)]
pub fn update_event_status(event_id: i64, status: String) -> ActionResponse {
    let Some(status) = parse_stored_status(&status) else {
        return ActionResponse::failure(format!(
            "update_event_status failed: status `{status}` cannot be stored"
        ));
    };
    match with_training_service(|service, _| {
        service
            .update_event_status(event_id, status)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Status updated.", Some(event_id)),
        Err(err) => ActionResponse::failure(format!("update_event_status failed: {err}")),
    }
}

/// Marks one staff member's attendance completed.
#[flutter_rust_bridge::frb(sync)]
pub fn complete_attendance(
    event_id: i64,
    staff_id: i64,
    completion_date: String,
) -> ActionResponse {
    let Some(completion_date) = parse_date(&completion_date) else {
        return ActionResponse::failure(format!(
            "complete_attendance failed: invalid date `{completion_date}`"
        ));
    };
    match with_training_service(|service, _| {
        service
            .complete_attendance(event_id, staff_id, completion_date)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ActionResponse::success("Attendance completed.", Some(event_id)),
        Err(err) => ActionResponse::failure(format!("complete_attendance failed: {err}")),
    }
}

/// Lists training events with effective status as of `today` (local date
/// when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn training_calendar(today: Option<String>) -> CalendarResponse {
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => {
            return CalendarResponse {
                ok: false,
                items: Vec::new(),
                message: format!("training_calendar failed: {err}"),
            }
        }
    };
    let result = with_training_service(|service, cache| {
        service
            .list_resolved_events(cache, today)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(events) => {
            let items = events
                .into_iter()
                .map(|resolved| CalendarItem {
                    event_id: resolved.event.id,
                    series_id: resolved.event.series_id.to_string(),
                    title: resolved.event.title,
                    due_date: resolved.event.due_date.format(DATE_FORMAT).to_string(),
                    status: resolved.effective_status.as_str().to_string(),
                    assigned_to: resolved.event.assigned_to,
                    recurrence: resolved.event.recurrence.as_str().to_string(),
                    given_by: resolved.event.given_by,
                })
                .collect::<Vec<_>>();
            let message = format!("{} training event(s).", items.len());
            CalendarResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => CalendarResponse {
            ok: false,
            items: Vec::new(),
            message: format!("training_calendar failed: {err}"),
        },
    }
}

/// Builds the staff x module competency matrix as of `today`.
#[flutter_rust_bridge::frb(sync)]
pub fn competency_matrix(today: Option<String>) -> MatrixResponse {
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return MatrixResponse::failure(format!("competency_matrix failed: {err}")),
    };
    let result = with_connection(|conn| {
        let service = SqliteTrainingService::try_from_connection(conn, SchedulerConfig::default())
            .map_err(|err| err.to_string())?;
        let directory = SqliteStaffDirectory::try_new(conn).map_err(|err| err.to_string())?;
        let mut cache = EventTypeCache::new();
        let matrix = service
            .competency_matrix(&mut cache, today)
            .map_err(|err| err.to_string())?;
        let staff = directory.list_staff().map_err(|err| err.to_string())?;
        Ok((matrix, staff))
    });

    match result {
        Ok((matrix, staff)) => {
            let modules = matrix.modules().to_vec();
            let rows = staff
                .into_iter()
                .filter_map(|member| {
                    let row = matrix.rows().get(&member.id)?;
                    let statuses = modules
                        .iter()
                        .map(|module| {
                            row.get(module)
                                .map_or("not-required", |status| status.as_str())
                                .to_string()
                        })
                        .collect();
                    Some(MatrixRow {
                        staff_id: member.id,
                        staff_name: member.name,
                        department: member.department,
                        statuses,
                    })
                })
                .collect::<Vec<_>>();
            let message = format!("{} staff x {} module(s).", rows.len(), modules.len());
            MatrixResponse {
                ok: true,
                modules,
                rows,
                message,
            }
        }
        Err(err) => MatrixResponse::failure(format!("competency_matrix failed: {err}")),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn parse_stored_status(value: &str) -> Option<StoredStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pending" => Some(StoredStatus::Pending),
        "in-progress" | "in_progress" => Some(StoredStatus::InProgress),
        "completed" => Some(StoredStatus::Completed),
        _ => None,
    }
}

fn resolve_today(today: Option<String>) -> Result<NaiveDate, String> {
    match today {
        Some(value) => parse_date(&value).ok_or_else(|| format!("invalid date `{value}`")),
        None => Ok(Local::now().date_naive()),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_connection<T>(
    f: impl FnOnce(&rusqlite::Connection) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn with_training_service<T>(
    f: impl FnOnce(&SqliteTrainingService<'_>, &mut EventTypeCache) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let service = SqliteTrainingService::try_from_connection(conn, SchedulerConfig::default())
            .map_err(|err| format!("service init failed: {err}"))?;
        let mut cache = EventTypeCache::new();
        f(&service, &mut cache)
    })
}

#[cfg(test)]
mod tests {
    use super::{
        competency_matrix, complete_attendance, core_version, init_logging, ping,
        register_staff, schedule_training, training_calendar, update_event_status,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn schedule_training_rejects_bad_date_and_recurrence() {
        let bad_date = schedule_training(
            "GCP".to_string(),
            "05/01/2026".to_string(),
            "All Staff".to_string(),
            "monthly".to_string(),
            String::new(),
            String::new(),
        );
        assert!(!bad_date.ok);
        assert!(bad_date.message.contains("due date"));

        let bad_recurrence = schedule_training(
            "GCP".to_string(),
            "2026-01-05".to_string(),
            "All Staff".to_string(),
            "fortnightly".to_string(),
            String::new(),
            String::new(),
        );
        assert!(!bad_recurrence.ok);
        assert!(bad_recurrence.message.contains("recurrence"));
    }

    #[test]
    fn update_event_status_refuses_overdue() {
        let response = update_event_status(1, "overdue".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("cannot be stored"));
    }

    #[test]
    fn schedule_then_complete_flows_into_calendar_and_matrix() {
        let name = unique_token("staff");
        let title = unique_token("module");
        let staff = register_staff(name.clone(), "Technologist".to_string(), "QC".to_string());
        assert!(staff.ok, "{}", staff.message);
        let staff_id = staff.id.expect("staff id");

        let scheduled = schedule_training(
            title.clone(),
            "2026-01-05".to_string(),
            name.clone(),
            "quarterly".to_string(),
            String::new(),
            "QA".to_string(),
        );
        assert!(scheduled.ok, "{}", scheduled.message);
        assert_eq!(scheduled.event_ids.len(), 4);
        assert_eq!(scheduled.attendance_count, 4);
        assert!(!scheduled.assignee_unresolved);

        let last_event = *scheduled.event_ids.last().unwrap();
        let completed = complete_attendance(last_event, staff_id, "2026-09-30".to_string());
        assert!(completed.ok, "{}", completed.message);

        let calendar = training_calendar(Some("2026-02-01".to_string()));
        assert!(calendar.ok, "{}", calendar.message);
        let ours = calendar
            .items
            .iter()
            .filter(|item| item.title == title)
            .collect::<Vec<_>>();
        assert_eq!(ours.len(), 4);
        assert_eq!(ours[0].status, "overdue");
        assert_eq!(ours[1].status, "pending");

        let matrix = competency_matrix(Some("2026-02-01".to_string()));
        assert!(matrix.ok, "{}", matrix.message);
        let column = matrix
            .modules
            .iter()
            .position(|module| *module == title)
            .expect("module column");
        let row = matrix
            .rows
            .iter()
            .find(|row| row.staff_id == staff_id)
            .expect("staff row");
        assert_eq!(row.statuses[column], "completed");
    }

    #[test]
    fn unknown_assignee_is_reported_but_not_fatal() {
        let response = schedule_training(
            unique_token("module"),
            "2026-03-01".to_string(),
            unique_token("ghost"),
            "one-time".to_string(),
            String::new(),
            String::new(),
        );
        assert!(response.ok, "{}", response.message);
        assert!(response.assignee_unresolved);
        assert_eq!(response.attendance_count, 0);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
