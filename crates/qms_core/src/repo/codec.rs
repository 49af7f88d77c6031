//! Column encodings for compliance tables.

use super::{RepoError, RepoResult};
use crate::model::attendance::AttendanceStatus;
use crate::model::event::{Recurrence, SeriesId, StoredStatus};
use chrono::NaiveDate;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(super) fn parse_date(value: &str, column: &'static str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(super) fn parse_series_id(value: &str) -> RepoResult<SeriesId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid `{value}` in compliance_events.series_id"
        ))
    })
}

pub(super) fn stored_status_to_db(status: StoredStatus) -> &'static str {
    match status {
        StoredStatus::Pending => "pending",
        StoredStatus::InProgress => "in_progress",
        StoredStatus::Completed => "completed",
    }
}

pub(super) fn parse_stored_status(value: &str) -> RepoResult<StoredStatus> {
    match value {
        "pending" => Ok(StoredStatus::Pending),
        "in_progress" => Ok(StoredStatus::InProgress),
        "completed" => Ok(StoredStatus::Completed),
        other => Err(RepoError::InvalidData(format!(
            "invalid status `{other}` in compliance_events.status"
        ))),
    }
}

pub(super) fn attendance_status_to_db(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Pending => "pending",
        AttendanceStatus::InProgress => "in_progress",
        AttendanceStatus::Completed => "completed",
    }
}

pub(super) fn parse_attendance_status(value: &str) -> RepoResult<AttendanceStatus> {
    match value {
        "pending" => Ok(AttendanceStatus::Pending),
        "in_progress" => Ok(AttendanceStatus::InProgress),
        "completed" => Ok(AttendanceStatus::Completed),
        other => Err(RepoError::InvalidData(format!(
            "invalid status `{other}` in attendance_records.status"
        ))),
    }
}

pub(super) fn recurrence_to_db(recurrence: Recurrence) -> &'static str {
    match recurrence {
        Recurrence::OneTime => "one_time",
        Recurrence::Monthly => "monthly",
        Recurrence::Quarterly => "quarterly",
        Recurrence::Yearly => "yearly",
    }
}

pub(super) fn parse_recurrence(value: &str) -> RepoResult<Recurrence> {
    match value {
        "one_time" => Ok(Recurrence::OneTime),
        "monthly" => Ok(Recurrence::Monthly),
        "quarterly" => Ok(Recurrence::Quarterly),
        "yearly" => Ok(Recurrence::Yearly),
        other => Err(RepoError::InvalidData(format!(
            "invalid recurrence `{other}` in compliance_events.recurrence"
        ))),
    }
}
