//! Competency matrix aggregation.
//!
//! # Responsibility
//! - Build a dense staff x training-module grid of effective statuses.
//!
//! # Invariants
//! - Module identity is the event title; ids do not distinguish modules.
//! - Every staff member has a cell for every module.
//! - For each `(staff, module)` the record whose event has the latest due
//!   date wins; equal due dates fall back to the highest event id.
//! - Aggregation is read-only and deterministic for the same inputs.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::event::{ComplianceEvent, EffectiveStatus, EventId, EventTypeId};
use crate::model::staff::{Staff, StaffId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Matrix cell value: an effective status, or no obligation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompetencyStatus {
    NotRequired,
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl From<EffectiveStatus> for CompetencyStatus {
    fn from(value: EffectiveStatus) -> Self {
        match value {
            EffectiveStatus::Pending => Self::Pending,
            EffectiveStatus::InProgress => Self::InProgress,
            EffectiveStatus::Completed => Self::Completed,
            EffectiveStatus::Overdue => Self::Overdue,
        }
    }
}

impl CompetencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRequired => "not-required",
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

/// Staff x module grid. Modules are sorted by title, rows by staff id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompetencyMatrix {
    modules: Vec<String>,
    rows: BTreeMap<StaffId, BTreeMap<String, CompetencyStatus>>,
}

impl CompetencyMatrix {
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn rows(&self) -> &BTreeMap<StaffId, BTreeMap<String, CompetencyStatus>> {
        &self.rows
    }

    /// Cell lookup; `None` when the staff id or module is not in the grid.
    pub fn status(&self, staff_id: StaffId, module: &str) -> Option<CompetencyStatus> {
        self.rows.get(&staff_id)?.get(module).copied()
    }

    pub fn staff_count(&self) -> usize {
        self.rows.len()
    }
}

/// Builds the competency matrix as of `today`.
///
/// Only events of `training_type_id` define modules. `None` (type not
/// seeded) yields rows with no modules rather than an error. Attendance
/// rows pointing at other events are ignored.
pub fn build_matrix(
    staff: &[Staff],
    events: &[ComplianceEvent],
    attendance: &[AttendanceRecord],
    training_type_id: Option<EventTypeId>,
    today: NaiveDate,
) -> CompetencyMatrix {
    let training_events: HashMap<EventId, &ComplianceEvent> = match training_type_id {
        Some(type_id) => events
            .iter()
            .filter(|event| event.event_type_id == type_id)
            .map(|event| (event.id, event))
            .collect(),
        None => HashMap::new(),
    };

    let modules: BTreeSet<&str> = training_events
        .values()
        .map(|event| event.title.as_str())
        .collect();

    let mut latest: HashMap<(StaffId, &str), (&AttendanceRecord, &ComplianceEvent)> =
        HashMap::new();
    for record in attendance {
        let Some(event) = training_events.get(&record.event_id).copied() else {
            continue;
        };
        let key = (record.staff_id, event.title.as_str());
        let replace = match latest.get(&key) {
            Some((_, current)) => is_more_relevant(event, current),
            None => true,
        };
        if replace {
            latest.insert(key, (record, event));
        }
    }

    let rows = staff
        .iter()
        .map(|member| {
            let row = modules
                .iter()
                .map(|&module| {
                    let status = latest
                        .get(&(member.id, module))
                        .map_or(CompetencyStatus::NotRequired, |(record, event)| {
                            cell_status(record, event, today)
                        });
                    (module.to_string(), status)
                })
                .collect();
            (member.id, row)
        })
        .collect();

    CompetencyMatrix {
        modules: modules.into_iter().map(str::to_string).collect(),
        rows,
    }
}

fn is_more_relevant(candidate: &ComplianceEvent, current: &ComplianceEvent) -> bool {
    (candidate.due_date, candidate.id) > (current.due_date, current.id)
}

fn cell_status(
    record: &AttendanceRecord,
    event: &ComplianceEvent,
    today: NaiveDate,
) -> CompetencyStatus {
    match record.status {
        AttendanceStatus::Completed => CompetencyStatus::Completed,
        _ if event.due_date < today => CompetencyStatus::Overdue,
        AttendanceStatus::InProgress => CompetencyStatus::InProgress,
        AttendanceStatus::Pending => CompetencyStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_matrix, CompetencyStatus};
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::model::event::{ComplianceEvent, Recurrence, StoredStatus};
    use crate::model::staff::Staff;
    use chrono::NaiveDate;
    use uuid::Uuid;

    const TRAINING: i64 = 1;
    const AUDIT: i64 = 2;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn staff(id: i64, name: &str) -> Staff {
        Staff {
            id,
            name: name.to_string(),
            role: "Scientist".to_string(),
            department: "Molecular".to_string(),
        }
    }

    fn event(id: i64, type_id: i64, title: &str, due: NaiveDate) -> ComplianceEvent {
        ComplianceEvent {
            id,
            event_type_id: type_id,
            series_id: Uuid::nil(),
            title: title.to_string(),
            due_date: due,
            status: StoredStatus::Pending,
            assigned_to: "All Staff".to_string(),
            recurrence: Recurrence::OneTime,
            notes: String::new(),
            given_by: String::new(),
        }
    }

    fn record(event_id: i64, staff_id: i64, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            event_id,
            staff_id,
            status,
            completion_date: None,
        }
    }

    #[test]
    fn staff_without_records_is_not_required() {
        let today = date(2026, 1, 10);
        let people = vec![staff(1, "Alice"), staff(2, "Bob")];
        let events = vec![event(10, TRAINING, "Fire Safety", date(2026, 2, 1))];
        let attendance = vec![record(10, 2, AttendanceStatus::Completed)];

        let matrix = build_matrix(&people, &events, &attendance, Some(TRAINING), today);

        assert_eq!(
            matrix.status(1, "Fire Safety"),
            Some(CompetencyStatus::NotRequired)
        );
        assert_eq!(
            matrix.status(2, "Fire Safety"),
            Some(CompetencyStatus::Completed)
        );
    }

    #[test]
    fn latest_due_date_record_wins() {
        let today = date(2026, 3, 1);
        let people = vec![staff(1, "Alice")];
        let events = vec![
            event(10, TRAINING, "Biosafety", date(2026, 1, 1)),
            event(11, TRAINING, "Biosafety", date(2026, 6, 1)),
        ];
        let attendance = vec![
            record(11, 1, AttendanceStatus::Pending),
            record(10, 1, AttendanceStatus::Completed),
        ];

        let matrix = build_matrix(&people, &events, &attendance, Some(TRAINING), today);
        assert_eq!(matrix.modules(), ["Biosafety".to_string()]);
        assert_eq!(matrix.status(1, "Biosafety"), Some(CompetencyStatus::Pending));
    }

    #[test]
    fn past_due_incomplete_record_is_overdue() {
        let today = date(2026, 3, 1);
        let people = vec![staff(1, "Alice")];
        let events = vec![event(10, TRAINING, "Biosafety", date(2026, 2, 28))];
        let attendance = vec![record(10, 1, AttendanceStatus::InProgress)];

        let matrix = build_matrix(&people, &events, &attendance, Some(TRAINING), today);
        assert_eq!(matrix.status(1, "Biosafety"), Some(CompetencyStatus::Overdue));
    }

    #[test]
    fn equal_due_dates_break_ties_by_highest_event_id() {
        let today = date(2026, 1, 1);
        let due = date(2026, 5, 1);
        let people = vec![staff(1, "Alice")];
        let events = vec![
            event(20, TRAINING, "GCP", due),
            event(21, TRAINING, "GCP", due),
        ];

        let forward = vec![
            record(21, 1, AttendanceStatus::InProgress),
            record(20, 1, AttendanceStatus::Completed),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        for attendance in [forward, reversed] {
            let matrix = build_matrix(&people, &events, &attendance, Some(TRAINING), today);
            assert_eq!(matrix.status(1, "GCP"), Some(CompetencyStatus::InProgress));
        }
    }

    #[test]
    fn non_training_events_do_not_create_modules() {
        let today = date(2026, 1, 1);
        let people = vec![staff(1, "Alice")];
        let events = vec![
            event(10, TRAINING, "Fire Safety", date(2026, 2, 1)),
            event(11, AUDIT, "Internal Audit", date(2026, 2, 1)),
        ];
        let attendance = vec![record(11, 1, AttendanceStatus::Pending)];

        let matrix = build_matrix(&people, &events, &attendance, Some(TRAINING), today);
        assert_eq!(matrix.modules(), ["Fire Safety".to_string()]);
        assert_eq!(matrix.status(1, "Internal Audit"), None);
    }

    #[test]
    fn missing_training_type_yields_rows_without_modules() {
        let people = vec![staff(1, "Alice"), staff(2, "Bob")];
        let events = vec![event(10, TRAINING, "Fire Safety", date(2026, 2, 1))];

        let matrix = build_matrix(&people, &events, &[], None, date(2026, 1, 1));
        assert!(matrix.modules().is_empty());
        assert_eq!(matrix.staff_count(), 2);
        assert!(matrix.rows().values().all(|row| row.is_empty()));
    }

    #[test]
    fn grid_is_dense_and_rebuild_is_identical() {
        let today = date(2026, 1, 15);
        let people = vec![staff(1, "Alice"), staff(2, "Bob"), staff(3, "Chen")];
        let events = vec![
            event(10, TRAINING, "Fire Safety", date(2026, 1, 1)),
            event(11, TRAINING, "Biosafety", date(2026, 2, 1)),
            event(12, TRAINING, "Fire Safety", date(2026, 4, 1)),
        ];
        let attendance = vec![
            record(10, 1, AttendanceStatus::Pending),
            record(11, 2, AttendanceStatus::Completed),
            record(12, 3, AttendanceStatus::Pending),
        ];

        let first = build_matrix(&people, &events, &attendance, Some(TRAINING), today);
        let second = build_matrix(&people, &events, &attendance, Some(TRAINING), today);

        assert_eq!(first, second);
        assert_eq!(first.staff_count(), people.len());
        for row in first.rows().values() {
            assert_eq!(row.len(), 2);
        }
        assert_eq!(first.status(1, "Fire Safety"), Some(CompetencyStatus::Overdue));
        assert_eq!(first.status(3, "Fire Safety"), Some(CompetencyStatus::Pending));
        assert_eq!(first.status(1, "Biosafety"), Some(CompetencyStatus::NotRequired));
    }
}
