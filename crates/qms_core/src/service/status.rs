//! Read-time status derivation.
//!
//! # Invariants
//! - Completed is terminal and never demoted.
//! - A due date equal to `today` is not overdue.
//! - Nothing here writes; results are recomputed on every read.

use crate::model::event::{ComplianceEvent, EffectiveStatus, StoredStatus};
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Derives the effective status of `event` as seen on `today`.
pub fn resolve_status(event: &ComplianceEvent, today: NaiveDate) -> EffectiveStatus {
    resolve_stored_status(event.status, event.due_date, today)
}

/// Same rule as [`resolve_status`] over the raw fields.
pub fn resolve_stored_status(
    status: StoredStatus,
    due_date: NaiveDate,
    today: NaiveDate,
) -> EffectiveStatus {
    match status {
        StoredStatus::Completed => EffectiveStatus::Completed,
        _ if due_date < today => EffectiveStatus::Overdue,
        other => other.into(),
    }
}

/// Event paired with its effective status, as handed to calendar views.
///
/// Serializes as the event with `status` replaced by the effective value;
/// the persisted value is kept under `stored_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
    pub event: ComplianceEvent,
    pub effective_status: EffectiveStatus,
}

impl Serialize for ResolvedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let event = &self.event;
        let mut state = serializer.serialize_struct("ResolvedEvent", 11)?;
        state.serialize_field("id", &event.id)?;
        state.serialize_field("event_type_id", &event.event_type_id)?;
        state.serialize_field("series_id", &event.series_id)?;
        state.serialize_field("title", &event.title)?;
        state.serialize_field("due_date", &event.due_date)?;
        state.serialize_field("status", &self.effective_status)?;
        state.serialize_field("stored_status", &event.status)?;
        state.serialize_field("assigned_to", &event.assigned_to)?;
        state.serialize_field("recurrence", &event.recurrence)?;
        state.serialize_field("notes", &event.notes)?;
        state.serialize_field("given_by", &event.given_by)?;
        state.end()
    }
}

/// Resolves every event against the same `today`, preserving order.
pub fn resolve_events(events: Vec<ComplianceEvent>, today: NaiveDate) -> Vec<ResolvedEvent> {
    events
        .into_iter()
        .map(|event| {
            let effective_status = resolve_status(&event, today);
            ResolvedEvent {
                event,
                effective_status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::resolve_stored_status;
    use crate::model::event::{EffectiveStatus, StoredStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn past_due_pending_is_overdue() {
        let status =
            resolve_stored_status(StoredStatus::Pending, date(2026, 1, 1), date(2026, 1, 10));
        assert_eq!(status, EffectiveStatus::Overdue);
    }

    #[test]
    fn past_due_in_progress_is_overdue() {
        let status =
            resolve_stored_status(StoredStatus::InProgress, date(2026, 1, 1), date(2026, 1, 2));
        assert_eq!(status, EffectiveStatus::Overdue);
    }

    #[test]
    fn completed_is_never_demoted() {
        let status =
            resolve_stored_status(StoredStatus::Completed, date(2020, 1, 1), date(2026, 1, 10));
        assert_eq!(status, EffectiveStatus::Completed);
    }

    #[test]
    fn due_today_keeps_stored_status() {
        let today = date(2026, 1, 10);
        assert_eq!(
            resolve_stored_status(StoredStatus::Pending, today, today),
            EffectiveStatus::Pending
        );
        assert_eq!(
            resolve_stored_status(StoredStatus::InProgress, date(2026, 2, 1), today),
            EffectiveStatus::InProgress
        );
    }
}
