//! Compliance event and event type records.
//!
//! # Invariants
//! - `StoredStatus` has no overdue variant; overdue only exists as an
//!   `EffectiveStatus` computed on read.
//! - `title` is non-blank for every persisted event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier of a compliance event.
pub type EventId = i64;
/// Store-assigned identifier of a compliance event type.
pub type EventTypeId = i64;
/// Groups the anchor and generated instances of one scheduling request.
pub type SeriesId = Uuid;

/// Static reference data, e.g. `Training` or `Audit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceEventType {
    pub id: EventTypeId,
    pub name: String,
}

/// Status values a user action may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoredStatus {
    Pending,
    InProgress,
    Completed,
}

/// Status shown to callers after comparing the stored state with "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectiveStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl From<StoredStatus> for EffectiveStatus {
    fn from(value: StoredStatus) -> Self {
        match value {
            StoredStatus::Pending => Self::Pending,
            StoredStatus::InProgress => Self::InProgress,
            StoredStatus::Completed => Self::Completed,
        }
    }
}

impl EffectiveStatus {
    /// Stable kebab-case label used by views and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

/// Recurrence cadence of a scheduling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recurrence {
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
}

impl Recurrence {
    /// Calendar months between consecutive instances, `None` for one-time.
    pub fn month_step(self) -> Option<u32> {
        match self {
            Self::OneTime => None,
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses a UI-facing label. Case and surrounding whitespace are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "one-time" | "one_time" | "once" => Some(Self::OneTime),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" | "annual" | "annually" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Persisted compliance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub id: EventId,
    pub event_type_id: EventTypeId,
    pub series_id: SeriesId,
    /// Module identity for the competency matrix.
    pub title: String,
    pub due_date: NaiveDate,
    pub status: StoredStatus,
    /// Staff name or the all-staff sentinel.
    pub assigned_to: String,
    pub recurrence: Recurrence,
    pub notes: String,
    pub given_by: String,
}

/// Event fields supplied by the caller; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplianceEvent {
    pub event_type_id: EventTypeId,
    pub series_id: SeriesId,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: StoredStatus,
    pub assigned_to: String,
    pub recurrence: Recurrence,
    pub notes: String,
    pub given_by: String,
}

impl NewComplianceEvent {
    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Attaches the store-assigned id.
    pub fn into_event(self, id: EventId) -> ComplianceEvent {
        ComplianceEvent {
            id,
            event_type_id: self.event_type_id,
            series_id: self.series_id,
            title: self.title,
            due_date: self.due_date,
            status: self.status,
            assigned_to: self.assigned_to,
            recurrence: self.recurrence,
            notes: self.notes,
            given_by: self.given_by,
        }
    }
}

/// Field-level validation failure for compliance events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    BlankTitle,
    BlankEventTypeName,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::BlankEventTypeName => write!(f, "event type name must not be blank"),
        }
    }
}

impl Error for EventValidationError {}
