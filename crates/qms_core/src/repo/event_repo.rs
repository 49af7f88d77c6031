//! Event Store contract and SQLite implementation.
//!
//! # Responsibility
//! - Create and query compliance events and their static event types.
//! - Accept user-driven status writes, never a derived status.
//!
//! # Invariants
//! - `due_date` has no update path.
//! - `event_type_id` must reference an existing type at creation time.
//! - Listing order is `due_date ASC, id ASC`.

use super::codec::{
    date_to_db, parse_date, parse_recurrence, parse_series_id, parse_stored_status,
    recurrence_to_db, stored_status_to_db,
};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::event::{
    ComplianceEvent, ComplianceEventType, EventId, EventTypeId, EventValidationError,
    NewComplianceEvent, SeriesId, StoredStatus,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    event_type_id,
    series_id,
    title,
    due_date,
    status,
    assigned_to,
    recurrence,
    notes,
    given_by
FROM compliance_events";

/// Filters for listing events. Empty query lists everything.
#[derive(Debug, Clone, Default)]
pub struct EventListQuery {
    pub event_type_id: Option<EventTypeId>,
    pub series_id: Option<SeriesId>,
}

/// Event Store contract consumed by the scheduler and view services.
pub trait EventStore {
    /// Persists one event and returns it with its store-assigned id.
    fn create_event(&self, event: &NewComplianceEvent) -> RepoResult<ComplianceEvent>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<ComplianceEvent>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<ComplianceEvent>>;
    /// Writes a user-chosen status. There is no overdue variant to write.
    fn update_event_status(&self, id: EventId, status: StoredStatus) -> RepoResult<()>;
    /// Seeds one event type. Callers holding an `EventTypeCache` must
    /// invalidate it afterwards.
    fn create_event_type(&self, name: &str) -> RepoResult<ComplianceEventType>;
    fn list_event_types(&self) -> RepoResult<Vec<ComplianceEventType>>;
    fn get_event_type(&self, id: EventTypeId) -> RepoResult<Option<ComplianceEventType>>;
    fn find_event_type_by_name(&self, name: &str) -> RepoResult<Option<ComplianceEventType>>;
}

/// SQLite-backed Event Store.
pub struct SqliteEventStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["compliance_event_types", "compliance_events"])?;
        Ok(Self { conn })
    }
}

impl EventStore for SqliteEventStore<'_> {
    fn create_event(&self, event: &NewComplianceEvent) -> RepoResult<ComplianceEvent> {
        insert_event(self.conn, event)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<ComplianceEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<ComplianceEvent>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(event_type_id) = query.event_type_id {
            sql.push_str(" AND event_type_id = ?");
            bind_values.push(Value::Integer(event_type_id));
        }
        if let Some(series_id) = query.series_id {
            sql.push_str(" AND series_id = ?");
            bind_values.push(Value::Text(series_id.to_string()));
        }
        sql.push_str(" ORDER BY due_date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn update_event_status(&self, id: EventId, status: StoredStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE compliance_events
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![stored_status_to_db(status), id],
        )?;
        if changed == 0 {
            return Err(RepoError::EventNotFound(id));
        }
        Ok(())
    }

    fn create_event_type(&self, name: &str) -> RepoResult<ComplianceEventType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EventValidationError::BlankEventTypeName.into());
        }
        self.conn.execute(
            "INSERT INTO compliance_event_types (name) VALUES (?1);",
            [name],
        )?;
        Ok(ComplianceEventType {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn list_event_types(&self) -> RepoResult<Vec<ComplianceEventType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM compliance_event_types ORDER BY id ASC;")?;
        let types = stmt
            .query_map([], parse_event_type_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(types)
    }

    fn get_event_type(&self, id: EventTypeId) -> RepoResult<Option<ComplianceEventType>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name FROM compliance_event_types WHERE id = ?1;",
                [id],
                parse_event_type_row,
            )
            .optional()?;
        Ok(found)
    }

    fn find_event_type_by_name(&self, name: &str) -> RepoResult<Option<ComplianceEventType>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name FROM compliance_event_types WHERE name = ?1;",
                [name.trim()],
                parse_event_type_row,
            )
            .optional()?;
        Ok(found)
    }
}

/// Inserts one event on `conn`, which may be an open transaction.
pub(crate) fn insert_event(
    conn: &Connection,
    event: &NewComplianceEvent,
) -> RepoResult<ComplianceEvent> {
    event.validate()?;

    let type_exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM compliance_event_types WHERE id = ?1);",
        [event.event_type_id],
        |row| row.get(0),
    )?;
    if type_exists != 1 {
        return Err(RepoError::UnknownEventType(event.event_type_id));
    }

    conn.execute(
        "INSERT INTO compliance_events (
            event_type_id,
            series_id,
            title,
            due_date,
            status,
            assigned_to,
            recurrence,
            notes,
            given_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            event.event_type_id,
            event.series_id.to_string(),
            event.title.trim(),
            date_to_db(event.due_date),
            stored_status_to_db(event.status),
            event.assigned_to.as_str(),
            recurrence_to_db(event.recurrence),
            event.notes.as_str(),
            event.given_by.as_str(),
        ],
    )?;

    let mut created = event.clone().into_event(conn.last_insert_rowid());
    created.title = created.title.trim().to_string();
    Ok(created)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<ComplianceEvent> {
    let series_text: String = row.get("series_id")?;
    let due_text: String = row.get("due_date")?;
    let status_text: String = row.get("status")?;
    let recurrence_text: String = row.get("recurrence")?;

    Ok(ComplianceEvent {
        id: row.get("id")?,
        event_type_id: row.get("event_type_id")?,
        series_id: parse_series_id(&series_text)?,
        title: row.get("title")?,
        due_date: parse_date(&due_text, "compliance_events.due_date")?,
        status: parse_stored_status(&status_text)?,
        assigned_to: row.get("assigned_to")?,
        recurrence: parse_recurrence(&recurrence_text)?,
        notes: row.get("notes")?,
        given_by: row.get("given_by")?,
    })
}

fn parse_event_type_row(row: &Row<'_>) -> rusqlite::Result<ComplianceEventType> {
    Ok(ComplianceEventType {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
