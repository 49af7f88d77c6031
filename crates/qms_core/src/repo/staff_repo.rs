//! Staff Directory contract and SQLite implementation.
//!
//! The scheduler only reads the directory; `create_staff` exists so hosts
//! and tests can seed it.

use super::{ensure_connection_ready, RepoResult};
use crate::model::staff::{NewStaff, Staff, StaffValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Staff Directory contract.
pub trait StaffDirectory {
    /// Lists the current directory ordered by id.
    fn list_staff(&self) -> RepoResult<Vec<Staff>>;
    /// Exact match on the trimmed name. Duplicated names resolve to the
    /// lowest id.
    fn find_staff_by_name(&self, name: &str) -> RepoResult<Option<Staff>>;
}

/// SQLite-backed Staff Directory.
pub struct SqliteStaffDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStaffDirectory<'conn> {
    /// Creates the directory from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["staff"])?;
        Ok(Self { conn })
    }

    /// Adds one directory entry.
    pub fn create_staff(&self, staff: &NewStaff) -> RepoResult<Staff> {
        let name = staff.name.trim();
        if name.is_empty() {
            return Err(StaffValidationError::BlankName.into());
        }
        self.conn.execute(
            "INSERT INTO staff (name, role, department) VALUES (?1, ?2, ?3);",
            params![name, staff.role.as_str(), staff.department.as_str()],
        )?;
        Ok(Staff {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            role: staff.role.clone(),
            department: staff.department.clone(),
        })
    }
}

impl StaffDirectory for SqliteStaffDirectory<'_> {
    fn list_staff(&self) -> RepoResult<Vec<Staff>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, role, department FROM staff ORDER BY id ASC;")?;
        let staff = stmt
            .query_map([], parse_staff_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(staff)
    }

    fn find_staff_by_name(&self, name: &str) -> RepoResult<Option<Staff>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name, role, department
                 FROM staff
                 WHERE name = ?1
                 ORDER BY id ASC
                 LIMIT 1;",
                [name.trim()],
                parse_staff_row,
            )
            .optional()?;
        Ok(found)
    }
}

fn parse_staff_row(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        department: row.get(3)?,
    })
}
