//! Staff directory entries. Read-only to the scheduler.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StaffId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: String,
    pub department: String,
}

/// Directory seed input; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    pub name: String,
    pub role: String,
    pub department: String,
}

impl NewStaff {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            department: department.into(),
        }
    }
}

/// Field-level validation failure for directory entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffValidationError {
    BlankName,
}

impl Display for StaffValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "staff name must not be blank"),
        }
    }
}

impl Error for StaffValidationError {}
