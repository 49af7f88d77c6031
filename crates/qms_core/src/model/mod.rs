//! Domain model for compliance scheduling.
//!
//! # Responsibility
//! - Define the records shared by the Event Store, Attendance Ledger and
//!   Staff Directory boundaries.
//! - Separate persisted status from read-time derived status at the type level.
//!
//! # Invariants
//! - `due_date` and identity fields never change after creation.
//! - `overdue` is never a storable status.

pub mod attendance;
pub mod event;
pub mod staff;
