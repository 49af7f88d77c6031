//! Core use-case services.
//!
//! # Responsibility
//! - Recurrence expansion, status resolution and matrix aggregation as
//!   pure functions.
//! - Orchestrate repository calls for training scheduling and views.

pub mod matrix;
pub mod recurrence;
pub mod status;
pub mod training_service;
