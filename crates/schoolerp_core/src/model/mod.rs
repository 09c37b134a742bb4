//! Domain model for UDISE+ student registration.
//!
//! # Responsibility
//! - Define canonical school and student shapes shared by repositories,
//!   collaborators and the coordinator.
//!
//! # Invariants
//! - Every student belongs to exactly one school.
//! - Identifiers are assigned by storage and never reused.

pub mod school;
pub mod student;
