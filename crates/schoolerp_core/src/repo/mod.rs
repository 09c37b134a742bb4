//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts used by the UDISE+ collaborators.
//! - Keep SQLite query details out of service orchestration.
//!
//! # Invariants
//! - Repository writes validate model input before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `SchoolNotFound`)
//!   in addition to DB transport errors.

pub mod school_repo;
pub mod student_repo;
