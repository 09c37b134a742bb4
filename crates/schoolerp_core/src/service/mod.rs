//! UDISE+ student use-case services.
//!
//! # Responsibility
//! - Define the capability contracts shared by all collaborators.
//! - Host the legacy and extracted collaborators and the coordinator that
//!   binds operations to them.
//! - Keep CLI callers decoupled from storage details.

pub mod legacy_udise_service;
pub mod udise_contracts;
pub mod udise_registration_service;
pub mod udise_student_service;
