//! Core domain logic for SchoolERP UDISE+ student registration.
//! This crate is the single source of truth for registration invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LoggingError,
};
pub use model::school::{NewSchool, School, SchoolId, SchoolValidationError};
pub use model::student::{
    Gender, NewStudent, RegistrationStatus, SocialCategory, StudentId, StudentUpdate,
    StudentValidationError, UdiseStudent,
};
pub use repo::school_repo::{SchoolRepository, SqliteSchoolRepository};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::legacy_udise_service::LegacyUdiseService;
pub use service::udise_contracts::{
    BulkRegistrationFailure, BulkRegistrationReport, CensusExport, RegistrationReceipt,
    SubmissionIssue, SubmissionReport, UdiseCollaborator, UdiseError, UdiseRegistration,
    UdiseResult, UdiseStudentQueries, UdiseStudentUpdates, UdiseSubmission,
};
pub use service::udise_registration_service::UdiseRegistrationService;
pub use service::udise_student_service::{
    OperationBinding, UdiseOperation, UdiseStudentBindings, UdiseStudentService,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
