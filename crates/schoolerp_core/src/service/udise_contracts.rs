//! Capability contracts shared by every UDISE+ student collaborator.
//!
//! # Responsibility
//! - Name each operation the coordinator exposes, grouped by capability.
//! - Fix one error type for all collaborators so rebinding an operation
//!   never changes what callers have to match on.
//!
//! # Invariants
//! - Legacy and extracted collaborators implement the same signatures.
//! - Result envelopes are plain data; they carry no behavior.

use crate::model::school::SchoolId;
use crate::model::student::{
    NewStudent, RegistrationStatus, StudentId, StudentUpdate, StudentValidationError,
    UdiseStudent,
};
use crate::repo::student_repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type UdiseResult<T> = Result<T, UdiseError>;

/// Error returned by every UDISE+ collaborator operation.
#[derive(Debug)]
pub enum UdiseError {
    /// Input failed field validation.
    Validation(StudentValidationError),
    StudentNotFound(StudentId),
    SchoolNotFound(SchoolId),
    /// Another student already carries the submitted Aadhaar number.
    DuplicateAadhaar,
    /// Bulk registration was called without any rows.
    EmptyBatch,
    /// Update patch carried no fields.
    EmptyUpdate(StudentId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for UdiseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "udise student not found: {id}"),
            Self::SchoolNotFound(id) => write!(f, "school not found: {id}"),
            Self::DuplicateAadhaar => write!(f, "aadhaar number is already registered"),
            Self::EmptyBatch => write!(f, "bulk registration requires at least one student"),
            Self::EmptyUpdate(id) => write!(f, "update for student {id} has no fields"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UdiseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl UdiseError {
    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::StudentNotFound(_) => "student_not_found",
            Self::SchoolNotFound(_) => "school_not_found",
            Self::DuplicateAadhaar => "duplicate_aadhaar",
            Self::EmptyBatch => "empty_batch",
            Self::EmptyUpdate(_) => "empty_update",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl From<StudentValidationError> for UdiseError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for UdiseError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            RepoError::SchoolNotFound(id) => Self::SchoolNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Result of registering one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub id: StudentId,
    pub status: RegistrationStatus,
}

/// One rejected row of a bulk registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRegistrationFailure {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRegistrationReport {
    pub registered: Vec<RegistrationReceipt>,
    pub failed: Vec<BulkRegistrationFailure>,
}

/// One missing or malformed census field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionIssue {
    pub field: String,
    pub message: String,
}

/// Outcome of checking one student for UDISE+ submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub student_id: StudentId,
    pub ready: bool,
    pub issues: Vec<SubmissionIssue>,
}

/// Census export for one school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusExport {
    pub export_id: Uuid,
    pub school_id: SchoolId,
    pub udise_code: String,
    /// Unix epoch milliseconds.
    pub generated_at: i64,
    pub record_count: usize,
    pub csv: String,
}

/// Identity shared by all collaborators, used for binding inspection.
pub trait UdiseCollaborator {
    fn collaborator_name(&self) -> &'static str;
}

/// Student registration capability.
pub trait UdiseRegistration: UdiseCollaborator {
    fn register_student(&self, student: &NewStudent) -> UdiseResult<RegistrationReceipt>;
    fn bulk_register_students(
        &self,
        students: &[NewStudent],
    ) -> UdiseResult<BulkRegistrationReport>;
}

/// Student read capability.
pub trait UdiseStudentQueries: UdiseCollaborator {
    fn get_student_by_id(&self, id: StudentId) -> UdiseResult<UdiseStudent>;
    fn get_students_by_school(&self, school_id: SchoolId) -> UdiseResult<Vec<UdiseStudent>>;
}

/// Student edit capability.
pub trait UdiseStudentUpdates: UdiseCollaborator {
    fn update_student(&self, id: StudentId, update: &StudentUpdate) -> UdiseResult<UdiseStudent>;
}

/// Submission readiness and census export capability.
pub trait UdiseSubmission: UdiseCollaborator {
    fn validate_for_submission(&self, id: StudentId) -> UdiseResult<SubmissionReport>;
    fn generate_census_export(&self, school_id: SchoolId) -> UdiseResult<CensusExport>;
}

#[cfg(test)]
mod tests {
    use super::{RegistrationReceipt, UdiseError};
    use crate::model::student::{RegistrationStatus, StudentValidationError};
    use crate::repo::student_repo::RepoError;

    #[test]
    fn receipt_serializes_as_id_and_status() {
        let receipt = RegistrationReceipt {
            id: 42,
            status: RegistrationStatus::Registered,
        };
        let json = serde_json::to_value(&receipt).expect("receipt should serialize");
        assert_eq!(json, serde_json::json!({"id": 42, "status": "registered"}));
    }

    #[test]
    fn repo_errors_map_to_semantic_variants() {
        assert!(matches!(
            UdiseError::from(RepoError::NotFound(9)),
            UdiseError::StudentNotFound(9)
        ));
        assert!(matches!(
            UdiseError::from(RepoError::SchoolNotFound(3)),
            UdiseError::SchoolNotFound(3)
        ));
        assert!(matches!(
            UdiseError::from(RepoError::Validation(StudentValidationError::EmptyName)),
            UdiseError::Validation(StudentValidationError::EmptyName)
        ));
        assert!(matches!(
            UdiseError::from(RepoError::InvalidData("x".to_string())),
            UdiseError::Repo(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(UdiseError::DuplicateAadhaar.code(), "duplicate_aadhaar");
        assert_eq!(UdiseError::StudentNotFound(1).code(), "student_not_found");
    }
}
