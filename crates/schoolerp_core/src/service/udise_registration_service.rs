//! Extracted UDISE+ registration service.
//!
//! # Responsibility
//! - Own single and bulk student registration.
//!
//! # Invariants
//! - Input is validated before any storage call.
//! - A duplicate Aadhaar number is reported as `DuplicateAadhaar`, never as a
//!   raw storage constraint failure.
//! - Bulk registration is per-row: good rows are kept, bad rows are listed
//!   in `failed` with their batch index.

use crate::model::student::{NewStudent, RegistrationStatus};
use crate::repo::student_repo::StudentRepository;
use crate::service::udise_contracts::{
    BulkRegistrationFailure, BulkRegistrationReport, RegistrationReceipt, UdiseCollaborator,
    UdiseError, UdiseRegistration, UdiseResult,
};
use log::{info, warn};
use std::collections::HashSet;

pub const REGISTRATION_COLLABORATOR_NAME: &str = "udise_registration_service";

/// Registration-only collaborator extracted from the legacy service.
pub struct UdiseRegistrationService<S: StudentRepository> {
    students: S,
}

impl<S: StudentRepository> UdiseRegistrationService<S> {
    pub fn new(students: S) -> Self {
        Self { students }
    }

    fn ensure_unique_aadhaar(&self, student: &NewStudent) -> UdiseResult<()> {
        if let Some(aadhaar_number) = student.aadhaar_number.as_deref() {
            if self.students.find_by_aadhaar(aadhaar_number)?.is_some() {
                return Err(UdiseError::DuplicateAadhaar);
            }
        }
        Ok(())
    }
}

impl<S: StudentRepository> UdiseCollaborator for UdiseRegistrationService<S> {
    fn collaborator_name(&self) -> &'static str {
        REGISTRATION_COLLABORATOR_NAME
    }
}

impl<S: StudentRepository> UdiseRegistration for UdiseRegistrationService<S> {
    fn register_student(&self, student: &NewStudent) -> UdiseResult<RegistrationReceipt> {
        student.validate()?;
        self.ensure_unique_aadhaar(student)?;

        let id = self.students.create_student(student)?;
        info!(
            "event=udise_register module=udise_registration status=ok student_id={} school_id={}",
            id, student.school_id
        );
        Ok(RegistrationReceipt {
            id,
            status: RegistrationStatus::Registered,
        })
    }

    fn bulk_register_students(
        &self,
        students: &[NewStudent],
    ) -> UdiseResult<BulkRegistrationReport> {
        if students.is_empty() {
            return Err(UdiseError::EmptyBatch);
        }

        let mut report = BulkRegistrationReport::default();
        let mut seen_aadhaar: HashSet<&str> = HashSet::new();

        for (index, student) in students.iter().enumerate() {
            let aadhaar_number = student.aadhaar_number.as_deref();
            // Only rows that were actually stored claim their Aadhaar number.
            let outcome = match aadhaar_number {
                Some(value) if seen_aadhaar.contains(value) => Err(UdiseError::DuplicateAadhaar),
                _ => self.register_student(student),
            };

            match outcome {
                Ok(receipt) => {
                    if let Some(value) = aadhaar_number {
                        seen_aadhaar.insert(value);
                    }
                    report.registered.push(receipt);
                }
                Err(err) => report.failed.push(BulkRegistrationFailure {
                    index,
                    code: err.code().to_string(),
                    reason: err.to_string(),
                }),
            }
        }

        if report.failed.is_empty() {
            info!(
                "event=udise_bulk_register module=udise_registration status=ok count={}",
                report.registered.len()
            );
        } else {
            warn!(
                "event=udise_bulk_register module=udise_registration status=partial registered={} failed={}",
                report.registered.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }
}
