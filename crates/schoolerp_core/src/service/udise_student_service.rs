//! UDISE+ student service coordinator.
//!
//! # Responsibility
//! - Present one stable surface for UDISE+ student operations while their
//!   implementations move out of the legacy service one at a time.
//!
//! # Invariants
//! - Every operation forwards to exactly one bound collaborator.
//! - Arguments and results pass through untouched; errors are never caught,
//!   wrapped or translated.
//! - Bindings are fixed at construction. The coordinator holds no state and
//!   performs no I/O of its own.
//!
//! # Migration status
//! | operation                                 | bound to                     |
//! |-------------------------------------------|------------------------------|
//! | `register_student_with_udise`             | `udise_registration_service` |
//! | `bulk_register_students_with_udise`       | `udise_registration_service` |
//! | `get_udise_student_by_id`                 | `legacy_udise_service`       |
//! | `get_udise_students_by_school`            | `legacy_udise_service`       |
//! | `update_udise_student`                    | `legacy_udise_service`       |
//! | `validate_udise_student_for_submission`   | `legacy_udise_service`       |
//! | `generate_udise_census_export`            | `legacy_udise_service`       |

use crate::model::school::SchoolId;
use crate::model::student::{NewStudent, StudentId, StudentUpdate, UdiseStudent};
use crate::service::udise_contracts::{
    BulkRegistrationReport, CensusExport, RegistrationReceipt, SubmissionReport,
    UdiseCollaborator, UdiseRegistration, UdiseResult, UdiseStudentQueries, UdiseStudentUpdates,
    UdiseSubmission,
};
use serde::Serialize;

/// Operations exposed by [`UdiseStudentService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UdiseOperation {
    RegisterStudentWithUdise,
    BulkRegisterStudentsWithUdise,
    GetUdiseStudentById,
    GetUdiseStudentsBySchool,
    UpdateUdiseStudent,
    ValidateUdiseStudentForSubmission,
    GenerateUdiseCensusExport,
}

impl UdiseOperation {
    pub const ALL: [Self; 7] = [
        Self::RegisterStudentWithUdise,
        Self::BulkRegisterStudentsWithUdise,
        Self::GetUdiseStudentById,
        Self::GetUdiseStudentsBySchool,
        Self::UpdateUdiseStudent,
        Self::ValidateUdiseStudentForSubmission,
        Self::GenerateUdiseCensusExport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisterStudentWithUdise => "register_student_with_udise",
            Self::BulkRegisterStudentsWithUdise => "bulk_register_students_with_udise",
            Self::GetUdiseStudentById => "get_udise_student_by_id",
            Self::GetUdiseStudentsBySchool => "get_udise_students_by_school",
            Self::UpdateUdiseStudent => "update_udise_student",
            Self::ValidateUdiseStudentForSubmission => "validate_udise_student_for_submission",
            Self::GenerateUdiseCensusExport => "generate_udise_census_export",
        }
    }
}

/// One row of the coordinator's binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationBinding {
    pub operation: UdiseOperation,
    pub collaborator: &'static str,
}

/// Per-operation collaborator references.
///
/// Each field serves exactly the operation it is named after, so rebinding
/// one field leaves every other operation where it was.
#[derive(Clone, Copy)]
pub struct UdiseStudentBindings<'a> {
    pub register: &'a dyn UdiseRegistration,
    pub bulk_register: &'a dyn UdiseRegistration,
    pub get_by_id: &'a dyn UdiseStudentQueries,
    pub get_by_school: &'a dyn UdiseStudentQueries,
    pub update: &'a dyn UdiseStudentUpdates,
    pub validate_for_submission: &'a dyn UdiseSubmission,
    pub census_export: &'a dyn UdiseSubmission,
}

impl<'a> UdiseStudentBindings<'a> {
    /// Current migration state: registration extracted, the rest legacy.
    pub fn current<L>(registration: &'a dyn UdiseRegistration, legacy: &'a L) -> Self
    where
        L: UdiseStudentQueries + UdiseStudentUpdates + UdiseSubmission + 'a,
    {
        Self {
            register: registration,
            bulk_register: registration,
            get_by_id: legacy,
            get_by_school: legacy,
            update: legacy,
            validate_for_submission: legacy,
            census_export: legacy,
        }
    }

    /// Every operation served by one collaborator.
    pub fn all_from<L>(collaborator: &'a L) -> Self
    where
        L: UdiseRegistration + UdiseStudentQueries + UdiseStudentUpdates + UdiseSubmission + 'a,
    {
        Self {
            register: collaborator,
            bulk_register: collaborator,
            get_by_id: collaborator,
            get_by_school: collaborator,
            update: collaborator,
            validate_for_submission: collaborator,
            census_export: collaborator,
        }
    }
}

/// Stable facade over the UDISE+ student collaborators.
#[derive(Clone, Copy)]
pub struct UdiseStudentService<'a> {
    bindings: UdiseStudentBindings<'a>,
}

impl<'a> UdiseStudentService<'a> {
    /// Binds registration to the extracted service and everything else to
    /// the legacy service.
    pub fn new<L>(registration: &'a dyn UdiseRegistration, legacy: &'a L) -> Self
    where
        L: UdiseStudentQueries + UdiseStudentUpdates + UdiseSubmission + 'a,
    {
        Self::from_bindings(UdiseStudentBindings::current(registration, legacy))
    }

    pub fn from_bindings(bindings: UdiseStudentBindings<'a>) -> Self {
        Self { bindings }
    }

    pub fn register_student_with_udise(
        &self,
        student: &NewStudent,
    ) -> UdiseResult<RegistrationReceipt> {
        self.bindings.register.register_student(student)
    }

    pub fn bulk_register_students_with_udise(
        &self,
        students: &[NewStudent],
    ) -> UdiseResult<BulkRegistrationReport> {
        self.bindings.bulk_register.bulk_register_students(students)
    }

    pub fn get_udise_student_by_id(&self, id: StudentId) -> UdiseResult<UdiseStudent> {
        self.bindings.get_by_id.get_student_by_id(id)
    }

    pub fn get_udise_students_by_school(
        &self,
        school_id: SchoolId,
    ) -> UdiseResult<Vec<UdiseStudent>> {
        self.bindings.get_by_school.get_students_by_school(school_id)
    }

    pub fn update_udise_student(
        &self,
        id: StudentId,
        update: &StudentUpdate,
    ) -> UdiseResult<UdiseStudent> {
        self.bindings.update.update_student(id, update)
    }

    pub fn validate_udise_student_for_submission(
        &self,
        id: StudentId,
    ) -> UdiseResult<SubmissionReport> {
        self.bindings.validate_for_submission.validate_for_submission(id)
    }

    pub fn generate_udise_census_export(&self, school_id: SchoolId) -> UdiseResult<CensusExport> {
        self.bindings.census_export.generate_census_export(school_id)
    }

    /// Returns which collaborator serves each operation, in declaration order.
    pub fn binding_table(&self) -> Vec<OperationBinding> {
        UdiseOperation::ALL
            .into_iter()
            .map(|operation| OperationBinding {
                operation,
                collaborator: self.collaborator_for(operation),
            })
            .collect()
    }

    pub fn collaborator_for(&self, operation: UdiseOperation) -> &'static str {
        let b = &self.bindings;
        match operation {
            UdiseOperation::RegisterStudentWithUdise => b.register.collaborator_name(),
            UdiseOperation::BulkRegisterStudentsWithUdise => b.bulk_register.collaborator_name(),
            UdiseOperation::GetUdiseStudentById => b.get_by_id.collaborator_name(),
            UdiseOperation::GetUdiseStudentsBySchool => b.get_by_school.collaborator_name(),
            UdiseOperation::UpdateUdiseStudent => b.update.collaborator_name(),
            UdiseOperation::ValidateUdiseStudentForSubmission => {
                b.validate_for_submission.collaborator_name()
            }
            UdiseOperation::GenerateUdiseCensusExport => b.census_export.collaborator_name(),
        }
    }
}
