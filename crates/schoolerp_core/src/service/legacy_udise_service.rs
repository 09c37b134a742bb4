//! Legacy monolithic UDISE+ student service.
//!
//! # Responsibility
//! - Serve every UDISE+ student operation from one type.
//! - Remain the source of truth for operations not yet extracted.
//!
//! # Invariants
//! - Bulk registration is all-or-nothing: the first bad row aborts the batch.
//! - Duplicate Aadhaar numbers surface as storage errors (unique index).
//! - Only `validated` students appear in a census export, and exporting them
//!   moves them to `exported` together with the export history row.

use crate::model::school::SchoolId;
use crate::model::student::{
    NewStudent, RegistrationStatus, StudentId, StudentUpdate, UdiseStudent,
};
use crate::repo::school_repo::SchoolRepository;
use crate::repo::student_repo::StudentRepository;
use crate::service::udise_contracts::{
    BulkRegistrationReport, CensusExport, RegistrationReceipt, SubmissionIssue, SubmissionReport,
    UdiseCollaborator, UdiseError, UdiseRegistration, UdiseResult, UdiseStudentQueries,
    UdiseStudentUpdates, UdiseSubmission,
};
use log::{info, warn};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const LEGACY_COLLABORATOR_NAME: &str = "legacy_udise_service";

/// Header row of the census CSV, in column order.
pub const CENSUS_CSV_HEADER: &str = "pen,udise_code,student_name,gender,date_of_birth,grade,section,mother_name,father_name,social_category";

/// Original all-in-one UDISE+ student service.
pub struct LegacyUdiseService<S: StudentRepository, C: SchoolRepository> {
    students: S,
    schools: C,
}

impl<S: StudentRepository, C: SchoolRepository> LegacyUdiseService<S, C> {
    pub fn new(students: S, schools: C) -> Self {
        Self { students, schools }
    }

    fn load(&self, id: StudentId) -> UdiseResult<UdiseStudent> {
        self.students
            .get_student(id)?
            .ok_or(UdiseError::StudentNotFound(id))
    }
}

impl<S: StudentRepository, C: SchoolRepository> UdiseCollaborator for LegacyUdiseService<S, C> {
    fn collaborator_name(&self) -> &'static str {
        LEGACY_COLLABORATOR_NAME
    }
}

impl<S: StudentRepository, C: SchoolRepository> UdiseRegistration for LegacyUdiseService<S, C> {
    fn register_student(&self, student: &NewStudent) -> UdiseResult<RegistrationReceipt> {
        let id = self.students.create_student(student)?;
        info!(
            "event=udise_register module=legacy_udise status=ok student_id={} school_id={}",
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
        let ids = self.students.create_students_atomic(students)?;
        info!(
            "event=udise_bulk_register module=legacy_udise status=ok count={}",
            ids.len()
        );
        Ok(BulkRegistrationReport {
            registered: ids
                .into_iter()
                .map(|id| RegistrationReceipt {
                    id,
                    status: RegistrationStatus::Registered,
                })
                .collect(),
            failed: Vec::new(),
        })
    }
}

impl<S: StudentRepository, C: SchoolRepository> UdiseStudentQueries for LegacyUdiseService<S, C> {
    fn get_student_by_id(&self, id: StudentId) -> UdiseResult<UdiseStudent> {
        self.load(id)
    }

    fn get_students_by_school(&self, school_id: SchoolId) -> UdiseResult<Vec<UdiseStudent>> {
        if self.schools.get_school(school_id)?.is_none() {
            return Err(UdiseError::SchoolNotFound(school_id));
        }
        Ok(self.students.list_students_by_school(school_id, None)?)
    }
}

impl<S: StudentRepository, C: SchoolRepository> UdiseStudentUpdates for LegacyUdiseService<S, C> {
    fn update_student(&self, id: StudentId, update: &StudentUpdate) -> UdiseResult<UdiseStudent> {
        if update.is_empty() {
            return Err(UdiseError::EmptyUpdate(id));
        }

        let mut student = self.load(id)?;
        if !student.apply_update(update) {
            return Ok(student);
        }
        student.validate()?;
        self.students.update_student(&student)?;
        info!("event=udise_update module=legacy_udise status=ok student_id={id}");
        self.load(id)
    }
}

impl<S: StudentRepository, C: SchoolRepository> UdiseSubmission for LegacyUdiseService<S, C> {
    fn validate_for_submission(&self, id: StudentId) -> UdiseResult<SubmissionReport> {
        let student = self.load(id)?;
        let issues = submission_issues(&student);
        let ready = issues.is_empty();

        if ready && student.status == RegistrationStatus::Registered {
            self.students
                .set_status(&[id], RegistrationStatus::Validated)?;
        }
        if ready {
            info!("event=udise_validate module=legacy_udise status=ok student_id={id}");
        } else {
            warn!(
                "event=udise_validate module=legacy_udise status=incomplete student_id={id} issue_count={}",
                issues.len()
            );
        }

        Ok(SubmissionReport {
            student_id: id,
            ready,
            issues,
        })
    }

    fn generate_census_export(&self, school_id: SchoolId) -> UdiseResult<CensusExport> {
        let school = self
            .schools
            .get_school(school_id)?
            .ok_or(UdiseError::SchoolNotFound(school_id))?;
        let students = self
            .students
            .list_students_by_school(school_id, Some(RegistrationStatus::Validated))?;

        let csv = render_census_csv(&school.udise_code, &students);
        let export_id = Uuid::new_v4();
        let generated_at = now_epoch_ms();

        let ids: Vec<StudentId> = students.iter().map(|student| student.id).collect();
        self.schools
            .record_census_export(school_id, export_id, &ids, generated_at)?;
        info!(
            "event=udise_census_export module=legacy_udise status=ok school_id={} export_id={} record_count={}",
            school_id,
            export_id,
            students.len()
        );

        Ok(CensusExport {
            export_id,
            school_id,
            udise_code: school.udise_code,
            generated_at,
            record_count: students.len(),
            csv,
        })
    }
}

/// Lists mandatory census fields that are missing on `student`.
pub fn submission_issues(student: &UdiseStudent) -> Vec<SubmissionIssue> {
    let mut issues = Vec::new();
    let mut require = |present: bool, field: &str| {
        if !present {
            issues.push(SubmissionIssue {
                field: field.to_string(),
                message: format!("{field} is required for UDISE+ submission"),
            });
        }
    };

    require(student.pen.is_some(), "pen");
    require(student.gender.is_some(), "gender");
    require(student.date_of_birth.is_some(), "date_of_birth");
    require(student.grade.is_some(), "grade");
    require(has_text(student.mother_name.as_deref()), "mother_name");
    require(has_text(student.father_name.as_deref()), "father_name");
    require(student.social_category.is_some(), "social_category");
    issues
}

/// Renders census rows under [`CENSUS_CSV_HEADER`].
///
/// Every line, including the last, ends with `\n`.
pub fn render_census_csv(udise_code: &str, students: &[UdiseStudent]) -> String {
    let mut csv = String::from(CENSUS_CSV_HEADER);
    csv.push('\n');
    for student in students {
        let grade = student.grade.map(|grade| grade.to_string());
        let fields = [
            student.pen.as_deref().unwrap_or_default(),
            udise_code,
            student.name.as_str(),
            student.gender.map_or("", |gender| gender.as_str()),
            student.date_of_birth.as_deref().unwrap_or_default(),
            grade.as_deref().unwrap_or_default(),
            student.section.as_deref().unwrap_or_default(),
            student.mother_name.as_deref().unwrap_or_default(),
            student.father_name.as_deref().unwrap_or_default(),
            student
                .social_category
                .map_or("", |category| category.as_str()),
        ];
        let line = fields
            .iter()
            .map(|field| escape_csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

fn escape_csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{escape_csv_field, render_census_csv, submission_issues, CENSUS_CSV_HEADER};
    use crate::model::student::{Gender, RegistrationStatus, SocialCategory, UdiseStudent};

    fn complete_student() -> UdiseStudent {
        UdiseStudent {
            id: 5,
            school_id: 1,
            pen: Some("27251000101-000005".to_string()),
            name: "Rao, Kiran".to_string(),
            gender: Some(Gender::Male),
            date_of_birth: Some("2014-06-30".to_string()),
            grade: Some(4),
            section: Some("A".to_string()),
            mother_name: Some("Lata".to_string()),
            father_name: Some("Mohan".to_string()),
            aadhaar_number: None,
            social_category: Some(SocialCategory::Obc),
            status: RegistrationStatus::Validated,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn complete_student_has_no_issues() {
        assert!(submission_issues(&complete_student()).is_empty());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut student = complete_student();
        student.gender = None;
        student.father_name = Some("  ".to_string());
        let fields: Vec<String> = submission_issues(&student)
            .into_iter()
            .map(|issue| issue.field)
            .collect();
        assert_eq!(fields, vec!["gender".to_string(), "father_name".to_string()]);
    }

    #[test]
    fn csv_quotes_fields_with_separators() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_renders_header_and_one_line_per_student() {
        let csv = render_census_csv("27251000101", &[complete_student()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CENSUS_CSV_HEADER);
        assert_eq!(
            lines[1],
            "27251000101-000005,27251000101,\"Rao, Kiran\",male,2014-06-30,4,A,Lata,Mohan,obc"
        );
        assert_eq!(lines.len(), 2);
    }
}
