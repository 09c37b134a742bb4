//! UDISE+ student domain model.
//!
//! # Responsibility
//! - Define the registration input, persisted record and patch shapes.
//! - Provide field-level validation shared by every collaborator.
//!
//! # Invariants
//! - `name` is non-empty after trimming.
//! - `aadhaar_number`, when set, is exactly 12 ASCII digits.
//! - `date_of_birth`, when set, uses `YYYY-MM-DD`.
//! - `grade`, when set, is within `1..=12`.

use crate::model::school::SchoolId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_OF_BIRTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$").expect("valid dob regex")
});
static AADHAAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{12}$").expect("valid aadhaar regex"));

/// Database-assigned student identifier.
pub type StudentId = i64;

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Transgender,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Transgender => "transgender",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "transgender" => Some(Self::Transgender),
            _ => None,
        }
    }
}

/// Census social category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialCategory {
    General,
    Sc,
    St,
    Obc,
}

impl SocialCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sc => "sc",
            Self::St => "st",
            Self::Obc => "obc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "sc" => Some(Self::Sc),
            "st" => Some(Self::St),
            "obc" => Some(Self::Obc),
            _ => None,
        }
    }
}

/// Registration lifecycle of one student record.
///
/// `Registered -> Validated -> Exported`. Any edit drops the record back to
/// `Registered` so it has to pass submission checks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Validated,
    Exported,
}

impl RegistrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Validated => "validated",
            Self::Exported => "exported",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "validated" => Some(Self::Validated),
            "exported" => Some(Self::Exported),
            _ => None,
        }
    }
}

/// Validation errors for student fields.
///
/// Aadhaar values are never echoed back in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    InvalidSchoolId(SchoolId),
    InvalidDateOfBirth(String),
    InvalidGrade(u8),
    InvalidAadhaar,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "student name must not be empty"),
            Self::InvalidSchoolId(id) => write!(f, "school id must be positive, got {id}"),
            Self::InvalidDateOfBirth(value) => {
                write!(f, "date of birth `{value}` must use YYYY-MM-DD")
            }
            Self::InvalidGrade(grade) => {
                write!(f, "grade {grade} is outside {MIN_GRADE}..={MAX_GRADE}")
            }
            Self::InvalidAadhaar => write!(f, "aadhaar number must be exactly 12 digits"),
        }
    }
}

impl Error for StudentValidationError {}

/// Registration input for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub school_id: SchoolId,
    pub name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub aadhaar_number: Option<String>,
    #[serde(default)]
    pub social_category: Option<SocialCategory>,
}

impl NewStudent {
    /// Creates a minimal registration input; optional census fields start empty.
    pub fn new(school_id: SchoolId, name: impl Into<String>) -> Self {
        Self {
            school_id,
            name: name.into(),
            gender: None,
            date_of_birth: None,
            grade: None,
            section: None,
            mother_name: None,
            father_name: None,
            aadhaar_number: None,
            social_category: None,
        }
    }

    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.school_id <= 0 {
            return Err(StudentValidationError::InvalidSchoolId(self.school_id));
        }
        validate_fields(
            &self.name,
            self.date_of_birth.as_deref(),
            self.grade,
            self.aadhaar_number.as_deref(),
        )
    }
}

/// Persisted UDISE+ student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdiseStudent {
    pub id: StudentId,
    pub school_id: SchoolId,
    /// Permanent Education Number, assigned at registration.
    pub pen: Option<String>,
    pub name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub grade: Option<u8>,
    pub section: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub aadhaar_number: Option<String>,
    pub social_category: Option<SocialCategory>,
    pub status: RegistrationStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl UdiseStudent {
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        validate_fields(
            &self.name,
            self.date_of_birth.as_deref(),
            self.grade,
            self.aadhaar_number.as_deref(),
        )
    }

    /// Applies a patch in place. Returns `true` when any field changed.
    ///
    /// A changed record is returned to `Registered`.
    pub fn apply_update(&mut self, update: &StudentUpdate) -> bool {
        let before = self.clone();

        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if let Some(date_of_birth) = &update.date_of_birth {
            self.date_of_birth = Some(date_of_birth.clone());
        }
        if update.grade.is_some() {
            self.grade = update.grade;
        }
        if let Some(section) = &update.section {
            self.section = Some(section.clone());
        }
        if let Some(mother_name) = &update.mother_name {
            self.mother_name = Some(mother_name.clone());
        }
        if let Some(father_name) = &update.father_name {
            self.father_name = Some(father_name.clone());
        }
        if let Some(aadhaar_number) = &update.aadhaar_number {
            self.aadhaar_number = Some(aadhaar_number.clone());
        }
        if update.social_category.is_some() {
            self.social_category = update.social_category;
        }

        let changed = *self != before;
        if changed {
            self.status = RegistrationStatus::Registered;
        }
        changed
    }
}

/// Partial update for one student; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub grade: Option<u8>,
    pub section: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub aadhaar_number: Option<String>,
    pub social_category: Option<SocialCategory>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn validate_fields(
    name: &str,
    date_of_birth: Option<&str>,
    grade: Option<u8>,
    aadhaar_number: Option<&str>,
) -> Result<(), StudentValidationError> {
    if name.trim().is_empty() {
        return Err(StudentValidationError::EmptyName);
    }
    if let Some(value) = date_of_birth {
        if !DATE_OF_BIRTH_RE.is_match(value) {
            return Err(StudentValidationError::InvalidDateOfBirth(value.to_string()));
        }
    }
    if let Some(value) = grade {
        if !(MIN_GRADE..=MAX_GRADE).contains(&value) {
            return Err(StudentValidationError::InvalidGrade(value));
        }
    }
    if let Some(value) = aadhaar_number {
        if !AADHAAR_RE.is_match(value) {
            return Err(StudentValidationError::InvalidAadhaar);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        Gender, NewStudent, RegistrationStatus, StudentUpdate, StudentValidationError,
        UdiseStudent,
    };

    fn stored(status: RegistrationStatus) -> UdiseStudent {
        UdiseStudent {
            id: 1,
            school_id: 7,
            pen: Some("27251000101-000001".to_string()),
            name: "Asha".to_string(),
            gender: Some(Gender::Female),
            date_of_birth: Some("2015-04-09".to_string()),
            grade: Some(3),
            section: None,
            mother_name: None,
            father_name: None,
            aadhaar_number: None,
            social_category: None,
            status,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn validate_accepts_minimal_input() {
        NewStudent::new(7, "Asha").validate().expect("minimal input is valid");
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_school() {
        assert_eq!(
            NewStudent::new(7, "   ").validate(),
            Err(StudentValidationError::EmptyName)
        );
        assert_eq!(
            NewStudent::new(0, "Asha").validate(),
            Err(StudentValidationError::InvalidSchoolId(0))
        );
    }

    #[test]
    fn validate_rejects_malformed_optional_fields() {
        let mut student = NewStudent::new(7, "Asha");
        student.date_of_birth = Some("2015-13-01".to_string());
        assert!(matches!(
            student.validate(),
            Err(StudentValidationError::InvalidDateOfBirth(_))
        ));

        student.date_of_birth = None;
        student.grade = Some(13);
        assert_eq!(student.validate(), Err(StudentValidationError::InvalidGrade(13)));

        student.grade = Some(0);
        assert_eq!(student.validate(), Err(StudentValidationError::InvalidGrade(0)));

        student.grade = None;
        student.aadhaar_number = Some("1234-5678-9012".to_string());
        assert_eq!(student.validate(), Err(StudentValidationError::InvalidAadhaar));

        // Devanagari digits are decimal digits to Unicode, not to the census.
        student.aadhaar_number = Some("१२३४५६७८९०१२".to_string());
        assert_eq!(student.validate(), Err(StudentValidationError::InvalidAadhaar));

        student.aadhaar_number = None;
        student.date_of_birth = Some("२०१५-०१-०१".to_string());
        assert!(matches!(
            student.validate(),
            Err(StudentValidationError::InvalidDateOfBirth(_))
        ));
    }

    #[test]
    fn aadhaar_error_message_does_not_echo_value() {
        let mut student = NewStudent::new(7, "Asha");
        student.aadhaar_number = Some("98765432101".to_string());
        let message = student
            .validate()
            .expect_err("11 digits must be rejected")
            .to_string();
        assert!(!message.contains("98765432101"));
    }

    #[test]
    fn apply_update_resets_status_only_on_change() {
        let mut student = stored(RegistrationStatus::Validated);
        let unchanged = StudentUpdate {
            name: Some("Asha".to_string()),
            ..StudentUpdate::default()
        };
        assert!(!student.apply_update(&unchanged));
        assert_eq!(student.status, RegistrationStatus::Validated);

        let changed = StudentUpdate {
            grade: Some(4),
            ..StudentUpdate::default()
        };
        assert!(student.apply_update(&changed));
        assert_eq!(student.grade, Some(4));
        assert_eq!(student.status, RegistrationStatus::Registered);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(StudentUpdate::default().is_empty());
        let update = StudentUpdate {
            section: Some("B".to_string()),
            ..StudentUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn enum_strings_round_trip_through_parse() {
        for status in [
            RegistrationStatus::Registered,
            RegistrationStatus::Validated,
            RegistrationStatus::Exported,
        ] {
            assert_eq!(RegistrationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(Gender::parse("unknown"), None);
    }
}
