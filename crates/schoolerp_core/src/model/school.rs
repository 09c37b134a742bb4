//! School (UDISE+ unit) model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static UDISE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{11}$").expect("valid udise code regex"));

/// Database-assigned school identifier.
pub type SchoolId = i64;

/// Registered school identified by its 11-digit UDISE code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub udise_code: String,
    pub name: String,
}

/// Input for registering a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchool {
    pub udise_code: String,
    pub name: String,
}

impl NewSchool {
    pub fn new(udise_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            udise_code: udise_code.into(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SchoolValidationError> {
        if self.name.trim().is_empty() {
            return Err(SchoolValidationError::EmptyName);
        }
        if !is_valid_udise_code(&self.udise_code) {
            return Err(SchoolValidationError::InvalidUdiseCode(
                self.udise_code.clone(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolValidationError {
    EmptyName,
    InvalidUdiseCode(String),
}

impl Display for SchoolValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "school name must not be empty"),
            Self::InvalidUdiseCode(value) => {
                write!(f, "udise code `{value}` must be exactly 11 digits")
            }
        }
    }
}

impl Error for SchoolValidationError {}

/// Returns whether `value` is a well-formed 11-digit UDISE code.
pub fn is_valid_udise_code(value: &str) -> bool {
    UDISE_CODE_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_udise_code, NewSchool, SchoolValidationError};

    #[test]
    fn accepts_eleven_digit_codes_only() {
        assert!(is_valid_udise_code("27251000101"));
        assert!(!is_valid_udise_code("2725100010"));
        assert!(!is_valid_udise_code("27251000101 "));
        assert!(!is_valid_udise_code("2725100010a"));
        assert!(!is_valid_udise_code("२७२५१०००१०१"));
    }

    #[test]
    fn validate_rejects_blank_name_before_code() {
        let school = NewSchool::new("bad", "  ");
        assert_eq!(school.validate(), Err(SchoolValidationError::EmptyName));

        let school = NewSchool::new("bad", "Zilla Parishad School");
        assert_eq!(
            school.validate(),
            Err(SchoolValidationError::InvalidUdiseCode("bad".to_string()))
        );
    }
}
