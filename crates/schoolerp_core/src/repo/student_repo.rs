//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `udise_students` storage.
//! - Assign the Permanent Education Number (PEN) on insert.
//!
//! # Invariants
//! - Write paths validate the record before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - PEN is `<school udise code>-<zero-padded student id>` and is written in
//!   the same statement sequence as the insert.

use crate::db::DbError;
use crate::model::school::{SchoolId, SchoolValidationError};
use crate::model::student::{
    Gender, NewStudent, RegistrationStatus, SocialCategory, StudentId, StudentValidationError,
    UdiseStudent,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    school_id,
    pen,
    name,
    gender,
    date_of_birth,
    grade,
    section,
    mother_name,
    father_name,
    aadhaar_number,
    social_category,
    status,
    created_at,
    updated_at
FROM udise_students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by school and student persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    SchoolValidation(SchoolValidationError),
    Db(DbError),
    NotFound(StudentId),
    SchoolNotFound(SchoolId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::SchoolValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::SchoolNotFound(id) => write!(f, "school not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::SchoolValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::SchoolNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SchoolValidationError> for RepoError {
    fn from(value: SchoolValidationError) -> Self {
        Self::SchoolValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts one student and assigns its PEN.
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId>;
    /// Inserts every student or none of them.
    fn create_students_atomic(&self, students: &[NewStudent]) -> RepoResult<Vec<StudentId>>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<UdiseStudent>>;
    /// Lists students of one school ordered by id, optionally by status.
    fn list_students_by_school(
        &self,
        school_id: SchoolId,
        status: Option<RegistrationStatus>,
    ) -> RepoResult<Vec<UdiseStudent>>;
    /// Replaces every mutable column of an existing student.
    fn update_student(&self, student: &UdiseStudent) -> RepoResult<()>;
    /// Sets the status of the given students; returns the number changed.
    fn set_status(&self, ids: &[StudentId], status: RegistrationStatus) -> RepoResult<usize>;
    fn find_by_aadhaar(&self, aadhaar_number: &str) -> RepoResult<Option<StudentId>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_one(&self, student: &NewStudent) -> RepoResult<StudentId> {
        student.validate()?;
        ensure_school_exists(self.conn, student.school_id)?;

        self.conn.execute(
            "INSERT INTO udise_students (
                school_id,
                name,
                gender,
                date_of_birth,
                grade,
                section,
                mother_name,
                father_name,
                aadhaar_number,
                social_category
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                student.school_id,
                student.name.trim(),
                student.gender.map(Gender::as_str),
                student.date_of_birth.as_deref(),
                student.grade,
                student.section.as_deref(),
                student.mother_name.as_deref(),
                student.father_name.as_deref(),
                student.aadhaar_number.as_deref(),
                student.social_category.map(SocialCategory::as_str),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.conn.execute(
            "UPDATE udise_students
             SET pen = (SELECT udise_code FROM schools WHERE schools.id = udise_students.school_id)
                 || '-' || printf('%06d', id)
             WHERE id = ?1;",
            [id],
        )?;

        Ok(id)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        self.insert_one(student)
    }

    fn create_students_atomic(&self, students: &[NewStudent]) -> RepoResult<Vec<StudentId>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(students.len());
        for student in students {
            ids.push(self.insert_one(student)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<UdiseStudent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn list_students_by_school(
        &self,
        school_id: SchoolId,
        status: Option<RegistrationStatus>,
    ) -> RepoResult<Vec<UdiseStudent>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE school_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(school_id)];

        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn update_student(&self, student: &UdiseStudent) -> RepoResult<()> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE udise_students
             SET
                name = ?1,
                gender = ?2,
                date_of_birth = ?3,
                grade = ?4,
                section = ?5,
                mother_name = ?6,
                father_name = ?7,
                aadhaar_number = ?8,
                social_category = ?9,
                status = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?11;",
            params![
                student.name.trim(),
                student.gender.map(Gender::as_str),
                student.date_of_birth.as_deref(),
                student.grade,
                student.section.as_deref(),
                student.mother_name.as_deref(),
                student.father_name.as_deref(),
                student.aadhaar_number.as_deref(),
                student.social_category.map(SocialCategory::as_str),
                student.status.as_str(),
                student.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.id));
        }
        Ok(())
    }

    fn set_status(&self, ids: &[StudentId], status: RegistrationStatus) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE udise_students
                 SET status = ?1, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?2;",
            )?;
            for id in ids {
                changed += stmt.execute(params![status.as_str(), id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    fn find_by_aadhaar(&self, aadhaar_number: &str) -> RepoResult<Option<StudentId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM udise_students WHERE aadhaar_number = ?1;",
                [aadhaar_number],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }
}

pub(crate) fn ensure_school_exists(conn: &Connection, school_id: SchoolId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM schools WHERE id = ?1);",
        [school_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::SchoolNotFound(school_id));
    }
    Ok(())
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<UdiseStudent> {
    let gender = parse_optional(row, "gender", Gender::parse)?;
    let social_category = parse_optional(row, "social_category", SocialCategory::parse)?;

    let status_text: String = row.get("status")?;
    let status = RegistrationStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in udise_students.status"
        ))
    })?;

    let grade = match row.get::<_, Option<i64>>("grade")? {
        Some(value) => Some(u8::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid grade `{value}` in udise_students.grade"))
        })?),
        None => None,
    };

    let student = UdiseStudent {
        id: row.get("id")?,
        school_id: row.get("school_id")?,
        pen: row.get("pen")?,
        name: row.get("name")?,
        gender,
        date_of_birth: row.get("date_of_birth")?,
        grade,
        section: row.get("section")?,
        mother_name: row.get("mother_name")?,
        father_name: row.get("father_name")?,
        aadhaar_number: row.get("aadhaar_number")?,
        social_category,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    student
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("student {}: {err}", student.id)))?;
    Ok(student)
}

fn parse_optional<T>(
    row: &Row<'_>,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> RepoResult<Option<T>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => parse(&value).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid value `{value}` in udise_students.{column}"))
        }),
        None => Ok(None),
    }
}
