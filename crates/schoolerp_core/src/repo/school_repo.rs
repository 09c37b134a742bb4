//! School repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `udise_code` is unique per tenant database.
//! - Census export history is append-only.
//! - An export's history row and the `exported` status of its students are
//!   committed together or not at all.

use crate::model::school::{NewSchool, School, SchoolId};
use crate::model::student::{RegistrationStatus, StudentId};
use crate::repo::student_repo::{ensure_school_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

/// Repository interface for schools and their census export history.
pub trait SchoolRepository {
    fn create_school(&self, school: &NewSchool) -> RepoResult<SchoolId>;
    fn get_school(&self, id: SchoolId) -> RepoResult<Option<School>>;
    fn find_by_udise_code(&self, udise_code: &str) -> RepoResult<Option<School>>;
    fn list_schools(&self) -> RepoResult<Vec<School>>;
    /// Marks `exported_ids` as exported and appends one census export entry
    /// for `school_id`, in a single transaction.
    fn record_census_export(
        &self,
        school_id: SchoolId,
        export_id: Uuid,
        exported_ids: &[StudentId],
        generated_at: i64,
    ) -> RepoResult<()>;
    fn count_census_exports(&self, school_id: SchoolId) -> RepoResult<u32>;
}

/// SQLite-backed school repository.
pub struct SqliteSchoolRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchoolRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn create_school(&self, school: &NewSchool) -> RepoResult<SchoolId> {
        school.validate()?;
        self.conn.execute(
            "INSERT INTO schools (udise_code, name) VALUES (?1, ?2);",
            params![school.udise_code.as_str(), school.name.trim()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_school(&self, id: SchoolId) -> RepoResult<Option<School>> {
        let school = self
            .conn
            .query_row(
                "SELECT id, udise_code, name FROM schools WHERE id = ?1;",
                [id],
                parse_school_row,
            )
            .optional()?;
        Ok(school)
    }

    fn find_by_udise_code(&self, udise_code: &str) -> RepoResult<Option<School>> {
        let school = self
            .conn
            .query_row(
                "SELECT id, udise_code, name FROM schools WHERE udise_code = ?1;",
                [udise_code],
                parse_school_row,
            )
            .optional()?;
        Ok(school)
    }

    fn list_schools(&self) -> RepoResult<Vec<School>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, udise_code, name FROM schools ORDER BY id ASC;")?;
        let schools = stmt
            .query_map([], parse_school_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(schools)
    }

    fn record_census_export(
        &self,
        school_id: SchoolId,
        export_id: Uuid,
        exported_ids: &[StudentId],
        generated_at: i64,
    ) -> RepoResult<()> {
        let record_count = i64::try_from(exported_ids.len()).map_err(|_| {
            RepoError::InvalidData(format!(
                "census record count {} overflows i64",
                exported_ids.len()
            ))
        })?;

        let tx = self.conn.unchecked_transaction()?;
        ensure_school_exists(&tx, school_id)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE udise_students
                 SET status = ?1, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?2 AND school_id = ?3;",
            )?;
            for id in exported_ids {
                if stmt.execute(params![RegistrationStatus::Exported.as_str(), id, school_id])?
                    == 0
                {
                    return Err(RepoError::NotFound(*id));
                }
            }
        }
        tx.execute(
            "INSERT INTO census_exports (export_id, school_id, record_count, generated_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![export_id.to_string(), school_id, record_count, generated_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn count_census_exports(&self, school_id: SchoolId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM census_exports WHERE school_id = ?1;",
            [school_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }
}

fn parse_school_row(row: &Row<'_>) -> rusqlite::Result<School> {
    Ok(School {
        id: row.get(0)?,
        udise_code: row.get(1)?,
        name: row.get(2)?,
    })
}
