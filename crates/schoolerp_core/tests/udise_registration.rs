use rusqlite::Connection;
use schoolerp_core::db::open_db_in_memory;
use schoolerp_core::{
    NewSchool, NewStudent, RegistrationStatus, SchoolRepository, SqliteSchoolRepository,
    SqliteStudentRepository, StudentRepository, UdiseCollaborator, UdiseError, UdiseRegistration,
    UdiseRegistrationService,
};

fn seed_school(conn: &Connection) -> i64 {
    SqliteSchoolRepository::new(conn)
        .create_school(&NewSchool::new("27251000101", "ZP Primary School"))
        .unwrap()
}

fn with_aadhaar(school_id: i64, name: &str, aadhaar: &str) -> NewStudent {
    let mut student = NewStudent::new(school_id, name);
    student.aadhaar_number = Some(aadhaar.to_string());
    student
}

#[test]
fn registers_one_student() {
    let conn = open_db_in_memory().unwrap();
    let school_id = seed_school(&conn);
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    let receipt = service
        .register_student(&NewStudent::new(school_id, "Asha"))
        .unwrap();
    assert_eq!(receipt.status, RegistrationStatus::Registered);

    let stored = SqliteStudentRepository::new(&conn)
        .get_student(receipt.id)
        .unwrap()
        .unwrap();
    assert!(stored.pen.is_some());
    assert_eq!(service.collaborator_name(), "udise_registration_service");
}

#[test]
fn duplicate_aadhaar_is_reported_explicitly() {
    let conn = open_db_in_memory().unwrap();
    let school_id = seed_school(&conn);
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    service
        .register_student(&with_aadhaar(school_id, "Asha", "123456789012"))
        .unwrap();
    let err = service
        .register_student(&with_aadhaar(school_id, "Asha Copy", "123456789012"))
        .unwrap_err();
    assert!(matches!(err, UdiseError::DuplicateAadhaar));
}

#[test]
fn unknown_school_and_invalid_input_fail_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    let err = service
        .register_student(&NewStudent::new(3, "Asha"))
        .unwrap_err();
    assert!(matches!(err, UdiseError::SchoolNotFound(3)));

    let err = service
        .register_student(&with_aadhaar(3, "Asha", "12"))
        .unwrap_err();
    assert!(matches!(err, UdiseError::Validation(_)));
}

#[test]
fn bulk_register_keeps_good_rows_and_reports_bad_ones() {
    let conn = open_db_in_memory().unwrap();
    let school_id = seed_school(&conn);
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    let report = service
        .bulk_register_students(&[
            NewStudent::new(school_id, "One"),
            NewStudent::new(school_id, ""),
            with_aadhaar(school_id, "Two", "555566667777"),
            with_aadhaar(school_id, "Two Again", "555566667777"),
            NewStudent::new(school_id + 100, "Lost"),
        ])
        .unwrap();

    assert_eq!(report.registered.len(), 2);
    let failed: Vec<(usize, &str)> = report
        .failed
        .iter()
        .map(|failure| (failure.index, failure.code.as_str()))
        .collect();
    assert_eq!(
        failed,
        vec![
            (1, "validation_failed"),
            (3, "duplicate_aadhaar"),
            (4, "school_not_found"),
        ]
    );

    let stored = SqliteStudentRepository::new(&conn)
        .list_students_by_school(school_id, None)
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn bulk_register_rejects_empty_batch() {
    let conn = open_db_in_memory().unwrap();
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    let err = service.bulk_register_students(&[]).unwrap_err();
    assert!(matches!(err, UdiseError::EmptyBatch));
}

#[test]
fn rejected_row_does_not_claim_its_aadhaar_within_the_batch() {
    let conn = open_db_in_memory().unwrap();
    let school_id = seed_school(&conn);
    let service = UdiseRegistrationService::new(SqliteStudentRepository::new(&conn));

    let report = service
        .bulk_register_students(&[
            with_aadhaar(school_id, "   ", "444455556666"),
            with_aadhaar(school_id, "Ravi", "444455556666"),
            with_aadhaar(school_id, "Ravi Again", "444455556666"),
        ])
        .unwrap();

    assert_eq!(report.registered.len(), 1);
    let failed: Vec<(usize, &str)> = report
        .failed
        .iter()
        .map(|failure| (failure.index, failure.code.as_str()))
        .collect();
    assert_eq!(
        failed,
        vec![(0, "validation_failed"), (2, "duplicate_aadhaar")]
    );

    let stored = SqliteStudentRepository::new(&conn)
        .find_by_aadhaar("444455556666")
        .unwrap();
    assert_eq!(stored, Some(report.registered[0].id));
}
