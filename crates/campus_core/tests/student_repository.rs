use campus_core::db::{open_db, open_db_in_memory};
use campus_core::{
    Address, AddressRepository, ConstraintViolation, RepoError, Session, SqliteAddressRepository,
    SqliteStudentRepository, Student, StudentRepository,
};
use chrono::NaiveDate;
use std::sync::Barrier;
use std::thread;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn session() -> Session {
    Session::new(open_db_in_memory().unwrap())
}

#[test]
fn save_one_simple_student() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut john = Student::builder()
        .email("john@codecool.com")
        .name("John")
        .build();
    let id = repo.save(&mut john).unwrap();

    assert_eq!(john.id, Some(id));
    assert_eq!(repo.find_all().unwrap().len(), 1);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn duplicate_email_fails_and_keeps_first_row() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut john = Student::builder()
        .email("john@codecool.com")
        .name("John")
        .build();
    repo.save(&mut john).unwrap();

    let mut peter = Student::builder()
        .email("john@codecool.com")
        .name("Peter")
        .build();
    let err = repo.save(&mut peter).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintViolation::Unique { ref target }) if target == "students.email"
    ));
    assert_eq!(peter.id, None);

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name.as_deref(), Some("John"));
}

#[test]
fn missing_email_fails_without_creating_rows() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut student = Student::builder()
        .name("John")
        .address(Address::builder().country("Hungary").build())
        .build();
    let err = repo.save(&mut student).unwrap_err();

    assert!(err.is_constraint_violation());
    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintViolation::NotNull { .. })
    ));
    assert_eq!(repo.count().unwrap(), 0);
    assert!(SqliteAddressRepository::new(&session)
        .find_all()
        .unwrap()
        .is_empty());
}

#[test]
fn save_all_is_atomic_when_one_student_violates_constraints() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut students = vec![
        Student::builder().email("a@codecool.com").build(),
        Student::builder().email("a@codecool.com").build(),
    ];
    let err = repo.save_all(&mut students).unwrap_err();

    assert!(err.is_constraint_violation());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn transient_age_is_not_persisted() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut student = Student::builder()
        .birth_date(date(1987, 2, 12))
        .email("john@codecool.com")
        .name("John")
        .build();
    assert!(student.calculate_age() > 31);

    repo.save(&mut student).unwrap();
    session.clear();

    let students = repo.find_all().unwrap();
    assert!(students.iter().all(|loaded| loaded.age == 0));
    assert_eq!(students[0].birth_date, Some(date(1987, 2, 12)));
}

#[test]
fn birth_date_is_stored_as_iso_text() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut student = Student::builder()
        .birth_date(date(2010, 10, 3))
        .email("iso@codecool.com")
        .build();
    let id = repo.save(&mut student).unwrap();

    let (stored, kind): (String, String) = session
        .conn()
        .query_row(
            "SELECT birth_date, typeof(birth_date) FROM students WHERE id = ?1;",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored, "2010-10-03");
    assert_eq!(kind, "text");

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.birth_date, Some(date(2010, 10, 3)));
}

#[test]
fn address_is_persisted_with_student() {
    let session = session();
    let students = SqliteStudentRepository::new(&session);
    let addresses = SqliteAddressRepository::new(&session);

    let mut student = Student::builder()
        .email("temp@codecool.com")
        .address(
            Address::builder()
                .country("Hungary")
                .city("Budapest")
                .street("Nagymező street 44")
                .zip_code(1065)
                .build(),
        )
        .build();
    students.save(&mut student).unwrap();

    let all = addresses.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].id.unwrap() > 0);
    assert_eq!(all[0].zip_code, Some(1065));
    assert_eq!(student.address.as_ref().unwrap().id, all[0].id);
}

#[test]
fn phone_numbers_keep_insertion_order_and_are_replaced_on_update() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut john = Student::builder()
        .email("john@codecool.com")
        .phone_number("555-6666")
        .phone_number("555-7777")
        .phone_number("555-8888")
        .build();
    let id = repo.save(&mut john).unwrap();
    session.clear();

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.phone_numbers, vec!["555-6666", "555-7777", "555-8888"]);

    john.phone_numbers = vec!["121-2322".to_string()];
    repo.save(&mut john).unwrap();
    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.phone_numbers, vec!["121-2322"]);
}

#[test]
fn find_by_missing_id_returns_none_and_delete_reports_not_found() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    assert!(repo.find_by_id(42).unwrap().is_none());
    let err = repo.delete(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "student", id: 42 }));
}

#[test]
fn deleting_student_removes_its_address() {
    let session = session();
    let students = SqliteStudentRepository::new(&session);
    let addresses = SqliteAddressRepository::new(&session);

    let mut student = Student::builder()
        .email("temp@codecool.com")
        .address(Address::builder().country("Hungary").build())
        .build();
    let id = students.save(&mut student).unwrap();
    let address_id = student.address.as_ref().unwrap().id.unwrap();

    students.delete(id).unwrap();

    assert_eq!(students.count().unwrap(), 0);
    assert!(addresses.find_by_id(address_id).unwrap().is_none());
}

#[test]
fn find_by_name_starting_with_or_birth_date_between() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut students = vec![
        Student::builder().email("john@codecool.com").name("John").build(),
        Student::builder().email("jane@codecool.com").name("Jane").build(),
        Student::builder().email("martha@codecool.com").name("Martha").build(),
        Student::builder()
            .email("peter@codecool.com")
            .birth_date(date(2010, 10, 3))
            .build(),
        Student::builder()
            .email("steve@codecool.com")
            .birth_date(date(2011, 12, 5))
            .build(),
    ];
    repo.save_all(&mut students).unwrap();

    let found = repo
        .find_by_name_starting_with_or_birth_date_between("J", date(2009, 1, 1), date(2011, 1, 1))
        .unwrap();

    let mut emails: Vec<_> = found
        .iter()
        .map(|student| student.email.clone().unwrap())
        .collect();
    emails.sort();
    assert_eq!(
        emails,
        vec!["jane@codecool.com", "john@codecool.com", "peter@codecool.com"]
    );
}

#[test]
fn name_prefix_is_case_sensitive_and_range_bounds_are_inclusive() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut students = vec![
        Student::builder().email("lower@codecool.com").name("jack").build(),
        Student::builder()
            .email("both@codecool.com")
            .name("Judy")
            .birth_date(date(2009, 1, 1))
            .build(),
        Student::builder()
            .email("edge@codecool.com")
            .birth_date(date(2011, 1, 1))
            .build(),
    ];
    repo.save_all(&mut students).unwrap();

    let found = repo
        .find_by_name_starting_with_or_birth_date_between("J", date(2009, 1, 1), date(2011, 1, 1))
        .unwrap();

    let emails: Vec<_> = found
        .iter()
        .map(|student| student.email.as_deref().unwrap())
        .collect();
    assert_eq!(emails, vec!["both@codecool.com", "edge@codecool.com"]);
}

#[test]
fn find_all_country_returns_distinct_values() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut students: Vec<Student> = [
        ("first@codecool.com", "Hungary"),
        ("second@codecool.com", "Poland"),
        ("third@codecool.com", "Poland"),
        ("fourth@codecool.com", "Hungary"),
    ]
    .into_iter()
    .map(|(email, country)| {
        Student::builder()
            .email(email)
            .address(Address::builder().country(country).build())
            .build()
    })
    .collect();
    students.push(Student::builder().email("homeless@codecool.com").build());
    students.push(
        Student::builder()
            .email("unknown@codecool.com")
            .address(Address::builder().city("Nowhere").build())
            .build(),
    );
    repo.save_all(&mut students).unwrap();

    let mut standalone = Address::builder().country("Germany").build();
    SqliteAddressRepository::new(&session)
        .save(&mut standalone)
        .unwrap();

    let countries = repo.find_all_country().unwrap();
    assert_eq!(countries, vec!["Hungary", "Poland"]);
}

#[test]
fn address_cannot_be_owned_by_two_students() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut first = Student::builder()
        .email("first@codecool.com")
        .address(Address::builder().country("Hungary").build())
        .build();
    repo.save(&mut first).unwrap();

    let mut second = Student::builder()
        .email("second@codecool.com")
        .address(first.address.clone().unwrap())
        .build();
    let err = repo.save(&mut second).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintViolation::Unique { ref target }) if target == "students.address_id"
    ));
}

#[test]
fn saving_student_with_unknown_school_is_a_foreign_key_violation() {
    let session = session();
    let repo = SqliteStudentRepository::new(&session);

    let mut student = Student::builder()
        .email("lost@codecool.com")
        .school_id(999)
        .build();
    let err = repo.save(&mut student).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintViolation::ForeignKey { .. })
    ));
}

#[test]
fn racing_writers_on_one_email_let_exactly_one_win() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus.db");
    let writers = vec![
        Session::new(open_db(&path).unwrap()),
        Session::new(open_db(&path).unwrap()),
    ];
    let start = Barrier::new(writers.len());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = writers
            .into_iter()
            .enumerate()
            .map(|(index, session)| {
                let start = &start;
                scope.spawn(move || {
                    let repo = SqliteStudentRepository::new(&session);
                    let mut student = Student::builder()
                        .name(format!("writer {index}"))
                        .email("race@codecool.com")
                        .build();
                    start.wait();
                    repo.save(&mut student)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    let loser = results.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        loser,
        RepoError::Constraint(ConstraintViolation::Unique { ref target }) if target == "students.email"
    ));

    let check = Session::new(open_db(&path).unwrap());
    assert_eq!(SqliteStudentRepository::new(&check).count().unwrap(), 1);
}
