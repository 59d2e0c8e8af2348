use campus_core::{Address, Location, School, Student};
use chrono::NaiveDate;

#[test]
fn school_graph_serializes_with_snake_case_location() {
    let school = School::builder()
        .name("Codecool Budapest")
        .location(Location::Budapest)
        .student(
            Student::builder()
                .email("john@codecool.com")
                .birth_date(NaiveDate::from_ymd_opt(1990, 9, 19).unwrap())
                .address(Address::builder().city("Budapest").zip_code(1065).build())
                .phone_number("555-6666")
                .build(),
        )
        .build();

    let json = serde_json::to_value(&school).unwrap();
    assert_eq!(json["location"], "budapest");
    assert_eq!(json["students"][0]["birth_date"], "1990-09-19");
    assert_eq!(json["students"][0]["address"]["zip_code"], 1065);
    assert_eq!(json["students"][0]["phone_numbers"][0], "555-6666");
    assert!(json["students"][0].get("age").is_none());

    let decoded: School = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, school);
}

#[test]
fn student_without_age_field_deserializes_with_zero_age() {
    let student: Student = serde_json::from_str(
        r#"{
            "id": null,
            "name": "Jane",
            "email": "jane@codecool.com",
            "birth_date": null,
            "phone_numbers": [],
            "address": null,
            "school_id": null
        }"#,
    )
    .unwrap();

    assert_eq!(student.age, 0);
    assert_eq!(student.email.as_deref(), Some("jane@codecool.com"));
}

#[test]
fn computed_age_is_not_written_out() {
    let mut student = Student::builder()
        .email("john@codecool.com")
        .birth_date(NaiveDate::from_ymd_opt(1990, 9, 19))
        .build();
    student.calculate_age_on(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(student.age, 29);

    let json = serde_json::to_value(&student).unwrap();
    assert!(json.get("age").is_none());

    let decoded: Student = serde_json::from_value(json).unwrap();
    assert_eq!(decoded.age, 0);
}

#[test]
fn duplicate_members_collapse_when_decoding_a_school() {
    let member = r#"{
        "id": null,
        "name": "John",
        "email": "john@codecool.com",
        "birth_date": null,
        "phone_numbers": [],
        "address": null,
        "school_id": null
    }"#;
    let json = format!(
        r#"{{"id": null, "name": "Codecool Budapest", "location": "budapest", "students": [{member}, {member}]}}"#
    );

    let school: School = serde_json::from_str(&json).unwrap();

    assert_eq!(school.students().len(), 1);
    assert_eq!(
        school.students()[0].email.as_deref(),
        Some("john@codecool.com")
    );
}

#[test]
fn school_without_students_field_decodes_empty() {
    let school: School =
        serde_json::from_str(r#"{"id": 3, "name": "Codecool Warsaw", "location": "warsaw"}"#)
            .unwrap();

    assert_eq!(school.id, Some(3));
    assert!(school.students().is_empty());
}
