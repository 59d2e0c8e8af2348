//! School use-case service and demo seed data.
//!
//! # Invariants
//! - Service APIs never bypass repository constraint/cascade contracts.
//! - Seeding is idempotent: it does nothing once any school exists.

use crate::model::address::Address;
use crate::model::location::Location;
use crate::model::school::{School, SchoolId};
use crate::model::student::Student;
use crate::repo::school_repo::SchoolRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;

/// Use-case service wrapper over a school repository.
pub struct SchoolService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> SchoolService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Links every member to `school` and persists the whole graph.
    ///
    /// # Contract
    /// - Member `school_id`s point at the saved school afterwards.
    /// - Returns the school's stable id.
    pub fn found_school(&self, school: &mut School) -> RepoResult<SchoolId> {
        let id = self.repo.save(school)?;
        debug_assert!(school
            .students()
            .iter()
            .all(|student| student.school_id == Some(id)));
        Ok(id)
    }

    /// Seeds the demo school unless any school already exists.
    ///
    /// Returns the seeded school id, or `None` when seeding was skipped.
    pub fn seed_demo_data(&self) -> RepoResult<Option<SchoolId>> {
        if !self.repo.find_all()?.is_empty() {
            info!("event=seed_run module=service status=skipped reason=schools_exist");
            return Ok(None);
        }

        let mut school = demo_school();
        let id = self.found_school(&mut school)?;
        info!(
            "event=seed_run module=service status=ok school_id={id} student_count={}",
            school.students().len()
        );
        Ok(Some(id))
    }

    pub fn list_schools(&self) -> RepoResult<Vec<School>> {
        self.repo.find_all()
    }

    /// Deletes every school together with its students.
    pub fn close_all(&self) -> RepoResult<usize> {
        self.repo.delete_all()
    }
}

/// Builds the demo school graph persisted by [`SchoolService::seed_demo_data`].
pub fn demo_school() -> School {
    let john = Student::builder()
        .name("John")
        .email("john@codecool.com")
        .birth_date(NaiveDate::from_ymd_opt(1990, 9, 19))
        .address(
            Address::builder()
                .street("Nagymező street 44")
                .city("Budapest")
                .country("Hungary")
                .build(),
        )
        .phone_numbers(["555-6666", "555-2322"])
        .build();

    let barbara = Student::builder()
        .name("Barbara")
        .email("barb@codecool.com")
        .birth_date(NaiveDate::from_ymd_opt(1995, 9, 19))
        .address(
            Address::builder()
                .street("Alkotmány street 20")
                .city("Budapest")
                .country("Hungary")
                .build(),
        )
        .phone_numbers(["121-2322", "232-4521"])
        .build();

    School::builder()
        .name("Codecool Budapest")
        .location(Location::Budapest)
        .student(john)
        .student(barbara)
        .build()
}
