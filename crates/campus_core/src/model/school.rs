//! School entity and its owned student set.
//!
//! # Invariants
//! - Membership is unique: a student equal to an existing member is not
//!   added twice.
//! - The set has no stored column; it mirrors `students.school_id`.
//! - Persisting or deleting a school cascades to every member.

use crate::model::location::Location;
use crate::model::student::Student;
use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned surrogate key of a school row.
pub type SchoolId = i64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: Option<SchoolId>,
    pub name: Option<String>,
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "unique_members")]
    students: Vec<Student>,
}

/// Decodes a member list with the same duplicate rule as [`School::add_student`].
fn unique_members<'de, D>(deserializer: D) -> Result<Vec<Student>, D::Error>
where
    D: Deserializer<'de>,
{
    let members = Vec::<Student>::deserialize(deserializer)?;
    let mut school = School::default();
    school.set_students(members);
    Ok(school.students)
}

impl School {
    pub fn builder() -> SchoolBuilder {
        SchoolBuilder::default()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn students_mut(&mut self) -> &mut [Student] {
        &mut self.students
    }

    /// Adds one member. Returns `false` when an equal student is already in
    /// the set.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self.students.contains(&student) {
            return false;
        }
        self.students.push(student);
        true
    }

    /// Replaces the whole member set, dropping duplicates.
    pub fn set_students(&mut self, students: impl IntoIterator<Item = Student>) {
        self.students.clear();
        for student in students {
            self.add_student(student);
        }
    }
}

/// Fluent constructor for [`School`].
#[derive(Debug, Default)]
pub struct SchoolBuilder {
    inner: School,
}

impl SchoolBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.inner.location = Some(location);
        self
    }

    /// Adds one student to the set.
    pub fn student(mut self, student: Student) -> Self {
        self.inner.add_student(student);
        self
    }

    /// Replaces the student set.
    pub fn students(mut self, students: impl IntoIterator<Item = Student>) -> Self {
        self.inner.set_students(students);
        self
    }

    pub fn build(self) -> School {
        self.inner
    }
}
