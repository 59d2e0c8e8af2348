//! Student entity.
//!
//! # Responsibility
//! - Hold student attributes, the owned address and the school link.
//! - Derive `age` from `birth_date` on demand.
//!
//! # Invariants
//! - `email` must be present and globally unique when the row is written;
//!   the repository layer enforces this, not the entity.
//! - `phone_numbers` keeps insertion order and has no identity of its own.
//! - `age` is transient: the mapping layer never writes or restores it, so a
//!   student read from the store always carries `age == 0`.

use crate::model::address::Address;
use crate::model::school::SchoolId;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of a student row.
pub type StudentId = i64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<StudentId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub phone_numbers: Vec<String>,
    /// Whole years since `birth_date`. Only meaningful after
    /// [`Student::calculate_age`] ran on this instance. Never serialized.
    #[serde(default, skip_serializing)]
    pub age: u32,
    /// Owned address; persisted and deleted together with the student.
    pub address: Option<Address>,
    /// Foreign key to the school this student belongs to.
    pub school_id: Option<SchoolId>,
}

impl Student {
    pub fn builder() -> StudentBuilder {
        StudentBuilder::default()
    }

    /// Recomputes `age` against today's local date and returns it.
    pub fn calculate_age(&mut self) -> u32 {
        self.calculate_age_on(Local::now().date_naive())
    }

    /// Recomputes `age` against `today` and returns it.
    ///
    /// Students without a birth date, or born after `today`, get age `0`.
    pub fn calculate_age_on(&mut self, today: NaiveDate) -> u32 {
        self.age = self
            .birth_date
            .and_then(|birth_date| today.years_since(birth_date))
            .unwrap_or(0);
        self.age
    }
}

/// Fluent constructor for [`Student`].
#[derive(Debug, Default)]
pub struct StudentBuilder {
    inner: Student,
}

impl StudentBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.inner.email = Some(email.into());
        self
    }

    /// Accepts a date or an `Option`, so checked constructors such as
    /// `NaiveDate::from_ymd_opt` chain directly.
    pub fn birth_date(mut self, birth_date: impl Into<Option<NaiveDate>>) -> Self {
        self.inner.birth_date = birth_date.into();
        self
    }

    /// Appends one phone number, keeping earlier ones.
    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.inner.phone_numbers.push(phone_number.into());
        self
    }

    /// Replaces the whole phone number collection.
    pub fn phone_numbers<I, S>(mut self, phone_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.phone_numbers = phone_numbers.into_iter().map(Into::into).collect();
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.inner.address = Some(address);
        self
    }

    pub fn school_id(mut self, school_id: SchoolId) -> Self {
        self.inner.school_id = Some(school_id);
        self
    }

    pub fn build(self) -> Student {
        self.inner
    }
}
