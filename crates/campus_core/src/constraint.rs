//! Write-time constraint rules and their failure taxonomy.
//!
//! # Responsibility
//! - Check required fields before a row is written.
//! - Translate SQLite constraint failures into [`ConstraintViolation`].
//!
//! # Invariants
//! - Uniqueness is decided by the store's unique indexes, never by a
//!   read-then-write check, so racing writers get exactly one winner.
//! - A violation aborts the current write; rows committed earlier stay intact.

use crate::model::student::Student;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const STUDENT_EMAIL: &str = "students.email";

static CONSTRAINT_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"constraint failed: (?P<target>[A-Za-z0-9_.]+(?:, [A-Za-z0-9_.]+)*)")
        .expect("constraint target pattern is valid")
});

/// A unique, required-field, foreign-key or check rule was broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Required column was left empty. `target` is `table.column`.
    NotNull { target: String },
    /// Value collides with an existing row. `target` is `table.column`.
    Unique { target: String },
    ForeignKey { detail: String },
    Check { detail: String },
}

impl ConstraintViolation {
    /// Returns the `table.column` the violation refers to, when known.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::NotNull { target } | Self::Unique { target } => Some(target.as_str()),
            Self::ForeignKey { .. } | Self::Check { .. } => None,
        }
    }
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotNull { target } => write!(f, "required value missing for {target}"),
            Self::Unique { target } => write!(f, "duplicate value for unique {target}"),
            Self::ForeignKey { detail } => write!(f, "foreign key violation: {detail}"),
            Self::Check { detail } => write!(f, "check constraint violation: {detail}"),
        }
    }
}

impl Error for ConstraintViolation {}

/// Checks required student fields before any SQL runs.
pub fn validate_student(student: &Student) -> Result<(), ConstraintViolation> {
    if student.email.is_none() {
        return Err(ConstraintViolation::NotNull {
            target: STUDENT_EMAIL.to_string(),
        });
    }
    Ok(())
}

/// Extracts a constraint violation from a SQLite failure.
///
/// Returns the original error untouched when it is not a constraint failure.
pub fn classify_sqlite_error(err: rusqlite::Error) -> Result<ConstraintViolation, rusqlite::Error> {
    let (code, message) = match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.code == ErrorCode::ConstraintViolation =>
        {
            (code.extended_code, message.unwrap_or_default())
        }
        other => return Err(other),
    };

    let target = CONSTRAINT_TARGET
        .captures(&message)
        .and_then(|captures| captures.name("target"))
        .map(|target| target.as_str().to_string());

    let violation = match code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintViolation::Unique {
                target: target.unwrap_or(message),
            }
        }
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintViolation::NotNull {
            target: target.unwrap_or(message),
        },
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintViolation::ForeignKey { detail: message },
        _ => ConstraintViolation::Check { detail: message },
    };
    Ok(violation)
}
