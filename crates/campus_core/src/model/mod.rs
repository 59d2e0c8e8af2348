//! Academic domain model: schools, students and their addresses.
//!
//! # Responsibility
//! - Define the entity shapes persisted by the repository layer.
//! - Provide builder-style constructors for entity graphs.
//!
//! # Invariants
//! - Surrogate ids are `None` until the store assigns them on first persist.
//! - Entities never perform I/O.
//! - `Student::age` is derived and never part of the persisted shape.

pub mod address;
pub mod location;
pub mod school;
pub mod student;
