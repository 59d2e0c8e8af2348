//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Expose use-case oriented CRUD and finder contracts per entity.
//! - Run every operation in exactly one transaction scope.
//! - Isolate SQL details from callers.
//!
//! # Invariants
//! - Constraint failures surface as `RepoError::Constraint`.
//! - Lookups by id return `Ok(None)` when nothing matches.
//! - Writes touch the session cache only after commit.

pub mod address_repo;
mod error;
mod rows;
pub mod school_repo;
pub mod student_repo;

pub use error::{RepoError, RepoResult};
