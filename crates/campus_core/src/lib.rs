//! Persistence core for the campus domain: schools, students, addresses.
//!
//! Owns the entity shapes, their ownership/cascade rules, write-time
//! constraints, derived finders and the bulk address update.

mod cascade;
pub mod config;
pub mod constraint;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{OrphanPolicy, StoreConfig};
pub use constraint::ConstraintViolation;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::address::{Address, AddressId};
pub use model::location::Location;
pub use model::school::{School, SchoolId};
pub use model::student::{Student, StudentId};
pub use repo::address_repo::{AddressRepository, SqliteAddressRepository};
pub use repo::school_repo::{SchoolRepository, SqliteSchoolRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::school_service::SchoolService;
pub use session::Session;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
