//! Campus store: SQLite file layout, connection setup and schema history.
//!
//! The store keeps schools, students, addresses and the ordered phone-number
//! collection in four tables. Schema changes ship as numbered SQL scripts
//! under `migrations/` and run when a connection is opened.
//!
//! # Invariants
//! - The applied schema version lives in `PRAGMA user_version`.
//! - A store written by a newer build is refused instead of downgraded.
//! - Repositories receive connections only after every migration ran.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the campus store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The numbered migration script failed; nothing from the batch stuck.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "campus store error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "campus schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "campus store is at schema {db_version}, this build reads up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
