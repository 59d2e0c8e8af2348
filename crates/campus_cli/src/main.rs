//! Command-line entry point for the campus store.
//!
//! # Responsibility
//! - Open (and migrate) a database, optionally seeding demo data.
//! - Print a short deterministic summary of stored schools.

use campus_core::db::{open_db, open_db_in_memory};
use campus_core::{
    core_version, default_log_level, init_logging, OrphanPolicy, SchoolService, Session,
    SqliteSchoolRepository, SqliteStudentRepository, StoreConfig, StudentRepository,
};
use clap::{Parser, ValueEnum};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Seeds the demo school on start.
    Production,
    /// Opens the store without seeding.
    Test,
}

#[derive(Debug, Parser)]
#[command(name = "campus", version, about = "Campus store bootstrap")]
struct Args {
    /// SQLite database file. Uses a private in-memory store when omitted.
    #[arg(long, env = "CAMPUS_DB")]
    db: Option<PathBuf>,

    #[arg(long, env = "CAMPUS_PROFILE", value_enum, default_value_t = Profile::Test)]
    profile: Profile,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, env = "CAMPUS_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, env = "CAMPUS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Fate of an address detached from a surviving student: retain|delete.
    #[arg(long, env = "CAMPUS_ORPHAN_POLICY", default_value_t = OrphanPolicy::Retain)]
    orphan_policy: OrphanPolicy,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("campus: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    if let Some(log_dir) = args.log_dir.as_ref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let conn = match args.db.as_ref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;

    let config = StoreConfig {
        orphan_policy: args.orphan_policy,
        ..StoreConfig::default()
    };
    let session = Session::with_config(conn, config);
    let schools = SchoolService::new(SqliteSchoolRepository::new(&session));

    if args.profile == Profile::Production {
        schools.seed_demo_data().map_err(|err| err.to_string())?;
    }

    println!("campus_core version={}", core_version());
    for school in schools.list_schools().map_err(|err| err.to_string())? {
        println!(
            "school id={} name={} location={} students={}",
            school.id.unwrap_or_default(),
            school.name.as_deref().unwrap_or("-"),
            school
                .location
                .map_or_else(|| "-".to_string(), |location| location.to_string()),
            school.students().len()
        );
    }
    let students = SqliteStudentRepository::new(&session)
        .count()
        .map_err(|err| err.to_string())?;
    println!("students total={students}");
    Ok(())
}
