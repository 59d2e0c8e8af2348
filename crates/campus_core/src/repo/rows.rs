//! Row hydration shared by the entity repositories.
//!
//! Reads resolve leaves first: address (through the session cache), phone
//! numbers, then the student; schools load their students through
//! `students.school_id`.

use crate::model::address::{Address, AddressId};
use crate::model::location::Location;
use crate::model::school::School;
use crate::model::student::{Student, StudentId};
use crate::query::{bind, SqlBinds};
use crate::repo::{RepoError, RepoResult};
use crate::session::Session;
use chrono::NaiveDate;
use rusqlite::{params_from_iter, Row};

pub(crate) const ADDRESS_SELECT_SQL: &str = "SELECT
    id,
    street,
    city,
    country,
    zip_code
FROM addresses";

pub(crate) const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    birth_date,
    address_id,
    school_id
FROM students";

pub(crate) const SCHOOL_SELECT_SQL: &str = "SELECT
    id,
    name,
    location
FROM schools";

/// Returns the cached address for this row's id, or the row itself.
///
/// Within one connection a cached instance wins over the fetched row, so a
/// write that bypasses the repositories stays invisible until the entry is
/// evicted. Commits from other connections clear the cache at scope start.
pub(crate) fn address_from_row(session: &Session, row: &Row<'_>) -> RepoResult<Address> {
    let id: AddressId = row.get("id")?;
    if let Some(cached) = session.cached_address(id) {
        return Ok(cached);
    }

    let address = Address {
        id: Some(id),
        street: row.get("street")?,
        city: row.get("city")?,
        country: row.get("country")?,
        zip_code: row.get("zip_code")?,
    };
    session.cache_address(&address);
    Ok(address)
}

pub(crate) fn load_address(session: &Session, id: AddressId) -> RepoResult<Option<Address>> {
    if let Some(cached) = session.cached_address(id) {
        return Ok(Some(cached));
    }

    let mut stmt = session
        .conn()
        .prepare(&format!("{ADDRESS_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(address_from_row(session, row)?)),
        None => Ok(None),
    }
}

pub(crate) fn query_addresses(session: &Session, sql: &str) -> RepoResult<Vec<Address>> {
    let mut stmt = session.conn().prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut addresses = Vec::new();
    while let Some(row) = rows.next()? {
        addresses.push(address_from_row(session, row)?);
    }
    Ok(addresses)
}

/// Runs a student query and hydrates every matching row.
///
/// `age` is left at its default: it has no column to be restored from.
pub(crate) fn query_students(
    session: &Session,
    sql: &str,
    binds: SqlBinds,
) -> RepoResult<Vec<Student>> {
    let mut stmt = session.conn().prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(student_from_row(session, row)?);
    }
    Ok(students)
}

fn student_from_row(session: &Session, row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;

    let address = match row.get::<_, Option<AddressId>>("address_id")? {
        Some(address_id) => Some(load_address(session, address_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "students.address_id `{address_id}` of student {id} has no address row"
            ))
        })?),
        None => None,
    };

    Ok(Student {
        id: Some(id),
        name: row.get("name")?,
        email: row.get("email")?,
        birth_date: row.get::<_, Option<NaiveDate>>("birth_date")?,
        phone_numbers: load_phone_numbers(session, id)?,
        age: 0,
        address,
        school_id: row.get("school_id")?,
    })
}

fn load_phone_numbers(session: &Session, student_id: StudentId) -> RepoResult<Vec<String>> {
    let mut stmt = session.conn().prepare(
        "SELECT phone_number
         FROM student_phone_numbers
         WHERE student_id = ?1
         ORDER BY position ASC;",
    )?;
    let phone_numbers = stmt
        .query_map([student_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(phone_numbers)
}

pub(crate) fn query_schools(
    session: &Session,
    sql: &str,
    binds: SqlBinds,
) -> RepoResult<Vec<School>> {
    let mut stmt = session.conn().prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut schools = Vec::new();
    while let Some(row) = rows.next()? {
        schools.push(school_from_row(session, row)?);
    }
    Ok(schools)
}

fn school_from_row(session: &Session, row: &Row<'_>) -> RepoResult<School> {
    let id: i64 = row.get("id")?;
    let location = match row.get::<_, Option<String>>("location")? {
        Some(value) => Some(Location::from_db_str(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid location `{value}` in schools.location"))
        })?),
        None => None,
    };

    let students = query_students(
        session,
        &format!("{STUDENT_SELECT_SQL} WHERE school_id = ? ORDER BY id;"),
        vec![bind(id)],
    )?;

    let mut school = School::builder().students(students).build();
    school.id = Some(id);
    school.name = row.get("name")?;
    school.location = location;
    Ok(school)
}

