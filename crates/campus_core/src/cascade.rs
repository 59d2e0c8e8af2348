//! Ownership-graph walker for cascading writes and deletes.
//!
//! # Responsibility
//! - Persist a school, its students and their addresses in one transaction.
//! - Delete owned rows before their owners' rows disappear.
//!
//! # Invariants
//! - Ownership edges: School -> Student (set), Student -> Address (one).
//! - The Student -> School edge is a plain foreign key: saving a student
//!   never creates or modifies a school row.
//! - Writes walk roots first; each student's address is written before the
//!   student row that references it.
//! - Deletes walk leaves first: phone numbers, student, address, school.
//! - Every helper runs on the caller's open transaction and never commits.

use crate::config::OrphanPolicy;
use crate::constraint::validate_student;
use crate::model::address::{Address, AddressId};
use crate::model::school::{School, SchoolId};
use crate::model::student::{Student, StudentId};
use crate::repo::{RepoError, RepoResult};
use crate::session::CacheDelta;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Walks entity graphs on one open transaction, recording cache changes.
pub(crate) struct Cascade<'tx> {
    conn: &'tx Connection,
    orphan_policy: OrphanPolicy,
    delta: CacheDelta,
}

impl<'tx> Cascade<'tx> {
    pub(crate) fn new(conn: &'tx Connection, orphan_policy: OrphanPolicy) -> Self {
        Self {
            conn,
            orphan_policy,
            delta: CacheDelta::default(),
        }
    }

    /// Hands back the cache changes to apply once the transaction commits.
    pub(crate) fn finish(self) -> CacheDelta {
        self.delta
    }

    pub(crate) fn persist_address(&mut self, address: &mut Address) -> RepoResult<AddressId> {
        let id = match address.id {
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE addresses
                     SET street = ?2, city = ?3, country = ?4, zip_code = ?5
                     WHERE id = ?1;",
                    params![
                        id,
                        address.street.as_deref(),
                        address.city.as_deref(),
                        address.country.as_deref(),
                        address.zip_code,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "address",
                        id,
                    });
                }
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO addresses (street, city, country, zip_code)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        address.street.as_deref(),
                        address.city.as_deref(),
                        address.country.as_deref(),
                        address.zip_code,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                address.id = Some(id);
                id
            }
        };

        self.delta.put(address);
        Ok(id)
    }

    /// Persists one student with its address and phone numbers.
    pub(crate) fn persist_student(&mut self, student: &mut Student) -> RepoResult<StudentId> {
        validate_student(student)?;

        let previous_address_id = match student.id {
            Some(id) => stored_address_id(self.conn, id)?.ok_or(RepoError::NotFound {
                entity: "student",
                id,
            })?,
            None => None,
        };

        let address_id = match student.address.as_mut() {
            Some(address) => Some(self.persist_address(address)?),
            None => None,
        };

        let id = match student.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE students
                     SET name = ?2, email = ?3, birth_date = ?4, address_id = ?5, school_id = ?6
                     WHERE id = ?1;",
                    params![
                        id,
                        student.name.as_deref(),
                        student.email.as_deref(),
                        student.birth_date,
                        address_id,
                        student.school_id,
                    ],
                )?;
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO students (name, email, birth_date, address_id, school_id)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        student.name.as_deref(),
                        student.email.as_deref(),
                        student.birth_date,
                        address_id,
                        student.school_id,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                student.id = Some(id);
                id
            }
        };

        replace_phone_numbers(self.conn, id, &student.phone_numbers)?;

        if let Some(previous) = previous_address_id {
            if Some(previous) != address_id {
                self.detach_address(previous)?;
            }
        }

        debug!(
            "event=student_save module=cascade status=ok student_id={id} has_address={} phone_count={}",
            address_id.is_some(),
            student.phone_numbers.len()
        );
        Ok(id)
    }

    /// Persists a school, then every member student pointing back at it.
    pub(crate) fn persist_school(&mut self, school: &mut School) -> RepoResult<SchoolId> {
        let location = school.location.map(|location| location.as_db_str());
        let id = match school.id {
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE schools SET name = ?2, location = ?3 WHERE id = ?1;",
                    params![id, school.name.as_deref(), location],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "school",
                        id,
                    });
                }
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO schools (name, location) VALUES (?1, ?2);",
                    params![school.name.as_deref(), location],
                )?;
                let id = self.conn.last_insert_rowid();
                school.id = Some(id);
                id
            }
        };

        for student in school.students_mut() {
            student.school_id = Some(id);
            self.persist_student(student)?;
        }

        debug!(
            "event=school_save module=cascade status=ok school_id={id} student_count={}",
            school.students().len()
        );
        Ok(id)
    }

    /// Deletes a student, its phone numbers and its owned address.
    ///
    /// Returns `false` when no row had this id.
    pub(crate) fn delete_student(&mut self, id: StudentId) -> RepoResult<bool> {
        let Some(address_id) = stored_address_id(self.conn, id)? else {
            return Ok(false);
        };

        self.conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if let Some(address_id) = address_id {
            self.delete_address(address_id)?;
        }
        Ok(true)
    }

    /// Deletes a school after deleting every student linked to it.
    ///
    /// Returns `false` when no row had this id.
    pub(crate) fn delete_school(&mut self, id: SchoolId) -> RepoResult<bool> {
        let member_ids = {
            let mut stmt = self
                .conn
                .prepare("SELECT id FROM students WHERE school_id = ?1 ORDER BY id;")?;
            let ids = stmt
                .query_map([id], |row| row.get::<_, StudentId>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        for student_id in &member_ids {
            self.delete_student(*student_id)?;
        }

        let changed = self
            .conn
            .execute("DELETE FROM schools WHERE id = ?1;", [id])?;
        debug!(
            "event=school_delete module=cascade status=ok school_id={id} student_count={} existed={}",
            member_ids.len(),
            changed > 0
        );
        Ok(changed > 0)
    }

    pub(crate) fn delete_address(&mut self, id: AddressId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM addresses WHERE id = ?1;", [id])?;
        self.delta.evict(id);
        Ok(changed > 0)
    }

    fn detach_address(&mut self, id: AddressId) -> RepoResult<()> {
        match self.orphan_policy {
            OrphanPolicy::Retain => {
                debug!("event=address_orphan module=cascade status=ok address_id={id} policy=retain");
            }
            OrphanPolicy::Delete => {
                self.delete_address(id)?;
                debug!("event=address_orphan module=cascade status=ok address_id={id} policy=delete");
            }
        }
        Ok(())
    }
}

/// Outer `None`: no student row. Inner `None`: student without address.
fn stored_address_id(conn: &Connection, id: StudentId) -> RepoResult<Option<Option<AddressId>>> {
    let address_id = conn
        .query_row(
            "SELECT address_id FROM students WHERE id = ?1;",
            [id],
            |row| row.get::<_, Option<AddressId>>(0),
        )
        .optional()?;
    Ok(address_id)
}

fn replace_phone_numbers(
    conn: &Connection,
    student_id: StudentId,
    phone_numbers: &[String],
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM student_phone_numbers WHERE student_id = ?1;",
        [student_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO student_phone_numbers (student_id, position, phone_number)
         VALUES (?1, ?2, ?3);",
    )?;
    for (position, phone_number) in phone_numbers.iter().enumerate() {
        stmt.execute(params![student_id, position as i64, phone_number])?;
    }
    Ok(())
}
