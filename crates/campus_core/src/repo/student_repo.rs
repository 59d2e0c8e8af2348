//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist students together with their address and phone numbers.
//! - Serve the derived finders (prefix-or-date-range, distinct countries).
//!
//! # Invariants
//! - `email` is required and unique; violations abort the write.
//! - Saving a student never cascades to its school.
//! - `save_all` commits all students or none.

use crate::cascade::Cascade;
use crate::model::student::{Student, StudentId};
use crate::query::{bind, Predicate, SqlBinds};
use crate::repo::rows::{query_students, STUDENT_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use crate::session::Session;
use chrono::NaiveDate;

/// Repository interface for student persistence and finders.
pub trait StudentRepository {
    /// Inserts or updates one student and assigns ids into `student`.
    fn save(&self, student: &mut Student) -> RepoResult<StudentId>;
    /// Saves every student in one transaction.
    fn save_all(&self, students: &mut [Student]) -> RepoResult<Vec<StudentId>>;
    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_all(&self) -> RepoResult<Vec<Student>>;
    fn count(&self) -> RepoResult<u64>;
    /// Deletes one student and its owned address. The school is untouched.
    fn delete(&self, id: StudentId) -> RepoResult<()>;
    /// Students whose name starts with `prefix` OR whose birth date lies in
    /// `[from, to]`, both bounds inclusive. Each match appears once.
    fn find_by_name_starting_with_or_birth_date_between(
        &self,
        prefix: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Student>>;
    /// Distinct non-null countries over all student addresses.
    fn find_all_country(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'s> {
    session: &'s Session,
}

impl<'s> SqliteStudentRepository<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    fn find_where(&self, predicate: &Predicate) -> RepoResult<Vec<Student>> {
        let mut binds: SqlBinds = Vec::new();
        let clause = predicate.render(&mut binds);
        self.session.read(|| {
            query_students(
                self.session,
                &format!("{STUDENT_SELECT_SQL} WHERE {clause} ORDER BY id ASC;"),
                binds,
            )
        })
    }

    fn write_all(&self, students: &mut [Student]) -> RepoResult<Vec<StudentId>> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        let mut ids = Vec::with_capacity(students.len());
        for student in students.iter_mut() {
            ids.push(cascade.persist_student(student)?);
        }
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(ids)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn save(&self, student: &mut Student) -> RepoResult<StudentId> {
        self.save_all(std::slice::from_mut(student))?
            .pop()
            .ok_or_else(|| RepoError::InvalidData("student save returned no id".to_string()))
    }

    fn save_all(&self, students: &mut [Student]) -> RepoResult<Vec<StudentId>> {
        let snapshot = students.to_vec();
        match self.write_all(students) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                // Ids assigned inside the rolled-back transaction are void.
                students.clone_from_slice(&snapshot);
                Err(err)
            }
        }
    }

    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut students = self.session.read(|| {
            query_students(
                self.session,
                &format!("{STUDENT_SELECT_SQL} WHERE id = ?;"),
                vec![bind(id)],
            )
        })?;
        Ok(students.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Student>> {
        self.session.read(|| {
            query_students(
                self.session,
                &format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"),
                Vec::new(),
            )
        })
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .session
            .conn()
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn delete(&self, id: StudentId) -> RepoResult<()> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        if !cascade.delete_student(id)? {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(())
    }

    fn find_by_name_starting_with_or_birth_date_between(
        &self,
        prefix: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Student>> {
        let predicate = Predicate::starts_with("name", prefix).or(Predicate::date_between(
            "birth_date",
            from,
            to,
        ));
        self.find_where(&predicate)
    }

    fn find_all_country(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.session.conn().prepare(
            "SELECT DISTINCT a.country
             FROM students s
             INNER JOIN addresses a ON a.id = s.address_id
             WHERE a.country IS NOT NULL
             ORDER BY a.country ASC;",
        )?;
        let countries = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(countries)
    }
}
