//! School repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and delete whole school graphs through the cascade walker.
//! - Load schools with their member students resolved by foreign key.
//!
//! # Invariants
//! - Saving a school saves every member student and their addresses in the
//!   same transaction.
//! - Deleting a school deletes every student linked to it first.

use crate::cascade::Cascade;
use crate::model::school::{School, SchoolId};
use crate::query::bind;
use crate::repo::rows::{query_schools, SCHOOL_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use crate::session::Session;
use log::info;

/// Repository interface for school persistence.
pub trait SchoolRepository {
    /// Inserts or updates the school and cascades to its students.
    fn save(&self, school: &mut School) -> RepoResult<SchoolId>;
    fn find_by_id(&self, id: SchoolId) -> RepoResult<Option<School>>;
    fn find_all(&self) -> RepoResult<Vec<School>>;
    /// Deletes one school and its students.
    fn delete(&self, id: SchoolId) -> RepoResult<()>;
    /// Deletes every school and its students. Returns the school count.
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed school repository.
pub struct SqliteSchoolRepository<'s> {
    session: &'s Session,
}

impl<'s> SqliteSchoolRepository<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    fn write_graph(&self, school: &mut School) -> RepoResult<SchoolId> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        let id = cascade.persist_school(school)?;
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(id)
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn save(&self, school: &mut School) -> RepoResult<SchoolId> {
        let snapshot = school.clone();
        let id = match self.write_graph(school) {
            Ok(id) => id,
            Err(err) => {
                // Ids assigned inside the rolled-back transaction are void.
                *school = snapshot;
                return Err(err);
            }
        };
        info!(
            "event=school_save module=repo status=ok school_id={id} student_count={}",
            school.students().len()
        );
        Ok(id)
    }

    fn find_by_id(&self, id: SchoolId) -> RepoResult<Option<School>> {
        let mut schools = self.session.read(|| {
            query_schools(
                self.session,
                &format!("{SCHOOL_SELECT_SQL} WHERE id = ?;"),
                vec![bind(id)],
            )
        })?;
        Ok(schools.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<School>> {
        self.session.read(|| {
            query_schools(
                self.session,
                &format!("{SCHOOL_SELECT_SQL} ORDER BY id ASC;"),
                Vec::new(),
            )
        })
    }

    fn delete(&self, id: SchoolId) -> RepoResult<()> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        if !cascade.delete_school(id)? {
            return Err(RepoError::NotFound {
                entity: "school",
                id,
            });
        }
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let tx = self.session.begin()?;
        let school_ids = {
            let mut stmt = tx.prepare("SELECT id FROM schools ORDER BY id;")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, SchoolId>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        for id in &school_ids {
            cascade.delete_school(*id)?;
        }
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        info!(
            "event=school_delete_all module=repo status=ok school_count={}",
            school_ids.len()
        );
        Ok(school_ids.len())
    }
}
