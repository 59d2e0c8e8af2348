//! Address repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide standalone CRUD over `addresses`.
//! - Run the set-based country update keyed by student name.
//!
//! # Invariants
//! - The bulk update changes all matching rows or none.
//! - After the bulk update returns, no cached address shows the old value:
//!   eviction happens after commit and before the call returns.

use crate::cascade::Cascade;
use crate::model::address::{Address, AddressId};
use crate::query::{bind, Predicate, SqlBinds};
use crate::repo::rows::{load_address, query_addresses, ADDRESS_SELECT_SQL};
use crate::repo::{RepoError, RepoResult};
use crate::session::Session;
use log::info;
use rusqlite::params_from_iter;
use std::time::Instant;

/// Country written by [`AddressRepository::update_all_to_usa_by_student_name`].
pub const USA: &str = "USA";

/// Repository interface for address persistence.
pub trait AddressRepository {
    /// Inserts or updates one address and assigns its id.
    fn save(&self, address: &mut Address) -> RepoResult<AddressId>;
    fn find_by_id(&self, id: AddressId) -> RepoResult<Option<Address>>;
    fn find_all(&self) -> RepoResult<Vec<Address>>;
    /// Deletes an address no student references.
    fn delete(&self, id: AddressId) -> RepoResult<()>;
    /// Sets `country = 'USA'` on every address owned by a student whose
    /// name matches the SQL `LIKE` pattern. Returns the affected row count.
    fn update_all_to_usa_by_student_name(&self, name_pattern: &str) -> RepoResult<usize>;
}

/// SQLite-backed address repository.
pub struct SqliteAddressRepository<'s> {
    session: &'s Session,
}

impl<'s> SqliteAddressRepository<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }
}

impl AddressRepository for SqliteAddressRepository<'_> {
    fn save(&self, address: &mut Address) -> RepoResult<AddressId> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        let id = cascade.persist_address(address)?;
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(id)
    }

    fn find_by_id(&self, id: AddressId) -> RepoResult<Option<Address>> {
        self.session.read(|| load_address(self.session, id))
    }

    fn find_all(&self) -> RepoResult<Vec<Address>> {
        self.session.read(|| {
            query_addresses(
                self.session,
                &format!("{ADDRESS_SELECT_SQL} ORDER BY id ASC;"),
            )
        })
    }

    fn delete(&self, id: AddressId) -> RepoResult<()> {
        let tx = self.session.begin()?;
        let mut cascade = Cascade::new(&tx, self.session.config().orphan_policy);
        if !cascade.delete_address(id)? {
            return Err(RepoError::NotFound {
                entity: "address",
                id,
            });
        }
        let delta = cascade.finish();
        tx.commit()?;

        self.session.apply(delta);
        Ok(())
    }

    fn update_all_to_usa_by_student_name(&self, name_pattern: &str) -> RepoResult<usize> {
        let started_at = Instant::now();
        let mut binds: SqlBinds = Vec::new();
        let owner_filter = Predicate::like("s.name", name_pattern).render(&mut binds);
        let owned_ids = format!(
            "SELECT s.address_id
             FROM students s
             WHERE s.address_id IS NOT NULL
               AND {owner_filter}"
        );

        let tx = self.session.begin()?;
        let affected_ids = {
            let mut stmt = tx.prepare(&owned_ids)?;
            let ids = stmt
                .query_map(params_from_iter(binds.iter()), |row| {
                    row.get::<_, AddressId>(0)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };
        let changed = tx.execute(
            &format!("UPDATE addresses SET country = ? WHERE id IN ({owned_ids});"),
            params_from_iter(std::iter::once(bind(USA)).chain(binds)),
        )?;
        tx.commit()?;

        self.session.invalidate_addresses(&affected_ids);
        info!(
            "event=bulk_update module=repo status=ok target=addresses rows={changed} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(changed)
    }
}
