//! Unit-of-work session: one connection plus an address identity cache.
//!
//! # Responsibility
//! - Own the migrated connection repositories borrow.
//! - Keep a read-through cache of address rows keyed by id.
//! - Open immediate transactions for repository writes.
//!
//! # Invariants
//! - Cache changes produced by a write are applied only after its
//!   transaction commits; a rolled-back write leaves the cache untouched.
//! - Set-based writes that bypass entity tracking must evict the rows they
//!   touched before returning to the caller.
//! - Every read or write scope first checks `PRAGMA data_version`; a commit
//!   from any other connection drops the whole cache before rows are loaded.

use crate::config::StoreConfig;
use crate::model::address::{Address, AddressId};
use crate::repo::RepoResult;
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Cache mutations collected while a write transaction is open.
#[derive(Debug, Default)]
pub(crate) struct CacheDelta {
    put: Vec<Address>,
    evict: Vec<AddressId>,
}

impl CacheDelta {
    pub(crate) fn put(&mut self, address: &Address) {
        if let Some(id) = address.id {
            self.evict.retain(|evicted| *evicted != id);
            self.put.push(address.clone());
        }
    }

    pub(crate) fn evict(&mut self, id: AddressId) {
        self.put.retain(|address| address.id != Some(id));
        self.evict.push(id);
    }
}

pub struct Session {
    conn: Connection,
    config: StoreConfig,
    addresses: RefCell<HashMap<AddressId, Address>>,
    data_version: Cell<Option<i64>>,
}

impl Session {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`] with default configuration.
    pub fn new(conn: Connection) -> Self {
        Self::with_config(conn, StoreConfig::default())
    }

    pub fn with_config(conn: Connection, config: StoreConfig) -> Self {
        Self {
            conn,
            config,
            addresses: RefCell::new(HashMap::new()),
            data_version: Cell::new(None),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Detaches every cached entity so later reads go to the store.
    pub fn clear(&self) {
        self.addresses.borrow_mut().clear();
    }

    pub fn cached_address_count(&self) -> usize {
        self.addresses.borrow().len()
    }

    pub(crate) fn begin(&self) -> RepoResult<Transaction<'_>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        self.sync_with_store()?;
        Ok(tx)
    }

    /// Runs a multi-statement read inside one deferred transaction so it
    /// observes a single snapshot of the store.
    pub(crate) fn read<T>(&self, load: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Deferred)?;
        self.sync_with_store()?;
        let value = load()?;
        tx.commit()?;
        Ok(value)
    }

    /// Drops the cache when another connection committed since the last
    /// scope. Changes made through this connection keep the version stable,
    /// so they stay the repositories' job to track.
    fn sync_with_store(&self) -> RepoResult<()> {
        if !self.config.address_cache {
            return Ok(());
        }
        let version: i64 = self
            .conn
            .query_row("PRAGMA data_version;", [], |row| row.get(0))?;
        let previous = self.data_version.replace(Some(version));
        if previous.is_some_and(|previous| previous != version) {
            let mut addresses = self.addresses.borrow_mut();
            let dropped = addresses.len();
            addresses.clear();
            debug!(
                "event=cache_invalidate module=session status=ok reason=external_commit evicted={dropped}"
            );
        }
        Ok(())
    }

    pub(crate) fn cached_address(&self, id: AddressId) -> Option<Address> {
        if !self.config.address_cache {
            return None;
        }
        self.addresses.borrow().get(&id).cloned()
    }

    pub(crate) fn cache_address(&self, address: &Address) {
        if !self.config.address_cache {
            return;
        }
        if let Some(id) = address.id {
            self.addresses.borrow_mut().insert(id, address.clone());
        }
    }

    /// Applies the cache mutations of a committed write.
    pub(crate) fn apply(&self, delta: CacheDelta) {
        if !self.config.address_cache {
            return;
        }
        let mut addresses = self.addresses.borrow_mut();
        for id in delta.evict {
            addresses.remove(&id);
        }
        for address in delta.put {
            if let Some(id) = address.id {
                addresses.insert(id, address);
            }
        }
    }

    /// Evicts rows changed behind the cache's back. No-op with the cache off.
    pub(crate) fn invalidate_addresses(&self, ids: &[AddressId]) {
        if !self.config.address_cache {
            debug!("event=cache_invalidate module=session status=skipped reason=cache_disabled");
            return;
        }
        let mut addresses = self.addresses.borrow_mut();
        let mut evicted = 0usize;
        for id in ids {
            if addresses.remove(id).is_some() {
                evicted += 1;
            }
        }
        debug!(
            "event=cache_invalidate module=session status=ok requested={} evicted={evicted}",
            ids.len()
        );
    }
}
