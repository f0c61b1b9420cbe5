//! An in-process storage backend.
//!
//! `MemoryDatabase` keeps the whole store in a `BTreeMap`. A transaction holds the store's lock for its whole
//! lifetime, so units of work are strictly serialised, the same way a block executor runs one transaction at a time.
//! Writes are buffered in an overlay and only applied to the map when the transaction commits.
use std::{
    collections::BTreeMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::*;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::traits::{KeyValueStore, StoreBackend, StoreError, StoreTransaction};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

type Map = BTreeMap<String, Vec<u8>>;

#[derive(Clone)]
pub struct MemoryDatabase {
    url: String,
    data: Arc<Mutex<Map>>,
}

impl Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryDatabase ({})", self.url)
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        let url = format!("memory://{}", NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed));
        Self { url, data: Arc::new(Mutex::new(BTreeMap::new())) }
    }
}

impl StoreBackend for MemoryDatabase {
    type Transaction = MemoryTransaction;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        let guard = Arc::clone(&self.data).lock_owned().await;
        trace!("🗃️ Memory transaction started on {}", self.url);
        Ok(MemoryTransaction { guard, writes: BTreeMap::new() })
    }
}

/// A unit of work on a [`MemoryDatabase`]. `None` in the overlay marks a pending delete.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Map>,
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl KeyValueStore for MemoryTransaction {
    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = match self.writes.get(key) {
            Some(pending) => pending.clone(),
            None => self.guard.get(key).cloned(),
        };
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    async fn has(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn iterate(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut view = self
            .guard
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<BTreeMap<_, _>>();
        let pending = self.writes.range(prefix.to_string()..).take_while(|(k, _)| k.starts_with(prefix));
        for (k, v) in pending {
            match v {
                Some(v) => view.insert(k.clone(), v.clone()),
                None => view.remove(k),
            };
        }
        Ok(view.into_iter().collect())
    }
}

impl StoreTransaction for MemoryTransaction {
    async fn commit(mut self) -> Result<(), StoreError> {
        let writes = std::mem::take(&mut self.writes);
        let count = writes.len();
        for (key, value) in writes {
            match value {
                Some(v) => self.guard.insert(key, v),
                None => self.guard.remove(&key),
            };
        }
        trace!("🗃️ Memory transaction committed {count} writes");
        Ok(())
    }
}
