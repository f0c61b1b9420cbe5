use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The store is not available: {0}")]
    Unavailable(String),
    #[error("The value stored under '{key}' is corrupt. {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn corrupt<K: Into<String>, R: ToString>(key: K, reason: R) -> Self {
        Self::Corrupt { key: key.into(), reason: reason.to_string() }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Unavailable(e.to_string()),
            e => StoreError::DatabaseError(e.to_string()),
        }
    }
}

/// The raw key-value interface that every ledger component reads and writes through.
///
/// Keys are plain strings; every component owns a key prefix (see [`crate::db::keys`]). Values are opaque bytes.
///
/// All the methods take `&mut self` because an implementation is always a unit of work (a [`StoreTransaction`]),
/// never a shared handle.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Fetches the value stored under `key`, or `None` if there isn't one.
    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, replacing any existing value.
    async fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Removes `key`. Deleting a key that does not exist is not an error.
    async fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    async fn has(&mut self, key: &str) -> Result<bool, StoreError>;

    /// Returns every `(key, value)` pair whose key starts with `prefix`, in ascending key order.
    ///
    /// The result reflects the writes already made in this unit of work.
    async fn iterate(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
}

/// A unit of work over a [`StoreBackend`].
///
/// Nothing written through the transaction is visible outside of it until [`StoreTransaction::commit`] succeeds.
/// Dropping a transaction without committing it discards every write, which is how a failed operation is rolled back.
#[allow(async_fn_in_trait)]
pub trait StoreTransaction: KeyValueStore {
    async fn commit(self) -> Result<(), StoreError>;
}

/// A storage backend capable of handing out atomic units of work.
///
/// Backends are responsible for linearising units of work: two transactions never observe each other's uncommitted
/// writes, and a transaction that commits does so completely or not at all.
#[allow(async_fn_in_trait)]
pub trait StoreBackend: Clone {
    type Transaction: StoreTransaction;

    /// The URL of the database
    fn url(&self) -> &str;

    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Self::Transaction, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
