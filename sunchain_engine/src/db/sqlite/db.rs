use std::{fmt::Debug, sync::Arc};

use log::*;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{db_url, new_pool};
use crate::db::traits::{KeyValueStore, StoreBackend, StoreError, StoreTransaction};

/// A SQLite-backed module store. The module state is kept in a single `kv_store` table, and every unit of work is a
/// SQLite transaction.
///
/// SQLite cannot upgrade a deferred read lock to a write lock while another connection holds one, so concurrent
/// units of work would fail with `SQLITE_BUSY` rather than wait. Units of work are therefore queued behind a single
/// write lock that is shared by every clone of the database handle.
#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in the `SUN_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool, write_lock: Arc::new(Mutex::new(())) })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed. {e}")))?;
        debug!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }
}

impl StoreBackend for SqliteDatabase {
    type Transaction = SqliteTransaction;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        let tx = self.pool.begin().await?;
        trace!("🗃️ SQLite transaction started on {}", self.url);
        Ok(SqliteTransaction { tx, _guard: guard })
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

/// A unit of work on a [`SqliteDatabase`]. Fields drop in order, so an uncommitted transaction is rolled back before
/// the write lock is released.
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl KeyValueStore for SqliteTransaction {
    async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        let value = row.map(|r| r.try_get::<Vec<u8>, _>("value")).transpose()?;
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES ($1, $2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value;
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1").bind(key).execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn has(&mut self, key: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM kv_store WHERE key = $1").bind(key).fetch_optional(&mut *self.tx).await?;
        Ok(row.is_some())
    }

    async fn iterate(&mut self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows = sqlx::query(r"SELECT key, value FROM kv_store WHERE key LIKE $1 ESCAPE '\' ORDER BY key ASC")
            .bind(pattern)
            .fetch_all(&mut *self.tx)
            .await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: Vec<u8> = row.try_get("value")?;
            // LIKE is case-insensitive for ASCII in SQLite
            if key.starts_with(prefix) {
                result.push((key, value));
            }
        }
        Ok(result)
    }
}

impl StoreTransaction for SqliteTransaction {
    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
