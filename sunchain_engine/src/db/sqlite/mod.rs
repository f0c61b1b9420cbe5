mod db;

use std::{env, str::FromStr, time::Duration};

pub use db::{SqliteDatabase, SqliteTransaction};
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::db::traits::StoreError;

const SQLITE_DB_URL: &str = "sqlite://data/sunchain_store.db";

pub fn db_url() -> String {
    let result = env::var("SUN_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ SUN_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens a connection pool on `url`, creating the database file if it does not exist yet.
///
/// The busy timeout covers other processes sharing the file. Within a process, [`SqliteDatabase`] queues its own
/// units of work.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
