pub mod keys;
pub mod memory;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;
