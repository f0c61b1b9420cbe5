//! #  Storage seam
//!
//! This module defines the interface contracts that storage *backends* must fulfil for the settlement engine.
//!
//! * [`KeyValueStore`] is the raw read/write interface that the ledger components use.
//! * [`StoreTransaction`] is a [`KeyValueStore`] that is also an atomic unit of work.
//! * [`StoreBackend`] hands out transactions.
//!
//! Every public operation of the engine runs inside exactly one transaction, so an operation either commits all of
//! its writes (order records, balances, channel sequences) or none of them.
mod key_value_store;

pub use key_value_store::{KeyValueStore, StoreBackend, StoreError, StoreTransaction};
