//! Persistent module state: orders, channel bindings and account balances.
//!
//! Nothing in here commits. Every function works on a unit of work handed in by the caller (see
//! [`crate::db::traits::StoreTransaction`]), and the caller commits or drops it as a whole.
mod bank;
pub mod channels;
pub mod orders;

pub use bank::{AccountLedger, LedgerError, StoreBank};
