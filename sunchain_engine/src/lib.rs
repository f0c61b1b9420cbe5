//! Sunchain settlement engine
//!
//! The settlement module lets an account buy an asset whose price is only known to another chain. A buy places an
//! order, moves the buyer's funds into escrow and sends a price request to the oracle chain over a channel. The
//! answer arrives later, in an unrelated transaction, and is matched back to its order through the correlation id
//! `Order:{id}`. The order is then settled: either a fill is credited to the owner, or, if the escrow does not buy a
//! single unit, the escrow is refunded.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@db`]). A key-value store with atomic units of work. SQLite and in-memory backends are provided.
//! 2. Module state ([`mod@ledger`]): orders, channel bindings and balances.
//! 3. The oracle protocol ([`mod@oracle`]) and the channel transport ([`mod@transport`]).
//! 4. The settlement state machine ([`mod@settlement`]).
//! 5. The public API ([`OrderFlowApi`]), which ties the above together, one unit of work per operation.
//!
//! The engine also emits events when orders are placed and settled. See [`mod@events`] for how to hook into them.
pub mod db;
pub mod db_types;
mod errors;
pub mod events;
pub mod helpers;
pub mod ledger;
pub mod oracle;
pub mod settlement;
mod sun_api;
pub mod transport;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::{
    memory::MemoryDatabase,
    traits::{KeyValueStore, StoreBackend, StoreError, StoreTransaction},
};
pub use errors::SettlementError;
pub use settlement::{SettlementEngine, SettlementOutcome};
pub use sun_api::{
    config::SettlementConfig,
    messages::{Msg, MsgBuySun, MsgResult, MsgSetSourceChannel},
    order_flow_api::OrderFlowApi,
};
