//! The public face of the settlement module.
//!
//! [`OrderFlowApi`] wraps a storage backend, an account ledger and a channel transport, and exposes the module's
//! operations (`place_order`, `bind_channel`, `handle_oracle_response`), its message router and its queries. Each
//! operation opens its own unit of work.
pub mod config;
pub mod messages;
pub mod order_flow_api;
