//! Cross-chain packet transport.
//!
//! The settlement module only needs three things from the transport: where a local channel leads, which sequence
//! number the next outbound packet gets, and a way to send it. [`ChannelTransport`] is that contract. Transport state
//! is read and written through the caller's unit of work, so a rolled-back operation never leaves a packet behind.
mod dispatcher;
mod store_transport;

pub use dispatcher::dispatch;
use serde::{Deserialize, Serialize};
pub use store_transport::{ChannelEnd, StoreTransport};
use thiserror::Error;

use crate::db::traits::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Channel {channel} on port {port} does not exist")]
    ChannelNotFound { port: String, channel: String },
    #[error("Packet sequence mismatch. Expected {expected}, got {actual}")]
    SequenceMismatch { expected: u64, actual: u64 },
    #[error("Packet rejected. {0}")]
    Rejected(String),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("Could not serialize packet. {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    pub timeout_height: u64,
}

#[allow(async_fn_in_trait)]
pub trait ChannelTransport {
    /// The sequence number the next packet sent on `(port, channel)` must carry, or `None` if the channel is unknown.
    async fn next_outbound_sequence<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Option<u64>, TransportError>;

    /// The remote `(port, channel)` that the local `(port, channel)` is connected to, if any.
    async fn resolve_counterparty<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Option<(String, String)>, TransportError>;

    /// Queues `packet` for delivery and advances the channel's outbound sequence.
    async fn send<S: KeyValueStore>(&self, packet: &Packet, store: &mut S) -> Result<(), TransportError>;
}
