use sunchain_common::{Address, Coin};
use thiserror::Error;

use crate::{db::traits::StoreError, db_types::OrderId, transport::TransportError};

/// Everything that can make a settlement-module operation fail.
///
/// Any of these aborts the enclosing unit of work, so no partial state is ever committed. Duplicate oracle responses
/// are *not* errors; they resolve to [`crate::SettlementOutcome::AlreadySettled`].
#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Storage error. {0}")]
    StorageError(#[from] StoreError),
    #[error("The requested order {0} does not exist")]
    NotFound(OrderId),
    #[error("There is no channel bound to counterparty '{0}'")]
    UnknownCounterparty(String),
    #[error("Channel {channel} on port {port} is not established")]
    ChannelNotEstablished { port: String, channel: String },
    #[error("Malformed correlation id: '{0}'")]
    MalformedCorrelationId(String),
    #[error("Malformed oracle result. {0}")]
    MalformedResult(String),
    #[error("The oracle quoted a price of zero")]
    InvalidPrice,
    #[error("Account {address} has insufficient funds. {required} is required, but only {available} is available")]
    InsufficientFunds { address: Address, required: Coin, available: u128 },
    #[error("Crediting {amount} to {address} would overflow the balance")]
    BalanceOverflow { address: Address, amount: Coin },
    #[error("Transport error. {0}")]
    TransportError(#[from] TransportError),
    #[error("Invalid message. {0}")]
    InvalidMessage(String),
    #[error("Cannot interpret packet data. {0}")]
    UnknownPacket(String),
    #[error("Invalid configuration. {0}")]
    ConfigurationError(String),
}
