use serde_json::json;
use sunchain_engine::{SettlementError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Could not initialize the node. {0}")]
    InitializeError(String),
    #[error("An error occurred in the store. {0}")]
    BackendError(#[from] StoreError),
    #[error("{0}")]
    SettlementError(#[from] SettlementError),
    #[error("Invalid node configuration. {0}")]
    ConfigurationError(String),
    #[error("Could not serialize the result. {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl NodeError {
    /// A short, stable name for the failure, for scripts that consume the node's output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitializeError(_) => "InitializeError",
            Self::BackendError(_) => "StorageError",
            Self::SettlementError(e) => settlement_error_kind(e),
            Self::ConfigurationError(_) => "ConfigurationError",
            Self::SerializationError(_) => "SerializationError",
            Self::NoRecordFound(_) => "NotFound",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({ "error": self.kind(), "message": self.to_string() })
    }
}

fn settlement_error_kind(e: &SettlementError) -> &'static str {
    match e {
        SettlementError::StorageError(_) => "StorageError",
        SettlementError::NotFound(_) => "NotFound",
        SettlementError::UnknownCounterparty(_) => "UnknownCounterparty",
        SettlementError::ChannelNotEstablished { .. } => "ChannelNotEstablished",
        SettlementError::MalformedCorrelationId(_) => "MalformedCorrelationId",
        SettlementError::MalformedResult(_) => "MalformedResult",
        SettlementError::InvalidPrice => "InvalidPrice",
        SettlementError::InsufficientFunds { .. } => "InsufficientFunds",
        SettlementError::BalanceOverflow { .. } => "BalanceOverflow",
        SettlementError::TransportError(_) => "TransportError",
        SettlementError::InvalidMessage(_) => "InvalidMessage",
        SettlementError::UnknownPacket(_) => "UnknownPacket",
        SettlementError::ConfigurationError(_) => "ConfigurationError",
    }
}
