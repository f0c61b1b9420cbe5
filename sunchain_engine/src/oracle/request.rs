use serde::{Deserialize, Serialize};

use crate::{db_types::OrderId, oracle::CorrelationId};

/// The call data for the price script: the multiplier the quoted price is scaled by, as a little-endian `u64`.
pub fn multiplier_calldata(multiplier: u64) -> Vec<u8> {
    multiplier.to_le_bytes().to_vec()
}

/// A price request, as it is sent to the oracle chain.
///
/// The field names on the wire are the oracle's: `client_id`, `oracle_script_id`, `calldata` (hex), `ask_count` and
/// `min_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    #[serde(rename = "client_id")]
    pub correlation_id: String,
    #[serde(rename = "oracle_script_id")]
    pub script_id: u64,
    #[serde(rename = "calldata", with = "hex::serde")]
    pub call_data: Vec<u8>,
    #[serde(rename = "ask_count")]
    pub ask_responders: u64,
    #[serde(rename = "min_count")]
    pub min_responders: u64,
}

impl OracleRequest {
    /// Builds the request for `order_id`.
    ///
    /// Responder counts are taken as given. Keeping `1 <= min_count <= ask_count` is the job of the configuration
    /// (see [`crate::SettlementConfig::validate`]).
    pub fn build(order_id: OrderId, script_id: u64, call_data: &[u8], ask_count: u64, min_count: u64) -> Self {
        Self {
            correlation_id: CorrelationId::new(order_id).to_string(),
            script_id,
            call_data: call_data.to_vec(),
            ask_responders: ask_count,
            min_responders: min_count,
        }
    }

    /// The packet payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
