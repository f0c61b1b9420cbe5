use serde::{Deserialize, Serialize};

use crate::{
    db_types::OrderId,
    oracle::{correlate, decode_price, Price},
    SettlementError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveStatus {
    Open,
    Success,
    Failure,
    Expired,
}

/// A response packet from the oracle chain.
///
/// Only `client_id`, `resolve_status` and `result` matter for settlement. The rest is kept for the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    #[serde(rename = "client_id")]
    pub correlation_id: String,
    #[serde(default)]
    pub request_id: u64,
    #[serde(default)]
    pub ans_count: u64,
    #[serde(default)]
    pub request_time: i64,
    #[serde(default)]
    pub resolve_time: i64,
    pub resolve_status: ResolveStatus,
    /// The hex-encoded script output
    pub result: String,
}

impl OracleResponse {
    /// A successful response carrying `px` as its result. Used by relayers and tests to fabricate responses.
    pub fn success(correlation_id: &str, px: u64) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            request_id: 0,
            ans_count: 1,
            request_time: 0,
            resolve_time: 0,
            resolve_status: ResolveStatus::Success,
            result: hex::encode(px.to_be_bytes()),
        }
    }

    /// Interprets inbound packet data as an oracle response. Anything else is an `UnknownPacket`.
    pub fn from_packet_data(data: &[u8]) -> Result<Self, SettlementError> {
        serde_json::from_slice(data)
            .map_err(|e| SettlementError::UnknownPacket(format!("Cannot unmarshal oracle packet data. {e}")))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// The order this response answers.
    pub fn order_id(&self) -> Result<OrderId, SettlementError> {
        correlate(&self.correlation_id)
    }

    /// The quoted price. Only successful resolutions carry one.
    pub fn price(&self) -> Result<Price, SettlementError> {
        if self.resolve_status != ResolveStatus::Success {
            return Err(SettlementError::MalformedResult(format!(
                "Oracle request {} resolved with status {:?}",
                self.request_id, self.resolve_status
            )));
        }
        let raw = hex::decode(&self.result)
            .map_err(|e| SettlementError::MalformedResult(format!("Result is not valid hex. {e}")))?;
        decode_price(&raw)
    }
}
