//! Key layout of the module store.
//!
//! | Key                                                      | Value                         |
//! |----------------------------------------------------------|-------------------------------|
//! | `order_count`                                            | big-endian u64                |
//! | `order/{order_id}`                                       | JSON [`crate::db_types::Order`] |
//! | `channel/{counterparty}`                                 | JSON [`crate::db_types::ChannelBinding`] |
//! | `balance/{address}/{denom}`                              | big-endian u128               |
//! | `ibc/channelEnds/ports/{port}/channels/{channel}`        | JSON channel end              |
//! | `ibc/nextSequenceSend/ports/{port}/channels/{channel}`   | big-endian u64                |
//! | `ibc/commitments/ports/{port}/channels/{channel}/sequences/{seq}` | JSON packet          |
use crate::db::traits::StoreError;

pub const ORDER_COUNT_KEY: &str = "order_count";
pub const ORDER_PREFIX: &str = "order/";
pub const CHANNEL_PREFIX: &str = "channel/";
pub const BALANCE_PREFIX: &str = "balance/";

pub fn order_key(order_id: u64) -> String {
    format!("{ORDER_PREFIX}{order_id}")
}

pub fn channel_binding_key(counterparty: &str) -> String {
    format!("{CHANNEL_PREFIX}{counterparty}")
}

pub fn balance_prefix(address: &str) -> String {
    format!("{BALANCE_PREFIX}{address}/")
}

pub fn balance_key(address: &str, denom: &str) -> String {
    format!("{}{denom}", balance_prefix(address))
}

pub fn channel_end_key(port: &str, channel: &str) -> String {
    format!("ibc/channelEnds/ports/{port}/channels/{channel}")
}

pub fn next_sequence_send_key(port: &str, channel: &str) -> String {
    format!("ibc/nextSequenceSend/ports/{port}/channels/{channel}")
}

pub fn packet_commitment_prefix(port: &str, channel: &str) -> String {
    format!("ibc/commitments/ports/{port}/channels/{channel}/sequences/")
}

pub fn packet_commitment_key(port: &str, channel: &str, sequence: u64) -> String {
    format!("{}{sequence}", packet_commitment_prefix(port, channel))
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn decode_u64(key: &str, bytes: &[u8]) -> Result<u64, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::corrupt(key, format!("expected 8 bytes, found {}", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

pub fn encode_u128(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn decode_u128(key: &str, bytes: &[u8]) -> Result<u128, StoreError> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| StoreError::corrupt(key, format!("expected 16 bytes, found {}", bytes.len())))?;
    Ok(u128::from_be_bytes(raw))
}
