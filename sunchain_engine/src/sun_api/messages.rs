//! The messages the module accepts, and what handling them produces.
use serde::{Deserialize, Serialize};
use sunchain_common::{Address, Coins};

use crate::{db_types::OrderId, transport::Packet, SettlementError, SettlementOutcome};

/// Buy the fill asset with the escrowed `amount`. The price is whatever the oracle says it is when it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBuySun {
    pub buyer: Address,
    pub amount: Coins,
}

impl MsgBuySun {
    pub fn new(buyer: Address, amount: Coins) -> Self {
        Self { buyer, amount }
    }

    pub fn validate_basic(&self) -> Result<(), SettlementError> {
        if self.buyer.is_empty() {
            return Err(SettlementError::InvalidMessage("The buyer address is empty".into()));
        }
        if self.amount.is_empty() {
            return Err(SettlementError::InvalidMessage("The buy amount is empty".into()));
        }
        self.buyer.validate().map_err(|e| SettlementError::InvalidMessage(e.to_string()))?;
        Ok(())
    }
}

/// Bind a counterparty chain name to the local end of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSetSourceChannel {
    pub chain_name: String,
    pub source_port: String,
    pub source_channel: String,
    pub signer: Address,
}

impl MsgSetSourceChannel {
    pub fn new(chain_name: &str, source_port: &str, source_channel: &str, signer: Address) -> Self {
        Self {
            chain_name: chain_name.to_string(),
            source_port: source_port.to_string(),
            source_channel: source_channel.to_string(),
            signer,
        }
    }

    pub fn validate_basic(&self) -> Result<(), SettlementError> {
        let missing = [
            ("chain name", self.chain_name.is_empty()),
            ("source port", self.source_port.is_empty()),
            ("source channel", self.source_channel.is_empty()),
            ("signer", self.signer.is_empty()),
        ];
        if let Some((field, _)) = missing.iter().find(|(_, empty)| *empty) {
            return Err(SettlementError::InvalidMessage(format!("The {field} is empty")));
        }
        self.signer.validate().map_err(|e| SettlementError::InvalidMessage(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Msg {
    BuySun(MsgBuySun),
    SetSourceChannel(MsgSetSourceChannel),
    /// An inbound packet, relayed from another chain
    RecvPacket(Packet),
}

impl Msg {
    pub fn validate_basic(&self) -> Result<(), SettlementError> {
        match self {
            Msg::BuySun(msg) => msg.validate_basic(),
            Msg::SetSourceChannel(msg) => msg.validate_basic(),
            Msg::RecvPacket(packet) if packet.data.is_empty() => {
                Err(SettlementError::InvalidMessage("The packet carries no data".into()))
            },
            Msg::RecvPacket(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgResult {
    OrderPlaced(OrderId),
    ChannelBound,
    Settled { order_id: OrderId, outcome: SettlementOutcome },
}
