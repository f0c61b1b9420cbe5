use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sunchain_common::{Address, Coin, Coins};
use thiserror::Error;

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and its oracle request dispatched. We are waiting for the price response.
    Pending,
    /// The oracle response was processed and a non-zero fill was credited to the owner.
    Active,
    /// The oracle response was processed, the fill rounded down to zero and the escrow was refunded in full.
    Completed,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Active => write!(f, "Active"),
            OrderStatusType::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// The account that placed the order and that receives the settlement proceeds
    pub owner: Address,
    /// The funds moved into escrow when the order was placed. Never changes after creation.
    pub escrowed_amount: Coins,
    /// The amount credited to the owner when the order settled with a non-zero fill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_amount: Option<Coin>,
    pub status: OrderStatusType,
}

impl Order {
    pub fn new_pending(id: OrderId, owner: Address, escrowed_amount: Coins) -> Self {
        Self { id, owner, escrowed_amount, filled_amount: None, status: OrderStatusType::Pending }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatusType::Pending
    }
}

//--------------------------------------    ChannelBinding     ---------------------------------------------------------
/// The local end of a channel that has been negotiated with a named counterparty chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    pub counterparty_name: String,
    pub port: String,
    pub channel: String,
}

impl ChannelBinding {
    pub fn new<S: Into<String>>(counterparty_name: S, port: S, channel: S) -> Self {
        Self { counterparty_name: counterparty_name.into(), port: port.into(), channel: channel.into() }
    }
}

impl Display for ChannelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}/{}", self.counterparty_name, self.port, self.channel)
    }
}
