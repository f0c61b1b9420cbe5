use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{db_types::Order, oracle::OracleRequest, transport::Packet, SettlementOutcome};

/// Emitted once an order has been created, its funds escrowed and its oracle request sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
    pub request: OracleRequest,
    /// The packet that carried the request
    pub packet: Packet,
}

impl OrderPlacedEvent {
    pub fn new(order: Order, request: OracleRequest, packet: Packet) -> Self {
        Self { order, request, packet }
    }
}

/// Emitted when an oracle response moved an order out of `Pending`. Duplicate responses do not produce this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSettledEvent {
    pub order: Order,
    pub outcome: SettlementOutcome,
    pub timestamp: DateTime<Utc>,
}

impl OrderSettledEvent {
    pub fn new(order: Order, outcome: SettlementOutcome) -> Self {
        Self { order, outcome, timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPlaced(OrderPlacedEvent),
    OrderSettled(OrderSettledEvent),
}
