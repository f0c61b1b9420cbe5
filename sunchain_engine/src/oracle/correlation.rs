use std::{fmt::Display, str::FromStr};

use crate::{db_types::OrderId, SettlementError};

/// The tag every correlation id issued by this module carries.
pub const CORRELATION_NAMESPACE: &str = "Order";

/// The `namespace:id` key that ties an oracle response back to the order that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(OrderId);

impl CorrelationId {
    pub fn new(order_id: OrderId) -> Self {
        Self(order_id)
    }

    pub fn order_id(&self) -> OrderId {
        self.0
    }
}

impl From<OrderId> for CorrelationId {
    fn from(order_id: OrderId) -> Self {
        Self(order_id)
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{CORRELATION_NAMESPACE}:{}", self.0.value())
    }
}

impl FromStr for CorrelationId {
    type Err = SettlementError;

    /// Accepts exactly `Order:{decimal}`. Signs, whitespace, extra segments and foreign namespaces are all rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SettlementError::MalformedCorrelationId(s.to_string());
        let segments = s.split(':').collect::<Vec<_>>();
        let [namespace, id] = segments.as_slice() else {
            return Err(malformed());
        };
        if *namespace != CORRELATION_NAMESPACE || id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let id = id.parse::<u64>().map_err(|_| malformed())?;
        Ok(Self(OrderId(id)))
    }
}

/// Maps a correlation id back to an order id. Whether that order exists is for the order ledger to say.
pub fn correlate(correlation_id: &str) -> Result<OrderId, SettlementError> {
    correlation_id.parse::<CorrelationId>().map(|c| c.order_id())
}
