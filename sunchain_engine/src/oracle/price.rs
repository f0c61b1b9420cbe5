use std::{fmt::Display, num::NonZeroU64};

use crate::SettlementError;

/// The oracle script returns its result as a single big-endian `u64`.
pub const PRICE_RESULT_LEN: usize = 8;

/// A quoted price. It is never zero, so dividing by it is always safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(NonZeroU64);

impl Price {
    pub fn new(px: u64) -> Option<Self> {
        NonZeroU64::new(px).map(Self)
    }

    pub fn value(&self) -> u64 {
        self.0.get()
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decodes the raw oracle result into a [`Price`].
///
/// Anything other than exactly [`PRICE_RESULT_LEN`] bytes is a `MalformedResult`; a zero price is `InvalidPrice`.
pub fn decode_price(raw: &[u8]) -> Result<Price, SettlementError> {
    let bytes: [u8; PRICE_RESULT_LEN] = raw.try_into().map_err(|_| {
        SettlementError::MalformedResult(format!("Expected {PRICE_RESULT_LEN} bytes of result, got {}", raw.len()))
    })?;
    Price::new(u64::from_be_bytes(bytes)).ok_or(SettlementError::InvalidPrice)
}
