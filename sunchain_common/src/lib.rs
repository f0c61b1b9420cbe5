//! Value types shared by the sunchain settlement crates: account addresses, coin amounts and a few configuration
//! helpers.
mod address;
mod coin;

pub mod helpers;

pub use address::{Address, AddressParseError};
pub use coin::{validate_denom, Coin, CoinError, Coins};
