use std::{
    fmt::Display,
    str::FromStr,
    sync::OnceLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Same character set the cosmos bank module accepts for denominations.
const DENOM_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9/:._-]{2,127}$";
const COIN_PATTERN: &str = r"^([0-9]+)([a-zA-Z][a-zA-Z0-9/:._-]{2,127})$";

fn denom_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DENOM_PATTERN).expect("denomination pattern is a valid regex"))
}

fn coin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COIN_PATTERN).expect("coin pattern is a valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("Invalid denomination: {0}")]
    InvalidDenom(String),
    #[error("Cannot parse '{0}' as a coin amount")]
    InvalidCoin(String),
    #[error("Denomination {0} appears more than once")]
    DuplicateDenom(String),
    #[error("Coin amounts must be positive. Got zero {0}")]
    ZeroAmount(String),
}

pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    if denom_regex().is_match(denom) {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_string()))
    }
}

//--------------------------------------        Coin         ---------------------------------------------------------
/// A quantity of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new<S: Into<String>>(amount: u128, denom: S) -> Self {
        Self { denom: denom.into(), amount }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = coin_regex().captures(s).ok_or_else(|| CoinError::InvalidCoin(s.to_string()))?;
        let amount = caps[1].parse::<u128>().map_err(|_| CoinError::InvalidCoin(s.to_string()))?;
        Ok(Self::new(amount, &caps[2]))
    }
}

//--------------------------------------        Coins        ---------------------------------------------------------
/// A multi-denomination amount.
///
/// Entries keep the order they were given in. Some consumers (notably settlement) only look at the first entry, so
/// the ordering is significant and is never normalised.
///
/// Deserialization goes through [`Coins::new`], so a decoded amount is as valid as a parsed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Builds a validated amount: every denomination must be well-formed, unique and carry a non-zero amount.
    pub fn new(coins: Vec<Coin>) -> Result<Self, CoinError> {
        for (i, coin) in coins.iter().enumerate() {
            validate_denom(&coin.denom)?;
            if coin.is_zero() {
                return Err(CoinError::ZeroAmount(coin.denom.clone()));
            }
            if coins[..i].iter().any(|c| c.denom == coin.denom) {
                return Err(CoinError::DuplicateDenom(coin.denom.clone()));
            }
        }
        Ok(Self(coins))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first listed denomination, if any.
    pub fn first(&self) -> Option<&Coin> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0.iter().find(|c| c.denom == denom).map(|c| c.amount).unwrap_or(0)
    }

    pub fn into_inner(self) -> Vec<Coin> {
        self.0
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Self::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl TryFrom<Coin> for Coins {
    type Error = CoinError;

    fn try_from(coin: Coin) -> Result<Self, Self::Error> {
        Self::new(vec![coin])
    }
}

impl Display for Coins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");
        write!(f, "{s}")
    }
}

impl FromStr for Coins {
    type Err = CoinError;

    /// Parses a comma-separated list such as `5000000stake,10gold`. The empty string is the empty amount.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        let coins = s.split(',').map(Coin::from_str).collect::<Result<Vec<_>, _>>()?;
        Self::new(coins)
    }
}
