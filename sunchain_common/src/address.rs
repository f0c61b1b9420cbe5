use std::{fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]{1,90}$").expect("address pattern is a valid regex"))
}

#[derive(Debug, Clone, Error)]
#[error("Invalid account address: '{0}'")]
pub struct AddressParseError(String);

//--------------------------------------       Address       ---------------------------------------------------------
/// A lightweight wrapper around the string form of an account address.
///
/// `From` conversions are unchecked so that records read back from storage are taken as-is (the empty address is
/// a legitimate "not set" value). Use [`FromStr`] to validate user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks an address that arrived through an unchecked conversion, such as deserialization.
    ///
    /// Balances are keyed by `{address}/{denom}` and denominations may contain `/`, so an address must never contain
    /// one.
    pub fn validate(&self) -> Result<(), AddressParseError> {
        if address_regex().is_match(&self.0) {
            Ok(())
        } else {
            Err(AddressParseError(self.0.clone()))
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Self(s.to_string());
        address.validate()?;
        Ok(address)
    }
}
