use std::{env, fmt::Display, str::FromStr};

use log::*;
use sunchain_common::{
    helpers::{parse_env, EnvValue},
    validate_denom,
};

use crate::SettlementError;

pub const DEFAULT_ORACLE_COUNTERPARTY: &str = "bandchain";
pub const DEFAULT_ORACLE_SCRIPT_ID: u64 = 3;
pub const DEFAULT_ORACLE_ASK_COUNT: u64 = 1;
pub const DEFAULT_ORACLE_MIN_COUNT: u64 = 1;
pub const DEFAULT_PRICE_MULTIPLIER: u64 = 1_000_000;
pub const DEFAULT_PACKET_TIMEOUT: u64 = 1_000_000_000;
pub const DEFAULT_FILL_DENOM: &str = "gold";
pub const DEFAULT_MODULE_NAME: &str = "sunchain";

/// Everything the settlement flow needs to know about the oracle it talks to and the asset it pays out in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// The name of the oracle chain. Requests go out over the channel bound to this name.
    pub oracle_counterparty: String,
    pub oracle_script_id: u64,
    /// How many oracle validators are asked for a price
    pub ask_count: u64,
    /// How many of them must answer
    pub min_count: u64,
    /// Sent as the script's call data. The quoted price is scaled by it.
    pub price_multiplier: u64,
    pub packet_timeout: u64,
    /// The denomination fills are paid out in
    pub fill_denom: String,
    /// Owns the escrow account
    pub module_name: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            oracle_counterparty: DEFAULT_ORACLE_COUNTERPARTY.to_string(),
            oracle_script_id: DEFAULT_ORACLE_SCRIPT_ID,
            ask_count: DEFAULT_ORACLE_ASK_COUNT,
            min_count: DEFAULT_ORACLE_MIN_COUNT,
            price_multiplier: DEFAULT_PRICE_MULTIPLIER,
            packet_timeout: DEFAULT_PACKET_TIMEOUT,
            fill_denom: DEFAULT_FILL_DENOM.to_string(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

impl SettlementConfig {
    pub fn from_env_or_default() -> Self {
        let oracle_counterparty = env::var("SUN_ORACLE_COUNTERPARTY").ok().unwrap_or_else(|| {
            info!("🪛️ SUN_ORACLE_COUNTERPARTY is not set. Using the default, {DEFAULT_ORACLE_COUNTERPARTY}.");
            DEFAULT_ORACLE_COUNTERPARTY.to_string()
        });
        let oracle_script_id = env_or_default("SUN_ORACLE_SCRIPT_ID", DEFAULT_ORACLE_SCRIPT_ID);
        let ask_count = env_or_default("SUN_ORACLE_ASK_COUNT", DEFAULT_ORACLE_ASK_COUNT);
        let min_count = env_or_default("SUN_ORACLE_MIN_COUNT", DEFAULT_ORACLE_MIN_COUNT);
        let price_multiplier = env_or_default("SUN_PRICE_MULTIPLIER", DEFAULT_PRICE_MULTIPLIER);
        let packet_timeout = env_or_default("SUN_PACKET_TIMEOUT", DEFAULT_PACKET_TIMEOUT);
        let fill_denom = env::var("SUN_FILL_DENOM").ok().unwrap_or_else(|| DEFAULT_FILL_DENOM.to_string());
        let module_name = env::var("SUN_MODULE_NAME").ok().unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string());
        Self {
            oracle_counterparty,
            oracle_script_id,
            ask_count,
            min_count,
            price_multiplier,
            packet_timeout,
            fill_denom,
            module_name,
        }
    }

    /// Catches deployment mistakes before the first order goes out.
    pub fn validate(&self) -> Result<(), SettlementError> {
        let err = |msg: String| Err(SettlementError::ConfigurationError(msg));
        if self.oracle_counterparty.trim().is_empty() {
            return err("The oracle counterparty name is empty".into());
        }
        if self.min_count == 0 {
            return err("The oracle needs at least one responder (min_count is 0)".into());
        }
        if self.min_count > self.ask_count {
            return err(format!("min_count ({}) is larger than ask_count ({})", self.min_count, self.ask_count));
        }
        if self.packet_timeout == 0 {
            return err("The packet timeout must be positive".into());
        }
        if self.module_name.trim().is_empty() {
            return err("The module name is empty".into());
        }
        validate_denom(&self.fill_denom).or_else(|e| err(e.to_string()))
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match parse_env::<T>(name) {
        EnvValue::Set(v) => v,
        EnvValue::Missing => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
        EnvValue::Invalid(s, e) => {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SettlementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle_counterparty, "bandchain");
        assert_eq!(config.oracle_script_id, 3);
        assert_eq!(config.price_multiplier, 1_000_000);
        assert_eq!(config.packet_timeout, 1_000_000_000);
    }

    #[test]
    fn responder_counts_are_checked() {
        let config = SettlementConfig { min_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SettlementError::ConfigurationError(_))));
        let config = SettlementConfig { min_count: 3, ask_count: 2, ..Default::default() };
        assert!(matches!(config.validate(), Err(SettlementError::ConfigurationError(_))));
        let config = SettlementConfig { min_count: 2, ask_count: 2, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn names_are_checked() {
        let config = SettlementConfig { fill_denom: "".into(), ..Default::default() };
        assert!(config.validate().is_err());
        let config = SettlementConfig { oracle_counterparty: " ".into(), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_from_environment() {
        env::set_var("SUN_ORACLE_ASK_COUNT", "4");
        env::set_var("SUN_ORACLE_MIN_COUNT", "three");
        env::set_var("SUN_FILL_DENOM", "silver");
        let config = SettlementConfig::from_env_or_default();
        env::remove_var("SUN_ORACLE_ASK_COUNT");
        env::remove_var("SUN_ORACLE_MIN_COUNT");
        env::remove_var("SUN_FILL_DENOM");
        assert_eq!(config.ask_count, 4);
        assert_eq!(config.min_count, DEFAULT_ORACLE_MIN_COUNT);
        assert_eq!(config.fill_denom, "silver");
    }
}
