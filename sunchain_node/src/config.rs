use std::env;

use log::*;
use sunchain_common::helpers::{parse_boolean_flag, parse_env, EnvValue};
use sunchain_engine::SettlementConfig;

use crate::errors::NodeError;

const DEFAULT_SUN_DATABASE_URL: &str = "sqlite://data/sunchain_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How many unhandled events may queue up before publishers wait
    pub event_buffer_size: usize,
    /// Log every order placed and settled event
    pub log_events: bool,
    pub settlement: SettlementConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_SUN_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            event_buffer_size: 25,
            log_events: true,
            settlement: SettlementConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("SUN_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SUN_DATABASE_URL is not set. Using the default, {DEFAULT_SUN_DATABASE_URL}.");
            DEFAULT_SUN_DATABASE_URL.to_string()
        });
        let max_connections = match parse_env::<u32>("SUN_DB_MAX_CONNECTIONS") {
            EnvValue::Set(n) => n,
            EnvValue::Missing => DEFAULT_MAX_CONNECTIONS,
            EnvValue::Invalid(s, e) => {
                error!(
                    "🪛️ {s} is not a valid value for SUN_DB_MAX_CONNECTIONS. {e} Using the default, \
                     {DEFAULT_MAX_CONNECTIONS}, instead."
                );
                DEFAULT_MAX_CONNECTIONS
            },
        };
        let log_events = parse_boolean_flag(env::var("SUN_LOG_EVENTS").ok(), true);
        let settlement = SettlementConfig::from_env_or_default();
        Self { database_url, max_connections, log_events, settlement, ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.database_url.trim().is_empty() {
            return Err(NodeError::ConfigurationError("SUN_DATABASE_URL is empty".into()));
        }
        if self.max_connections == 0 {
            return Err(NodeError::ConfigurationError("SUN_DB_MAX_CONNECTIONS must be positive".into()));
        }
        self.settlement.validate()?;
        Ok(())
    }
}
