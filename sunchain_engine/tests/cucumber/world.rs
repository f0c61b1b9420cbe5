use cucumber::World;
use log::*;
use sunchain_engine::{
    events::EventProducers,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    OrderFlowApi,
    SettlementConfig,
    SettlementError,
    SettlementOutcome,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct SettlementWorld {
    pub system: Option<SettlementSystem>,
    pub last_outcome: Option<SettlementOutcome>,
    pub last_error: Option<SettlementError>,
}

#[derive(Debug)]
pub struct SettlementSystem {
    pub db_path: String,
    pub api: OrderFlowApi<SqliteDatabase>,
}

impl SettlementWorld {
    pub fn api(&self) -> &OrderFlowApi<SqliteDatabase> {
        &self.system.as_ref().expect("OrderFlowApi not initialised").api
    }

    pub fn record<T>(&mut self, result: Result<T, SettlementError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Operation failed: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}

impl SettlementSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {url}");
        let api = OrderFlowApi::new(db, SettlementConfig::default(), EventProducers::default())
            .expect("Default configuration is valid");
        Self { db_path: url, api }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}

/// The variant name of an error, as the feature files refer to it.
pub fn error_kind(e: &SettlementError) -> &'static str {
    match e {
        SettlementError::StorageError(_) => "StorageError",
        SettlementError::NotFound(_) => "NotFound",
        SettlementError::UnknownCounterparty(_) => "UnknownCounterparty",
        SettlementError::ChannelNotEstablished { .. } => "ChannelNotEstablished",
        SettlementError::MalformedCorrelationId(_) => "MalformedCorrelationId",
        SettlementError::MalformedResult(_) => "MalformedResult",
        SettlementError::InvalidPrice => "InvalidPrice",
        SettlementError::InsufficientFunds { .. } => "InsufficientFunds",
        SettlementError::BalanceOverflow { .. } => "BalanceOverflow",
        SettlementError::TransportError(_) => "TransportError",
        SettlementError::InvalidMessage(_) => "InvalidMessage",
        SettlementError::UnknownPacket(_) => "UnknownPacket",
        SettlementError::ConfigurationError(_) => "ConfigurationError",
    }
}
