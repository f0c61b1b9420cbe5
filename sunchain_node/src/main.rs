use std::{future::Future, pin::Pin, process::ExitCode};

use clap::Parser;
use dotenvy::dotenv;
use log::*;
use sunchain_engine::{
    events::{EventHandlers, EventHooks, OrderPlacedEvent, OrderSettledEvent},
    OrderFlowApi,
    SqliteDatabase,
    StoreBackend,
};
use sunchain_node::{
    cli::{display_envs, Arguments, Command},
    commands::execute,
    config::NodeConfig,
    errors::NodeError,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    if matches!(args.command, Command::Env) {
        display_envs();
        return ExitCode::SUCCESS;
    }
    let mut config = NodeConfig::from_env_or_default();
    if let Some(url) = args.database {
        config.database_url = url;
    }
    match run(config, args.command).await {
        Ok(result) => {
            println!("{result:#}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("🚀️ {e}");
            eprintln!("{:#}", e.to_json());
            ExitCode::FAILURE
        },
    }
}

async fn run(config: NodeConfig, command: Command) -> Result<serde_json::Value, NodeError> {
    config.validate()?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await?;
    db.run_migrations().await?;
    let handlers = EventHandlers::new(config.event_buffer_size, event_hooks(config.log_events));
    let mut api = OrderFlowApi::new(db, config.settlement, handlers.producers())?;
    let handles = handlers.start_handlers();
    let result = execute(command, &api).await;
    api.db_mut().close().await?;
    // the handlers finish once the api, and with it every producer, is gone
    drop(api);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!("📬️ Event handler did not shut down cleanly. {e}");
        }
    }
    result
}

fn event_hooks(log_events: bool) -> EventHooks {
    let mut hooks = EventHooks::default();
    if log_events {
        hooks.on_order_placed(|ev: OrderPlacedEvent| {
            Box::pin(async move {
                info!(
                    "📬️ Order {} placed by {}. Request sent as packet #{} to {}/{}",
                    ev.order.id,
                    ev.order.owner,
                    ev.packet.sequence,
                    ev.packet.destination_port,
                    ev.packet.destination_channel
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        hooks.on_order_settled(|ev: OrderSettledEvent| {
            Box::pin(async move {
                info!("📬️ Order {} settled at {}: {}", ev.order.id, ev.timestamp, ev.outcome);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    }
    hooks
}
