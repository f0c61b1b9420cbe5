//! Executes a single CLI command against the settlement API and renders the result as JSON.
use log::*;
use serde_json::{json, Value};
use sunchain_engine::{
    db_types::OrderId,
    oracle::OracleResponse,
    transport::Packet,
    Msg,
    MsgBuySun,
    MsgResult,
    MsgSetSourceChannel,
    OrderFlowApi,
    SettlementError,
    StoreBackend,
};

use crate::{
    cli::{ChannelEndParams, Command, RelayResponseParams},
    errors::NodeError,
};

pub async fn execute<B: StoreBackend>(command: Command, api: &OrderFlowApi<B>) -> Result<Value, NodeError> {
    match command {
        Command::Mint { address, amount } => {
            api.mint(&address, &amount).await?;
            let balance = api.balance(&address, &amount.denom).await?;
            Ok(json!({ "address": address, "denom": amount.denom, "balance": balance.to_string() }))
        },
        Command::OpenChannel(ChannelEndParams { port, channel, counterparty_port, counterparty_channel }) => {
            api.open_channel(&port, &channel, &counterparty_port, &counterparty_channel).await?;
            Ok(json!({
                "port": port,
                "channel": channel,
                "counterparty_port": counterparty_port,
                "counterparty_channel": counterparty_channel,
            }))
        },
        Command::BindChannel { chain_name, port, channel, signer } => {
            let msg = Msg::SetSourceChannel(MsgSetSourceChannel::new(&chain_name, &port, &channel, signer));
            let result = api.handle_msg(msg).await?;
            Ok(serde_json::to_value(result)?)
        },
        Command::Buy { buyer, amount, via: None } => {
            let result = api.handle_msg(Msg::BuySun(MsgBuySun::new(buyer, amount))).await?;
            Ok(serde_json::to_value(result)?)
        },
        Command::Buy { buyer, amount, via: Some(counterparty) } => {
            let order_id = api.place_order(&buyer, &amount, &counterparty).await?;
            Ok(serde_json::to_value(MsgResult::OrderPlaced(order_id))?)
        },
        Command::RelayResponse(params) => {
            let packet = response_packet(params, api).await?;
            let result = api.handle_msg(Msg::RecvPacket(packet)).await?;
            Ok(serde_json::to_value(result)?)
        },
        Command::Order { id } => {
            let order = api.fetch_order(OrderId(id)).await?;
            let order = order.ok_or_else(|| NodeError::NoRecordFound(format!("Order {}", OrderId(id))))?;
            Ok(serde_json::to_value(order)?)
        },
        Command::Orders { owner: Some(owner) } => Ok(serde_json::to_value(api.orders_for_owner(&owner).await?)?),
        Command::Orders { owner: None } => Ok(serde_json::to_value(api.fetch_orders().await?)?),
        Command::Balance { address, denom: Some(denom) } => {
            let balance = api.balance(&address, &denom).await?;
            Ok(json!({ "address": address, "denom": denom, "balance": balance.to_string() }))
        },
        Command::Balance { address, denom: None } => {
            let balances = serde_json::to_value(api.balances(&address).await?)?;
            Ok(json!({ "address": address, "balances": balances }))
        },
        Command::Outbox { port, channel } => Ok(serde_json::to_value(api.packet_commitments(&port, &channel).await?)?),
        Command::Bindings => Ok(serde_json::to_value(api.fetch_bindings().await?)?),
        Command::Env => Err(NodeError::InitializeError("The env command does not use the store".into())),
    }
}

/// Wraps an oracle response in the packet a relayer would deliver on `(port, channel)`.
async fn response_packet<B: StoreBackend>(
    params: RelayResponseParams,
    api: &OrderFlowApi<B>,
) -> Result<Packet, NodeError> {
    let RelayResponseParams { client_id, price, raw, port, channel, sequence } = params;
    let end = api
        .channel_end(&port, &channel)
        .await?
        .ok_or_else(|| SettlementError::ChannelNotEstablished { port: port.clone(), channel: channel.clone() })?;
    let mut response = OracleResponse::success(&client_id, price.unwrap_or_default());
    if let Some(raw) = raw {
        response.result = raw;
    }
    let data = response.to_bytes()?;
    debug!("🔄️📥️ Relaying response for {client_id} from {}/{}", end.counterparty_port, end.counterparty_channel);
    Ok(Packet {
        sequence,
        source_port: end.counterparty_port,
        source_channel: end.counterparty_channel,
        destination_port: port,
        destination_channel: channel,
        data,
        timeout_height: api.config().packet_timeout,
    })
}
