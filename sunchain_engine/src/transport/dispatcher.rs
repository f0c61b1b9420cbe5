use log::*;

use crate::{
    db::traits::KeyValueStore,
    ledger::channels::get_binding,
    oracle::OracleRequest,
    transport::{ChannelTransport, Packet, TransportError},
    SettlementError,
};

/// Sends `request` to the chain bound to `counterparty_name` and returns the packet that was sent.
///
/// The binding comes from the channel registry; the remote end and the sequence number come from the transport. No
/// attempt is retried, and every failure is meant to abort the caller's unit of work.
pub async fn dispatch<S, T>(
    request: &OracleRequest,
    counterparty_name: &str,
    timeout_height: u64,
    transport: &T,
    store: &mut S,
) -> Result<Packet, SettlementError>
where
    S: KeyValueStore,
    T: ChannelTransport,
{
    let (port, channel) = get_binding(counterparty_name, store).await?;
    let not_established = || SettlementError::ChannelNotEstablished { port: port.clone(), channel: channel.clone() };
    let (destination_port, destination_channel) =
        transport.resolve_counterparty(&port, &channel, store).await?.ok_or_else(not_established)?;
    let sequence = transport.next_outbound_sequence(&port, &channel, store).await?.ok_or_else(not_established)?;
    let data = request.to_bytes().map_err(|e| TransportError::Serialization(e.to_string()))?;
    let packet = Packet {
        sequence,
        source_port: port.clone(),
        source_channel: channel.clone(),
        destination_port,
        destination_channel,
        data,
        timeout_height,
    };
    transport.send(&packet, store).await?;
    debug!(
        "🔄️📤️ Oracle request {} sent to {counterparty_name} over {port}/{channel} as packet #{sequence}",
        request.correlation_id
    );
    Ok(packet)
}
