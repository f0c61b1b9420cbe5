use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        keys::{
            channel_end_key,
            decode_u64,
            encode_u64,
            next_sequence_send_key,
            packet_commitment_key,
            packet_commitment_prefix,
        },
        traits::{KeyValueStore, StoreError},
    },
    transport::{ChannelTransport, Packet, TransportError},
};

/// The local view of an open channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEnd {
    pub counterparty_port: String,
    pub counterparty_channel: String,
}

/// A [`ChannelTransport`] that keeps channel ends, send sequences and outbound packet commitments in the module
/// store.
///
/// Sent packets are not delivered anywhere. They stay committed under `ibc/commitments/...` until a relayer picks
/// them up, which is all a chain does with an outbound packet anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreTransport;

impl StoreTransport {
    pub fn new() -> Self {
        Self
    }

    /// Records the outcome of a channel handshake: `(port, channel)` now leads to
    /// `(counterparty_port, counterparty_channel)` and the next packet sent on it gets sequence 1.
    ///
    /// Re-opening an existing channel replaces its counterparty but keeps its sequence.
    pub async fn open_channel<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        counterparty_port: &str,
        counterparty_channel: &str,
        store: &mut S,
    ) -> Result<(), TransportError> {
        let end = ChannelEnd {
            counterparty_port: counterparty_port.to_string(),
            counterparty_channel: counterparty_channel.to_string(),
        };
        let key = channel_end_key(port, channel);
        let value = serde_json::to_vec(&end).map_err(|e| TransportError::Serialization(e.to_string()))?;
        store.set(&key, value).await?;
        let seq_key = next_sequence_send_key(port, channel);
        if !store.has(&seq_key).await? {
            store.set(&seq_key, encode_u64(1)).await?;
        }
        info!("🗃️ Channel {port}/{channel} is open to {counterparty_port}/{counterparty_channel}");
        Ok(())
    }

    pub async fn fetch_channel_end<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Option<ChannelEnd>, TransportError> {
        let key = channel_end_key(port, channel);
        match store.get(&key).await? {
            Some(bytes) => {
                let end = serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&key, e))?;
                Ok(Some(end))
            },
            None => Ok(None),
        }
    }

    /// Every packet sent on `(port, channel)` and not yet cleared, in sequence order.
    pub async fn packet_commitments<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Vec<Packet>, TransportError> {
        let mut packets = store
            .iterate(&packet_commitment_prefix(port, channel))
            .await?
            .into_iter()
            .map(|(key, bytes)| serde_json::from_slice::<Packet>(&bytes).map_err(|e| StoreError::corrupt(key, e)))
            .collect::<Result<Vec<_>, _>>()?;
        packets.sort_by_key(|p| p.sequence);
        Ok(packets)
    }
}

impl ChannelTransport for StoreTransport {
    async fn next_outbound_sequence<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Option<u64>, TransportError> {
        let key = next_sequence_send_key(port, channel);
        let seq = match store.get(&key).await? {
            Some(bytes) => Some(decode_u64(&key, &bytes)?),
            None => None,
        };
        Ok(seq)
    }

    async fn resolve_counterparty<S: KeyValueStore>(
        &self,
        port: &str,
        channel: &str,
        store: &mut S,
    ) -> Result<Option<(String, String)>, TransportError> {
        let end = self.fetch_channel_end(port, channel, store).await?;
        Ok(end.map(|e| (e.counterparty_port, e.counterparty_channel)))
    }

    async fn send<S: KeyValueStore>(&self, packet: &Packet, store: &mut S) -> Result<(), TransportError> {
        let (port, channel) = (packet.source_port.as_str(), packet.source_channel.as_str());
        let not_found = || TransportError::ChannelNotFound { port: port.to_string(), channel: channel.to_string() };
        let end = self.fetch_channel_end(port, channel, store).await?.ok_or_else(not_found)?;
        if end.counterparty_port != packet.destination_port || end.counterparty_channel != packet.destination_channel {
            return Err(TransportError::Rejected(format!(
                "Channel {port}/{channel} leads to {}/{}, not {}/{}",
                end.counterparty_port, end.counterparty_channel, packet.destination_port, packet.destination_channel
            )));
        }
        if packet.timeout_height == 0 {
            return Err(TransportError::Rejected("Packet has no timeout".to_string()));
        }
        let expected = self.next_outbound_sequence(port, channel, store).await?.ok_or_else(not_found)?;
        if packet.sequence != expected {
            return Err(TransportError::SequenceMismatch { expected, actual: packet.sequence });
        }
        let commitment = serde_json::to_vec(packet).map_err(|e| TransportError::Serialization(e.to_string()))?;
        store.set(&packet_commitment_key(port, channel, packet.sequence), commitment).await?;
        store.set(&next_sequence_send_key(port, channel), encode_u64(expected + 1)).await?;
        debug!("🗃️ Packet #{} committed on {port}/{channel}", packet.sequence);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::{memory::MemoryDatabase, traits::StoreBackend};

    fn packet(sequence: u64) -> Packet {
        Packet {
            sequence,
            source_port: "sunchain".into(),
            source_channel: "channel-0".into(),
            destination_port: "oracle".into(),
            destination_channel: "channel-9".into(),
            data: b"{}".to_vec(),
            timeout_height: 1_000,
        }
    }

    #[tokio::test]
    async fn send_commits_packet_and_advances_sequence() {
        let db = MemoryDatabase::new();
        let transport = StoreTransport::new();
        let mut tx = db.begin().await.unwrap();
        assert_eq!(transport.next_outbound_sequence("sunchain", "channel-0", &mut tx).await.unwrap(), None);
        transport.open_channel("sunchain", "channel-0", "oracle", "channel-9", &mut tx).await.unwrap();
        assert_eq!(transport.next_outbound_sequence("sunchain", "channel-0", &mut tx).await.unwrap(), Some(1));
        let remote = transport.resolve_counterparty("sunchain", "channel-0", &mut tx).await.unwrap();
        assert_eq!(remote, Some(("oracle".to_string(), "channel-9".to_string())));

        transport.send(&packet(1), &mut tx).await.unwrap();
        transport.send(&packet(2), &mut tx).await.unwrap();
        assert_eq!(transport.next_outbound_sequence("sunchain", "channel-0", &mut tx).await.unwrap(), Some(3));
        let sent = transport.packet_commitments("sunchain", "channel-0", &mut tx).await.unwrap();
        assert_eq!(sent, vec![packet(1), packet(2)]);
    }

    #[tokio::test]
    async fn send_rejects_bad_packets() {
        let db = MemoryDatabase::new();
        let transport = StoreTransport::new();
        let mut tx = db.begin().await.unwrap();
        let err = transport.send(&packet(1), &mut tx).await.unwrap_err();
        assert!(matches!(err, TransportError::ChannelNotFound { .. }));

        transport.open_channel("sunchain", "channel-0", "oracle", "channel-9", &mut tx).await.unwrap();
        let err = transport.send(&packet(2), &mut tx).await.unwrap_err();
        assert!(matches!(err, TransportError::SequenceMismatch { expected: 1, actual: 2 }));

        let mut wrong_way = packet(1);
        wrong_way.destination_channel = "channel-1".into();
        assert!(matches!(transport.send(&wrong_way, &mut tx).await, Err(TransportError::Rejected(_))));

        let mut no_timeout = packet(1);
        no_timeout.timeout_height = 0;
        assert!(matches!(transport.send(&no_timeout, &mut tx).await, Err(TransportError::Rejected(_))));
        assert!(transport.packet_commitments("sunchain", "channel-0", &mut tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reopening_keeps_the_sequence() {
        let db = MemoryDatabase::new();
        let transport = StoreTransport::new();
        let mut tx = db.begin().await.unwrap();
        transport.open_channel("sunchain", "channel-0", "oracle", "channel-9", &mut tx).await.unwrap();
        transport.send(&packet(1), &mut tx).await.unwrap();
        transport.open_channel("sunchain", "channel-0", "oracle", "channel-9", &mut tx).await.unwrap();
        assert_eq!(transport.next_outbound_sequence("sunchain", "channel-0", &mut tx).await.unwrap(), Some(2));
    }
}
