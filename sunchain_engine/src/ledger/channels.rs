//! The channel registry: which local port and channel reach a named counterparty chain.
//!
//! The channel handshake itself happens elsewhere. This registry only remembers its result, one binding per
//! counterparty, and the last write wins.
use log::*;

use crate::{
    db::{
        keys::{channel_binding_key, CHANNEL_PREFIX},
        traits::{KeyValueStore, StoreError},
    },
    db_types::ChannelBinding,
    SettlementError,
};

/// Binds `counterparty_name` to the local `(port, channel)` pair, replacing any previous binding.
pub async fn set_binding<S: KeyValueStore>(
    counterparty_name: &str,
    port: &str,
    channel: &str,
    store: &mut S,
) -> Result<(), SettlementError> {
    let binding = ChannelBinding::new(counterparty_name, port, channel);
    let key = channel_binding_key(counterparty_name);
    let value = serde_json::to_vec(&binding).map_err(|e| StoreError::corrupt(&key, e))?;
    store.set(&key, value).await?;
    info!("🗃️ Channel binding set: {binding}");
    Ok(())
}

pub async fn fetch_binding<S: KeyValueStore>(
    counterparty_name: &str,
    store: &mut S,
) -> Result<Option<ChannelBinding>, SettlementError> {
    let key = channel_binding_key(counterparty_name);
    match store.get(&key).await? {
        Some(bytes) => {
            let binding = serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&key, e))?;
            Ok(Some(binding))
        },
        None => Ok(None),
    }
}

/// Returns the local `(port, channel)` bound to `counterparty_name`.
pub async fn get_binding<S: KeyValueStore>(
    counterparty_name: &str,
    store: &mut S,
) -> Result<(String, String), SettlementError> {
    fetch_binding(counterparty_name, store)
        .await?
        .map(|b| (b.port, b.channel))
        .ok_or_else(|| SettlementError::UnknownCounterparty(counterparty_name.to_string()))
}

pub async fn fetch_bindings<S: KeyValueStore>(store: &mut S) -> Result<Vec<ChannelBinding>, SettlementError> {
    let bindings = store
        .iterate(CHANNEL_PREFIX)
        .await?
        .into_iter()
        .map(|(key, bytes)| serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(key, e)))
        .collect::<Result<Vec<ChannelBinding>, _>>()?;
    Ok(bindings)
}
