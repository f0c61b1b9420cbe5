//! The order ledger.
//!
//! Orders live under `order/{id}` and ids are allocated from the `order_count` counter. Like the rest of the ledger,
//! these functions are not atomic by themselves: they operate on whatever unit of work they are handed, and the
//! caller decides when to commit.
use log::*;
use sunchain_common::{Address, Coins};

use crate::{
    db::{
        keys::{decode_u64, encode_u64, order_key, ORDER_COUNT_KEY, ORDER_PREFIX},
        traits::{KeyValueStore, StoreError},
    },
    db_types::{Order, OrderId},
    SettlementError,
};

/// The number of orders ever created. This is also the id of the most recently created order.
pub async fn order_count<S: KeyValueStore>(store: &mut S) -> Result<u64, SettlementError> {
    let count = match store.get(ORDER_COUNT_KEY).await? {
        Some(bytes) => decode_u64(ORDER_COUNT_KEY, &bytes)?,
        None => 0,
    };
    Ok(count)
}

/// Increments the order counter and returns the new value as the next order id. Ids start at 1.
async fn next_order_id<S: KeyValueStore>(store: &mut S) -> Result<OrderId, SettlementError> {
    let next = order_count(store)
        .await?
        .checked_add(1)
        .ok_or_else(|| StoreError::corrupt(ORDER_COUNT_KEY, "the order counter is exhausted"))?;
    store.set(ORDER_COUNT_KEY, encode_u64(next)).await?;
    Ok(OrderId(next))
}

/// Creates a new `Pending` order for `owner`, allocating a fresh id.
///
/// The order is only durable once the enclosing unit of work commits. If it is rolled back, the counter increment is
/// rolled back with it, so committed ids are always strictly increasing with no reuse.
pub async fn create_order<S: KeyValueStore>(
    owner: &Address,
    escrowed_amount: &Coins,
    store: &mut S,
) -> Result<OrderId, SettlementError> {
    if owner.is_empty() || escrowed_amount.is_empty() {
        return Err(SettlementError::InvalidMessage(
            "An order needs both an owner and a non-empty escrow amount".to_string(),
        ));
    }
    let id = next_order_id(store).await?;
    let order = Order::new_pending(id, owner.clone(), escrowed_amount.clone());
    save_order(&order, store).await?;
    debug!("🗃️ Order {id} created for {owner}, escrowing {escrowed_amount}");
    Ok(id)
}

pub async fn fetch_order<S: KeyValueStore>(order_id: OrderId, store: &mut S) -> Result<Option<Order>, SettlementError> {
    let key = order_key(order_id.value());
    match store.get(&key).await? {
        Some(bytes) => {
            let order = serde_json::from_slice::<Order>(&bytes).map_err(|e| StoreError::corrupt(&key, e))?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

/// Like [`fetch_order`], but a missing order is an error.
pub async fn get_order<S: KeyValueStore>(order_id: OrderId, store: &mut S) -> Result<Order, SettlementError> {
    fetch_order(order_id, store).await?.ok_or(SettlementError::NotFound(order_id))
}

/// Overwrites the record for `order.id`.
///
/// A record without an owner or without an escrow amount is half-constructed and is silently ignored. The return
/// value says whether the record was written.
pub async fn save_order<S: KeyValueStore>(order: &Order, store: &mut S) -> Result<bool, SettlementError> {
    if order.owner.is_empty() || order.escrowed_amount.is_empty() {
        warn!("🗃️ Refusing to save incomplete order record {}", order.id);
        return Ok(false);
    }
    let key = order_key(order.id.value());
    let value = serde_json::to_vec(order).map_err(|e| StoreError::corrupt(&key, e))?;
    store.set(&key, value).await?;
    trace!("🗃️ Order {} saved with status {}", order.id, order.status);
    Ok(true)
}

/// All orders, in ascending id order.
pub async fn fetch_orders<S: KeyValueStore>(store: &mut S) -> Result<Vec<Order>, SettlementError> {
    let mut orders = store
        .iterate(ORDER_PREFIX)
        .await?
        .into_iter()
        .map(|(key, bytes)| serde_json::from_slice::<Order>(&bytes).map_err(|e| StoreError::corrupt(key, e)))
        .collect::<Result<Vec<_>, _>>()?;
    // keys are decimal strings, so the store's ordering is lexicographic
    orders.sort_by_key(|o| o.id);
    Ok(orders)
}

pub async fn orders_for_owner<S: KeyValueStore>(owner: &Address, store: &mut S) -> Result<Vec<Order>, SettlementError> {
    let orders = fetch_orders(store).await?.into_iter().filter(|o| &o.owner == owner).collect();
    Ok(orders)
}
