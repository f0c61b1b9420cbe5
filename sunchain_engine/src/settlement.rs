//! The settlement state machine.
//!
//! An order is settled exactly once, when its price arrives:
//!
//! | Status    | `fill = floor(escrow / price)` | Effect                                      | New status  |
//! |-----------|--------------------------------|---------------------------------------------|-------------|
//! | Pending   | 0                              | Escrow refunded to the owner in full        | Completed   |
//! | Pending   | > 0                            | `fill` units of the fill denom credited     | Active      |
//! | otherwise | n/a                            | Nothing                                     | unchanged   |
//!
//! Only the first denomination of the escrowed amount takes part in the calculation. A refund returns every
//! escrowed denomination; a fill leaves all of them in escrow.
use std::fmt::Display;

use log::*;
use serde::{Deserialize, Serialize};
use sunchain_common::{Address, Coin, Coins};

use crate::{
    db::traits::{KeyValueStore, StoreError},
    db_types::{Order, OrderStatusType},
    ledger::{orders::save_order, AccountLedger},
    oracle::Price,
    SettlementError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// The fill rounded down to zero and the escrow went back to the owner.
    Refunded,
    /// The owner was credited with this amount.
    Filled(Coin),
    /// The order had already been settled. Nothing was changed.
    AlreadySettled,
}

impl Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementOutcome::Refunded => write!(f, "Refunded"),
            SettlementOutcome::Filled(coin) => write!(f, "Filled({coin})"),
            SettlementOutcome::AlreadySettled => write!(f, "AlreadySettled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettlementEngine<L> {
    ledger: L,
    fill_denom: String,
}

impl<L: AccountLedger> SettlementEngine<L> {
    pub fn new<S: Into<String>>(ledger: L, fill_denom: S) -> Self {
        Self { ledger, fill_denom: fill_denom.into() }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn fill_denom(&self) -> &str {
        self.fill_denom.as_str()
    }

    /// `floor(escrowed / price)` over the first escrowed denomination.
    pub fn compute_fill(&self, order: &Order, price: Price) -> Result<u128, SettlementError> {
        let escrowed = order.escrowed_amount.first().ok_or_else(|| {
            StoreError::corrupt(format!("order/{}", order.id.value()), "the order has no escrowed amount")
        })?;
        Ok(escrowed.amount / u128::from(price.value()))
    }

    /// Settles `order` at `price`, moving funds and saving the order in the caller's unit of work.
    ///
    /// Returns the order as it now stands together with the outcome. If the order is no longer `Pending`, it is
    /// returned untouched with [`SettlementOutcome::AlreadySettled`].
    pub async fn settle<S: KeyValueStore>(
        &self,
        mut order: Order,
        price: Price,
        store: &mut S,
    ) -> Result<(Order, SettlementOutcome), SettlementError> {
        if !order.is_pending() {
            debug!("🔄️⚖️ Order {} is already {}. Ignoring price {price}", order.id, order.status);
            return Ok((order, SettlementOutcome::AlreadySettled));
        }
        let fill = self.compute_fill(&order, price)?;
        let outcome = if fill == 0 {
            self.refund(&order.owner, &order.escrowed_amount, store).await?;
            order.status = OrderStatusType::Completed;
            SettlementOutcome::Refunded
        } else {
            let filled = Coin::new(fill, self.fill_denom.as_str());
            self.ledger.credit(&order.owner, &filled, store).await?;
            order.filled_amount = Some(filled.clone());
            order.status = OrderStatusType::Active;
            SettlementOutcome::Filled(filled)
        };
        save_order(&order, store).await?;
        info!("🔄️⚖️ Order {} settled at price {price}: {outcome}", order.id);
        Ok((order, outcome))
    }

    async fn refund<S: KeyValueStore>(
        &self,
        owner: &Address,
        escrowed: &Coins,
        store: &mut S,
    ) -> Result<(), SettlementError> {
        self.ledger.debit_from_escrow(owner, escrowed, store).await?;
        debug!("🔄️⚖️ Refunded {escrowed} to {owner}");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        db::{memory::MemoryDatabase, traits::StoreBackend},
        db_types::OrderId,
        ledger::{
            orders::{create_order, get_order},
            StoreBank,
        },
    };

    fn engine() -> SettlementEngine<StoreBank> {
        SettlementEngine::new(StoreBank::new("sunchain"), "gold")
    }

    fn price(px: u64) -> Price {
        Price::new(px).unwrap()
    }

    async fn escrowed_order<S: KeyValueStore>(
        engine: &SettlementEngine<StoreBank>,
        owner: &Address,
        amount: &str,
        store: &mut S,
    ) -> Order {
        let amount: Coins = amount.parse().unwrap();
        for coin in amount.iter() {
            engine.ledger().mint(owner, coin, store).await.unwrap();
        }
        engine.ledger().escrow(owner, &amount, store).await.unwrap();
        let id = create_order(owner, &amount, store).await.unwrap();
        get_order(id, store).await.unwrap()
    }

    #[tokio::test]
    async fn non_zero_fill_credits_owner() {
        let db = MemoryDatabase::new();
        let engine = engine();
        let alice = Address::from("alice");
        let mut tx = db.begin().await.unwrap();
        let order = escrowed_order(&engine, &alice, "5000000stake", &mut tx).await;

        let (order, outcome) = engine.settle(order, price(1_000_000), &mut tx).await.unwrap();
        assert_eq!(outcome, SettlementOutcome::Filled(Coin::new(5, "gold")));
        assert_eq!(order.status, OrderStatusType::Active);
        assert_eq!(order.filled_amount, Some(Coin::new(5, "gold")));
        assert_eq!(get_order(order.id, &mut tx).await.unwrap(), order);
        let bank = engine.ledger();
        assert_eq!(bank.balance(&alice, "gold", &mut tx).await.unwrap(), 5);
        assert_eq!(bank.balance(&alice, "stake", &mut tx).await.unwrap(), 0);
        assert_eq!(bank.balance(bank.escrow_address(), "stake", &mut tx).await.unwrap(), 5_000_000);
    }

    #[tokio::test]
    async fn zero_fill_refunds_escrow() {
        let db = MemoryDatabase::new();
        let engine = engine();
        let bob = Address::from("bob");
        let mut tx = db.begin().await.unwrap();
        let order = escrowed_order(&engine, &bob, "500000stake", &mut tx).await;

        let (order, outcome) = engine.settle(order, price(1_000_000), &mut tx).await.unwrap();
        assert_eq!(outcome, SettlementOutcome::Refunded);
        assert_eq!(order.status, OrderStatusType::Completed);
        assert_eq!(order.filled_amount, None);
        let bank = engine.ledger();
        assert_eq!(bank.balance(&bob, "stake", &mut tx).await.unwrap(), 500_000);
        assert_eq!(bank.balance(&bob, "gold", &mut tx).await.unwrap(), 0);
        assert_eq!(bank.balance(bank.escrow_address(), "stake", &mut tx).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn settled_orders_are_left_alone() {
        let db = MemoryDatabase::new();
        let engine = engine();
        let alice = Address::from("alice");
        let mut tx = db.begin().await.unwrap();
        let order = escrowed_order(&engine, &alice, "3000000stake", &mut tx).await;
        let (settled, _) = engine.settle(order, price(1_000_000), &mut tx).await.unwrap();

        let (again, outcome) = engine.settle(settled.clone(), price(1), &mut tx).await.unwrap();
        assert_eq!(outcome, SettlementOutcome::AlreadySettled);
        assert_eq!(again, settled);
        assert_eq!(engine.ledger().balance(&alice, "gold", &mut tx).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn only_the_first_denomination_counts() {
        let db = MemoryDatabase::new();
        let engine = engine();
        let carol = Address::from("carol");
        let mut tx = db.begin().await.unwrap();
        let order = escrowed_order(&engine, &carol, "10atom,9000000stake", &mut tx).await;
        assert_eq!(engine.compute_fill(&order, price(1_000_000)).unwrap(), 0);

        let (_, outcome) = engine.settle(order, price(1_000_000), &mut tx).await.unwrap();
        assert_eq!(outcome, SettlementOutcome::Refunded);
        // a refund returns everything that was escrowed
        let bank = engine.ledger();
        assert_eq!(bank.balance(&carol, "atom", &mut tx).await.unwrap(), 10);
        assert_eq!(bank.balance(&carol, "stake", &mut tx).await.unwrap(), 9_000_000);
    }

    #[tokio::test]
    async fn refund_without_escrowed_funds_fails() {
        let db = MemoryDatabase::new();
        let engine = engine();
        let dave = Address::from("dave");
        let mut tx = db.begin().await.unwrap();
        let id = create_order(&dave, &"100stake".parse().unwrap(), &mut tx).await.unwrap();
        let order = get_order(id, &mut tx).await.unwrap();
        let err = engine.settle(order, price(1_000), &mut tx).await.unwrap_err();
        assert!(matches!(err, SettlementError::InsufficientFunds { .. }));
        assert_eq!(id, OrderId(1));
    }
}
