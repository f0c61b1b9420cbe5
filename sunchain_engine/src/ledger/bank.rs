//! Account balances.
//!
//! The settlement module does not own a bank. It only needs a narrow view of one: a way to move funds into and out
//! of its escrow account and a way to credit the proceeds of a fill. [`AccountLedger`] is that view, and
//! [`StoreBank`] is the implementation backed by the module store, with balances kept under
//! `balance/{address}/{denom}`.
use log::*;
use sunchain_common::{Address, Coin, Coins};
use thiserror::Error;

use crate::{
    db::{
        keys::{balance_key, balance_prefix, decode_u128, encode_u128},
        traits::{KeyValueStore, StoreError},
    },
    helpers::module_address,
    SettlementError,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Account {address} has insufficient funds. {required} is required, but only {available} is available")]
    InsufficientFunds { address: Address, required: Coin, available: u128 },
    #[error("Crediting {amount} to {address} would overflow the balance")]
    Overflow { address: Address, amount: Coin },
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for SettlementError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds { address, required, available } => {
                SettlementError::InsufficientFunds { address, required, available }
            },
            LedgerError::Overflow { address, amount } => SettlementError::BalanceOverflow { address, amount },
            LedgerError::Store(e) => SettlementError::StorageError(e),
        }
    }
}

/// Balance transfers, as seen from the settlement module.
///
/// Every method operates inside the unit of work it is given. A failure leaves the balances in that unit of work
/// unspecified, so callers must abort the unit of work on error rather than carry on.
#[allow(async_fn_in_trait)]
pub trait AccountLedger {
    /// The module-owned account that holds escrowed funds.
    fn escrow_address(&self) -> &Address;

    async fn balance<S: KeyValueStore>(&self, address: &Address, denom: &str, store: &mut S)
        -> Result<u128, LedgerError>;

    /// Every non-zero balance held by `address`, in denomination order.
    async fn balances<S: KeyValueStore>(&self, address: &Address, store: &mut S) -> Result<Vec<Coin>, LedgerError>;

    /// Creates `amount` out of thin air and credits it to `address`.
    async fn mint<S: KeyValueStore>(&self, address: &Address, amount: &Coin, store: &mut S) -> Result<(), LedgerError>;

    /// Credits `amount` to `address`. Fills are paid out this way.
    async fn credit<S: KeyValueStore>(&self, address: &Address, amount: &Coin, store: &mut S)
        -> Result<(), LedgerError>;

    /// Moves `amount` from `from` into the escrow account.
    async fn escrow<S: KeyValueStore>(&self, from: &Address, amount: &Coins, store: &mut S) -> Result<(), LedgerError>;

    /// Moves `amount` out of the escrow account and into `to`.
    async fn debit_from_escrow<S: KeyValueStore>(
        &self,
        to: &Address,
        amount: &Coins,
        store: &mut S,
    ) -> Result<(), LedgerError>;
}

/// An [`AccountLedger`] that keeps balances in the module store alongside the orders.
#[derive(Debug, Clone)]
pub struct StoreBank {
    escrow_address: Address,
}

impl StoreBank {
    /// A bank whose escrow account belongs to the module called `module_name`.
    pub fn new(module_name: &str) -> Self {
        Self { escrow_address: module_address(module_name) }
    }

    async fn set_balance<S: KeyValueStore>(
        &self,
        address: &Address,
        denom: &str,
        value: u128,
        store: &mut S,
    ) -> Result<(), LedgerError> {
        let key = balance_key(address.as_str(), denom);
        if value == 0 {
            store.delete(&key).await?;
        } else {
            store.set(&key, encode_u128(value)).await?;
        }
        Ok(())
    }

    async fn add<S: KeyValueStore>(&self, address: &Address, amount: &Coin, store: &mut S) -> Result<(), LedgerError> {
        let current = self.balance(address, &amount.denom, store).await?;
        let updated = current
            .checked_add(amount.amount)
            .ok_or_else(|| LedgerError::Overflow { address: address.clone(), amount: amount.clone() })?;
        self.set_balance(address, &amount.denom, updated, store).await
    }

    async fn subtract<S: KeyValueStore>(
        &self,
        address: &Address,
        amount: &Coin,
        store: &mut S,
    ) -> Result<(), LedgerError> {
        let available = self.balance(address, &amount.denom, store).await?;
        let updated = available.checked_sub(amount.amount).ok_or_else(|| LedgerError::InsufficientFunds {
            address: address.clone(),
            required: amount.clone(),
            available,
        })?;
        self.set_balance(address, &amount.denom, updated, store).await
    }

    async fn transfer<S: KeyValueStore>(
        &self,
        from: &Address,
        to: &Address,
        amount: &Coins,
        store: &mut S,
    ) -> Result<(), LedgerError> {
        for coin in amount.iter() {
            self.subtract(from, coin, store).await?;
            self.add(to, coin, store).await?;
        }
        trace!("🗃️ Transferred {amount} from {from} to {to}");
        Ok(())
    }
}

impl AccountLedger for StoreBank {
    fn escrow_address(&self) -> &Address {
        &self.escrow_address
    }

    async fn balance<S: KeyValueStore>(
        &self,
        address: &Address,
        denom: &str,
        store: &mut S,
    ) -> Result<u128, LedgerError> {
        let key = balance_key(address.as_str(), denom);
        let value = match store.get(&key).await? {
            Some(bytes) => decode_u128(&key, &bytes)?,
            None => 0,
        };
        Ok(value)
    }

    async fn balances<S: KeyValueStore>(&self, address: &Address, store: &mut S) -> Result<Vec<Coin>, LedgerError> {
        let prefix = balance_prefix(address.as_str());
        let mut result = Vec::new();
        for (key, bytes) in store.iterate(&prefix).await? {
            let amount = decode_u128(&key, &bytes)?;
            let denom = key[prefix.len()..].to_string();
            result.push(Coin::new(amount, denom));
        }
        Ok(result)
    }

    async fn mint<S: KeyValueStore>(&self, address: &Address, amount: &Coin, store: &mut S) -> Result<(), LedgerError> {
        self.add(address, amount, store).await?;
        debug!("🗃️ Minted {amount} to {address}");
        Ok(())
    }

    async fn credit<S: KeyValueStore>(
        &self,
        address: &Address,
        amount: &Coin,
        store: &mut S,
    ) -> Result<(), LedgerError> {
        self.add(address, amount, store).await?;
        debug!("🗃️ Credited {amount} to {address}");
        Ok(())
    }

    async fn escrow<S: KeyValueStore>(&self, from: &Address, amount: &Coins, store: &mut S) -> Result<(), LedgerError> {
        self.transfer(from, &self.escrow_address, amount, store).await
    }

    async fn debit_from_escrow<S: KeyValueStore>(
        &self,
        to: &Address,
        amount: &Coins,
        store: &mut S,
    ) -> Result<(), LedgerError> {
        self.transfer(&self.escrow_address, to, amount, store).await
    }
}
