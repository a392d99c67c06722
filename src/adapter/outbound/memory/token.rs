//! In-memory fungible token ledger.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{AccountId, Amount, TokenId};
use crate::error::{Error, Result};
use crate::port::outbound::TokenLedger;

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<AccountId, Amount>,
    failing_transfers: u32,
    blocked: HashSet<AccountId>,
}

/// ERC20-style balances kept in memory.
#[derive(Debug)]
pub struct InMemoryToken {
    token: TokenId,
    ledger: Mutex<Ledger>,
}

impl InMemoryToken {
    /// Create an empty ledger for `token`.
    #[must_use]
    pub fn new(token: TokenId) -> Self {
        Self {
            token,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Create tokens out of thin air for `holder`.
    pub fn mint(&self, holder: &AccountId, amount: Amount) {
        *self
            .ledger
            .lock()
            .balances
            .entry(holder.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Make the next `count` transfers fail without effect.
    pub fn fail_next_transfers(&self, count: u32) {
        self.ledger.lock().failing_transfers = count;
    }

    /// Refuse every transfer to `recipient`, as blocklisting tokens do.
    pub fn block_recipient(&self, recipient: &AccountId) {
        self.ledger.lock().blocked.insert(recipient.clone());
    }

    /// Synchronous balance read.
    #[must_use]
    pub fn balance(&self, holder: &AccountId) -> Amount {
        self.ledger
            .lock()
            .balances
            .get(holder)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.ledger.lock().balances.values().copied().sum()
    }

    /// Synchronous transfer, shared by the async port and the lending pool.
    pub(crate) fn move_tokens(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        if amount < Decimal::ZERO {
            return Err(Error::Token(format!("negative transfer amount {amount}")));
        }
        let mut ledger = self.ledger.lock();
        if ledger.failing_transfers > 0 {
            ledger.failing_transfers -= 1;
            return Err(Error::Token("transfer reverted".to_string()));
        }
        if ledger.blocked.contains(to) {
            return Err(Error::Token(format!("{to} is blocked from receiving {}", self.token)));
        }
        let available = ledger.balances.get(from).copied().unwrap_or(Decimal::ZERO);
        if available < amount {
            return Err(Error::Token(format!(
                "{from} holds {available} {}, cannot send {amount}",
                self.token
            )));
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        ledger.balances.insert(from.clone(), available - amount);
        *ledger.balances.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryToken {
    fn token(&self) -> &TokenId {
        &self.token
    }

    async fn balance_of(&self, holder: &AccountId) -> Result<Amount> {
        Ok(self.balance(holder))
    }

    async fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        self.move_tokens(from, to, amount)
    }
}
