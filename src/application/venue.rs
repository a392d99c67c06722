//! Strategy-side access to the lending venue.
//!
//! Every state-changing call is bounded by the settlement timeout. A call
//! that settles only in part, or whose acknowledgement never arrives, is
//! reconciled against the holder's real balances and reversed, so callers
//! see either the full effect or none of it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::oracle::ValueOracle;
use crate::domain::{AccountId, Amount};
use crate::error::{Result, StrategyError};
use crate::port::outbound::{LendingVenue, Settlement, TokenLedger, WithdrawRequest};

/// Idle want and receipt tokens of the holder at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Holdings {
    idle: Amount,
    receipt: Amount,
}

/// Venue operations performed on behalf of one holder.
pub struct VenueAdapter {
    holder: AccountId,
    venue: Arc<dyn LendingVenue>,
    token: Arc<dyn TokenLedger>,
    oracle: ValueOracle,
    settlement_timeout: Duration,
}

impl VenueAdapter {
    pub fn new(
        holder: AccountId,
        venue: Arc<dyn LendingVenue>,
        token: Arc<dyn TokenLedger>,
        settlement_timeout: Duration,
    ) -> Self {
        let oracle = ValueOracle::new(Arc::clone(&venue));
        Self {
            holder,
            venue,
            token,
            oracle,
            settlement_timeout,
        }
    }

    #[must_use]
    pub fn venue_address(&self) -> &AccountId {
        self.venue.address()
    }

    #[must_use]
    pub fn venue_name(&self) -> &'static str {
        self.venue.venue_name()
    }

    /// Receipt tokens held.
    pub async fn receipt_balance(&self) -> Result<Amount> {
        Ok(self
            .venue
            .balance_of(&self.holder)
            .await
            .map_err(|e| StrategyError::external("balance_of", e))?)
    }

    /// Want tokens the held receipts redeem for right now.
    pub async fn total_deployed_value(&self) -> Result<Amount> {
        let receipt = self.receipt_balance().await?;
        self.oracle.value_of(receipt).await
    }

    async fn idle_balance(&self) -> Result<Amount> {
        Ok(self
            .token
            .balance_of(&self.holder)
            .await
            .map_err(|e| StrategyError::external("balance_of", e))?)
    }

    async fn holdings(&self) -> Result<Holdings> {
        Ok(Holdings {
            idle: self.idle_balance().await?,
            receipt: self.receipt_balance().await?,
        })
    }

    /// Deposit `amount` idle want tokens. Returns the receipt tokens minted.
    pub async fn deposit(&self, amount: Amount) -> Result<Amount> {
        if amount <= Decimal::ZERO {
            return Err(StrategyError::invalid_amount("deposit amount must be positive").into());
        }
        let before = self.holdings().await?;
        if before.idle < amount {
            return Err(StrategyError::InsufficientBalance {
                requested: amount,
                available: before.idle,
            }
            .into());
        }

        let settlement = self
            .settle("deposit", before, self.venue.deposit(&self.holder, amount))
            .await?;
        match settlement {
            Settlement::Complete { receipt, .. } => {
                debug!(
                    amount = %amount,
                    receipt = %receipt,
                    venue = self.venue_name(),
                    "Deposit settled"
                );
                Ok(receipt)
            }
            Settlement::Partial {
                underlying,
                shortfall,
                ..
            } => Err(self
                .abandon_partial("deposit", before, underlying, shortfall)
                .await),
            Settlement::Rejected { reason } => {
                Err(StrategyError::external("deposit", reason).into())
            }
        }
    }

    /// Withdraw exactly `amount` want tokens. Returns the tokens received.
    pub async fn withdraw(&self, amount: Amount) -> Result<Amount> {
        if amount <= Decimal::ZERO {
            return Err(StrategyError::invalid_amount("withdraw amount must be positive").into());
        }
        let deployed = self.total_deployed_value().await?;
        if amount > deployed {
            return Err(StrategyError::invalid_amount(format!(
                "withdraw {amount} exceeds deployed balance {deployed}"
            ))
            .into());
        }
        self.redeem(WithdrawRequest::Underlying(amount)).await
    }

    /// Redeem every receipt token held. Returns the want tokens received.
    pub async fn withdraw_all(&self) -> Result<Amount> {
        let receipt = self.receipt_balance().await?;
        if receipt.is_zero() {
            return Err(StrategyError::invalid_amount("nothing deployed to withdraw").into());
        }
        self.redeem(WithdrawRequest::Receipt(receipt)).await
    }

    async fn redeem(&self, request: WithdrawRequest) -> Result<Amount> {
        let before = self.holdings().await?;
        let settlement = self
            .settle("withdraw", before, self.venue.withdraw(&self.holder, request))
            .await?;
        match settlement {
            Settlement::Complete {
                underlying,
                receipt,
            } => {
                debug!(
                    received = %underlying,
                    burned = %receipt,
                    venue = self.venue_name(),
                    "Withdrawal settled"
                );
                Ok(underlying)
            }
            Settlement::Partial {
                underlying,
                shortfall,
                ..
            } => Err(self
                .abandon_partial("withdraw", before, underlying, shortfall)
                .await),
            Settlement::Rejected { reason } => {
                Err(StrategyError::external("withdraw", reason).into())
            }
        }
    }

    /// Move `receipt` tokens to `to` without redeeming them.
    ///
    /// A transfer either lands whole or not at all. After a timeout the
    /// balance decides which one happened.
    pub async fn transfer_receipt(&self, to: &AccountId, receipt: Amount) -> Result<()> {
        if receipt.is_zero() {
            return Ok(());
        }
        let before = self.receipt_balance().await?;
        match tokio::time::timeout(
            self.settlement_timeout,
            self.venue.transfer(&self.holder, to, receipt),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(StrategyError::external("transfer", e).into()),
            Err(_) => {
                let now = self.receipt_balance().await?;
                if now == before - receipt {
                    warn!(to = %to, receipt = %receipt, "Receipt transfer confirmed after timeout");
                    Ok(())
                } else {
                    Err(StrategyError::external(
                        "transfer",
                        format!("not confirmed within {:?}", self.settlement_timeout),
                    )
                    .into())
                }
            }
        }
    }

    /// Move every receipt token held to `to`. Returns how many moved.
    pub async fn transfer_position(&self, to: &AccountId) -> Result<Amount> {
        let receipt = self.receipt_balance().await?;
        self.transfer_receipt(to, receipt).await?;
        Ok(receipt)
    }

    /// Await a settlement within the timeout, mapping failures.
    ///
    /// On timeout the holder is restored to `before` before the error is
    /// returned.
    async fn settle<F>(
        &self,
        operation: &'static str,
        before: Holdings,
        call: F,
    ) -> Result<Settlement>
    where
        F: Future<Output = Result<Settlement>>,
    {
        match tokio::time::timeout(self.settlement_timeout, call).await {
            Ok(Ok(settlement)) => Ok(settlement),
            Ok(Err(e)) => Err(StrategyError::external(operation, e).into()),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.settlement_timeout.as_millis() as u64,
                    "Settlement not confirmed, reconciling"
                );
                self.restore(operation, before).await?;
                Err(StrategyError::external(
                    operation,
                    format!("settlement not confirmed within {:?}", self.settlement_timeout),
                )
                .into())
            }
        }
    }

    async fn abandon_partial(
        &self,
        operation: &'static str,
        before: Holdings,
        settled: Amount,
        shortfall: Amount,
    ) -> crate::error::Error {
        warn!(
            operation,
            settled = %settled,
            shortfall = %shortfall,
            "Partial settlement, reversing"
        );
        if let Err(e) = self.restore(operation, before).await {
            return e;
        }
        StrategyError::external(
            operation,
            format!("partial settlement: {settled} settled, {shortfall} short"),
        )
        .into()
    }

    /// Undo whatever moved since `before`.
    ///
    /// Redeeming minted receipts or re-depositing received want may leave
    /// one base unit of rounding dust with the venue.
    async fn restore(&self, operation: &'static str, before: Holdings) -> Result<()> {
        let now = self.holdings().await?;
        let reversal = if now.receipt > before.receipt {
            let excess = now.receipt - before.receipt;
            self.bounded(self.venue.withdraw(&self.holder, WithdrawRequest::Receipt(excess)))
                .await
        } else if now.idle > before.idle {
            let excess = now.idle - before.idle;
            self.bounded(self.venue.deposit(&self.holder, excess)).await
        } else {
            return Ok(());
        };

        match reversal {
            Ok(Settlement::Complete { .. }) => {
                debug!(operation, "Reversed unconfirmed settlement");
                Ok(())
            }
            Ok(other) => Err(self.stranded(operation, before, now, format!("{other:?}"))),
            Err(reason) => Err(self.stranded(operation, before, now, reason)),
        }
    }

    async fn bounded<F>(&self, call: F) -> std::result::Result<Settlement, String>
    where
        F: Future<Output = Result<Settlement>>,
    {
        match tokio::time::timeout(self.settlement_timeout, call).await {
            Ok(Ok(settlement)) => Ok(settlement),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("not confirmed within {:?}", self.settlement_timeout)),
        }
    }

    fn stranded(
        &self,
        operation: &'static str,
        before: Holdings,
        now: Holdings,
        reason: String,
    ) -> crate::error::Error {
        error!(
            operation,
            holder = %self.holder,
            idle_before = %before.idle,
            idle_now = %now.idle,
            receipt_before = %before.receipt,
            receipt_now = %now.receipt,
            reason = %reason,
            "Reversal failed, position needs manual reconciliation"
        );
        StrategyError::external(operation, format!("reversal failed: {reason}")).into()
    }
}
