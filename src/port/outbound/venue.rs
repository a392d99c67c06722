//! Lending venue port.
//!
//! A venue accepts want tokens and mints receipt tokens whose redemption
//! value grows as interest accrues. Settlement may be delayed, partial or
//! rejected; implementations report what actually happened and never retry.

use async_trait::async_trait;

use crate::domain::{AccountId, Amount, Rate};
use crate::error::Error;

/// What to redeem on a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawRequest {
    /// Return exactly this many want tokens.
    Underlying(Amount),
    /// Burn exactly this many receipt tokens.
    Receipt(Amount),
}

/// Result of a deposit or withdrawal as settled by the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The request settled in full.
    Complete {
        /// Want tokens that moved.
        underlying: Amount,
        /// Receipt tokens minted or burned.
        receipt: Amount,
    },
    /// Only part of the request settled.
    Partial {
        /// Want tokens that moved.
        underlying: Amount,
        /// Receipt tokens minted or burned.
        receipt: Amount,
        /// Want tokens that did not move.
        shortfall: Amount,
    },
    /// Nothing moved.
    Rejected {
        /// The venue's reason.
        reason: String,
    },
}

impl Settlement {
    /// Check if the request settled in full.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// External lending venue.
#[async_trait]
pub trait LendingVenue: Send + Sync {
    /// The venue's own account (custodian of deposited want tokens).
    fn address(&self) -> &AccountId;

    /// Pull `amount` want tokens from `holder` and mint receipt tokens to it.
    async fn deposit(&self, holder: &AccountId, amount: Amount) -> Result<Settlement, Error>;

    /// Burn `holder`'s receipt tokens and pay want tokens back to it.
    async fn withdraw(
        &self,
        holder: &AccountId,
        request: WithdrawRequest,
    ) -> Result<Settlement, Error>;

    /// Move receipt tokens between holders without redeeming them.
    async fn transfer(&self, from: &AccountId, to: &AccountId, receipt: Amount)
        -> Result<(), Error>;

    /// Receipt tokens held by `holder`.
    async fn balance_of(&self, holder: &AccountId) -> Result<Amount, Error>;

    /// Want tokens redeemable per receipt token, read live.
    async fn exchange_rate(&self) -> Result<Rate, Error>;

    /// Venue name for logging/debugging.
    fn venue_name(&self) -> &'static str;
}
