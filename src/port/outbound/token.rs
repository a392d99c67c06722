//! Want-token ledger port (ERC20-style balances and transfers).

use async_trait::async_trait;

use crate::domain::{AccountId, Amount, TokenId};
use crate::error::Error;

/// Balances of a single fungible token.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// The token this ledger tracks.
    fn token(&self) -> &TokenId;

    /// Tokens held by `holder`.
    async fn balance_of(&self, holder: &AccountId) -> Result<Amount, Error>;

    /// Move `amount` from `from` to `to`. Fails without effect when `from`
    /// holds less than `amount`.
    async fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), Error>;
}
