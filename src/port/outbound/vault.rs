//! Vault port: the strategy's owner as seen from the strategy.

use async_trait::async_trait;

use crate::domain::{AccountId, Amount, HarvestReport};
use crate::error::Error;

/// The vault that lends capital to a strategy and receives its reports.
#[async_trait]
pub trait VaultPort: Send + Sync {
    /// The vault's account.
    fn address(&self) -> &AccountId;

    /// Capital the vault currently has lent to `strategy`.
    async fn debt_of(&self, strategy: &AccountId) -> Result<Amount, Error>;

    /// Receive a harvest report. Acknowledgement only; the vault's share
    /// accounting happens on its side.
    async fn report(&self, strategy: &AccountId, report: &HarvestReport);
}
