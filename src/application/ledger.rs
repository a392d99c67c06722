//! Derived view of where a strategy's funds sit.

use std::sync::Arc;

use super::venue::VenueAdapter;
use crate::domain::{AccountId, Amount, PositionSnapshot};
use crate::error::{Result, StrategyError};
use crate::port::outbound::TokenLedger;

/// Reads idle and deployed balances. Holds no state of its own; every
/// figure is read live from the token and the venue.
pub struct StrategyLedger {
    address: AccountId,
    token: Arc<dyn TokenLedger>,
    adapter: Arc<VenueAdapter>,
}

impl StrategyLedger {
    pub fn new(
        address: AccountId,
        token: Arc<dyn TokenLedger>,
        adapter: Arc<VenueAdapter>,
    ) -> Self {
        Self {
            address,
            token,
            adapter,
        }
    }

    /// Idle want tokens.
    pub async fn want_balance(&self) -> Result<Amount> {
        Ok(self
            .token
            .balance_of(&self.address)
            .await
            .map_err(|e| StrategyError::external("balance_of", e))?)
    }

    /// Want-token value of the deployed position.
    pub async fn aave_want_balance(&self) -> Result<Amount> {
        self.adapter.total_deployed_value().await
    }

    pub async fn total_assets(&self) -> Result<Amount> {
        Ok(self.snapshot().await?.total())
    }

    pub async fn snapshot(&self) -> Result<PositionSnapshot> {
        Ok(PositionSnapshot::new(
            self.want_balance().await?,
            self.aave_want_balance().await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::{InMemoryLendingPool, InMemoryToken};
    use crate::domain::{Region, TokenId};
    use crate::port::outbound::LendingVenue;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[tokio::test]
    async fn snapshot_tracks_both_sides() {
        let token = Arc::new(InMemoryToken::new(TokenId::new("dai")));
        let pool = Arc::new(InMemoryLendingPool::new(
            AccountId::new("pool"),
            Arc::clone(&token),
        ));
        let holder = AccountId::new("strategy");
        token.mint(&holder, dec!(300));
        let adapter = Arc::new(VenueAdapter::new(
            holder.clone(),
            pool as Arc<dyn LendingVenue>,
            Arc::clone(&token) as Arc<dyn TokenLedger>,
            Duration::from_secs(1),
        ));
        let ledger = StrategyLedger::new(holder, token, Arc::clone(&adapter));

        assert_eq!(ledger.snapshot().await.unwrap().region(), Region::Idle);

        adapter.deposit(dec!(200)).await.unwrap();
        let snapshot = ledger.snapshot().await.unwrap();

        assert_eq!(snapshot.idle, dec!(100));
        assert_eq!(snapshot.deployed, dec!(200));
        assert_eq!(snapshot.region(), Region::Mixed);
        assert_eq!(ledger.total_assets().await.unwrap(), dec!(300));
    }
}
