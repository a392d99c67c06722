//! Receipt-token valuation.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::money::floor_units;
use crate::domain::{Amount, Rate};
use crate::error::{Result, StrategyError};
use crate::port::outbound::LendingVenue;

/// Values receipt tokens in want tokens at the venue's live rate, rounded
/// down to match what the venue pays out.
#[derive(Clone)]
pub struct ValueOracle {
    venue: Arc<dyn LendingVenue>,
}

impl ValueOracle {
    pub fn new(venue: Arc<dyn LendingVenue>) -> Self {
        Self { venue }
    }

    /// Current exchange rate. A non-positive rate is treated as a failed read.
    pub async fn rate(&self) -> Result<Rate> {
        let rate = self
            .venue
            .exchange_rate()
            .await
            .map_err(|e| StrategyError::external("exchange_rate", e))?;
        if rate <= Decimal::ZERO {
            return Err(StrategyError::external(
                "exchange_rate",
                format!("venue reported non-positive rate {rate}"),
            )
            .into());
        }
        Ok(rate)
    }

    /// Redemption value of `receipt` tokens.
    pub async fn value_of(&self, receipt: Amount) -> Result<Amount> {
        if receipt.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok(floor_units(receipt * self.rate().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::{InMemoryLendingPool, InMemoryToken};
    use crate::domain::{AccountId, TokenId};
    use rust_decimal_macros::dec;

    fn oracle_at(index: Rate) -> ValueOracle {
        let token = Arc::new(InMemoryToken::new(TokenId::new("dai")));
        let pool = InMemoryLendingPool::new(AccountId::new("pool"), token).with_index(index);
        ValueOracle::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn value_of_rounds_down() {
        let oracle = oracle_at(dec!(1.02));
        assert_eq!(oracle.value_of(dec!(9803)).await.unwrap(), dec!(9999));
        assert_eq!(oracle.value_of(dec!(0)).await.unwrap(), dec!(0));
    }

    #[tokio::test]
    async fn non_positive_rate_is_an_external_failure() {
        let oracle = oracle_at(dec!(0));
        let err = oracle.rate().await.unwrap_err();
        assert!(matches!(
            err.as_strategy(),
            Some(StrategyError::ExternalCallFailure {
                operation: "exchange_rate",
                ..
            })
        ));
    }
}
