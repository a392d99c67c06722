//! Off-chain automation that polls a strategy's triggers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::strategy::Strategy;
use crate::domain::{AccountId, HarvestReport, InvestOutcome};
use crate::error::{Error, StrategyError};

/// What one keeper iteration did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeeperTick {
    pub harvested: Option<HarvestReport>,
    pub invested: Option<InvestOutcome>,
    /// Operations that failed, with their errors.
    pub failures: Vec<(String, String)>,
}

impl KeeperTick {
    /// Nothing was attempted or nothing succeeded.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.harvested.is_none() && self.invested.is_none()
    }
}

/// Calls `harvest` then `invest` whenever their triggers fire.
pub struct Keeper {
    strategy: Arc<Strategy>,
    identity: AccountId,
    poll_interval: Duration,
}

impl Keeper {
    pub fn new(strategy: Arc<Strategy>, identity: AccountId, poll_interval: Duration) -> Self {
        Self {
            strategy,
            identity,
            poll_interval,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &AccountId {
        &self.identity
    }

    /// Run one iteration. Failures are logged and recorded, never raised.
    pub async fn tick(&self) -> KeeperTick {
        let mut tick = KeeperTick::default();

        if self.strategy.harvest_trigger() {
            match self.strategy.aave_want_balance().await {
                Ok(deployed) if deployed.is_zero() => {
                    debug!("Harvest due but nothing deployed");
                }
                Ok(_) => match self.strategy.harvest(&self.identity).await {
                    Ok(report) => tick.harvested = Some(report),
                    Err(e) => self.record(&mut tick, "harvest", e),
                },
                Err(e) => self.record(&mut tick, "aave_want_balance", e),
            }
        }

        match self.strategy.invest_trigger().await {
            Ok(true) => match self.strategy.invest(&self.identity).await {
                Ok(outcome) => tick.invested = Some(outcome),
                Err(e) => self.record(&mut tick, "invest", e),
            },
            Ok(false) => {}
            Err(e) => self.record(&mut tick, "invest_trigger", e),
        }

        tick
    }

    /// Tick on the poll interval until `shutdown` flips to true or its
    /// sender is dropped. Returns the number of ticks run.
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            strategy = %self.strategy.address(),
            keeper = %self.identity,
            poll_ms = self.poll_interval.as_millis() as u64,
            "Keeper started"
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut ticks = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                    ticks += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(ticks, "Keeper stopped");
        ticks
    }

    fn record(&self, tick: &mut KeeperTick, operation: &str, error: Error) {
        match error.as_strategy() {
            Some(StrategyError::Locked { held_by, .. }) => {
                debug!(operation, held_by, "Strategy busy, will retry next tick");
            }
            _ => warn!(operation, error = %error, "Keeper operation failed"),
        }
        tick.failures.push((operation.to_string(), error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::deployment::Deployment;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn tick_invests_idle_funds() {
        let d = Deployment::builder().funded(dec!(10000)).build();
        let keeper = d.keeper();

        let tick = keeper.tick().await;

        assert_eq!(tick.invested.map(|o| o.deposited()), Some(dec!(10000)));
        assert!(tick.harvested.is_none());
        assert!(tick.failures.is_empty());
    }

    #[tokio::test]
    async fn tick_with_nothing_to_do_is_idle() {
        let d = Deployment::builder().build();

        let tick = d.keeper().tick().await;

        assert!(tick.is_idle());
        assert!(tick.failures.is_empty());
    }

    #[tokio::test]
    async fn busy_strategy_is_recorded_not_raised() {
        let d = Deployment::builder().funded(dec!(10)).build();
        let keeper = d.keeper();
        let _guard = d.hold_lock("harvest");

        let tick = keeper.tick().await;

        assert!(tick.invested.is_none());
        assert_eq!(tick.failures.len(), 1);
        assert_eq!(tick.failures[0].0, "invest");
    }
}
