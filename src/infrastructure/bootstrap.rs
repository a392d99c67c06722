//! Composition root: wires a strategy and its keeper against in-memory
//! venue, token and vault adapters.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use super::config::settings::Config;
use crate::adapter::outbound::clock::ManualClock;
use crate::adapter::outbound::memory::{InMemoryLendingPool, InMemoryToken, InMemoryVault};
use crate::application::{Keeper, Strategy, StrategyParams};
use crate::domain::{AccountId, Amount, Asset, MigrationReport, PositionSnapshot, Rate};
use crate::error::Result;
use crate::port::outbound::{Clock, LendingVenue, TokenLedger, VaultPort};

/// Outcome of a simulated run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub asset: String,
    pub steps: u32,
    pub keeper_ticks: u64,
    pub harvests: usize,
    /// Gain summed over every harvest.
    pub gain: Amount,
    /// Loss summed over every harvest.
    pub loss: Amount,
    pub final_index: Rate,
    pub position: PositionSnapshot,
    pub migration: Option<MigrationReport>,
}

/// A strategy deployed into a simulated lending pool.
pub struct Simulation {
    config: Config,
    step_length: chrono::Duration,
    pub asset: Asset,
    pub token: Arc<InMemoryToken>,
    pub pool: Arc<InMemoryLendingPool>,
    pub vault: Arc<InMemoryVault>,
    pub clock: Arc<ManualClock>,
    pub strategy: Arc<Strategy>,
    pub keeper: Keeper,
}

impl Simulation {
    /// Build the deployment and lend the initial deposit to the strategy.
    pub fn build(config: Config) -> Result<Self> {
        let asset = config.asset.asset()?;
        let vault_address = config.strategy.vault()?;
        let keeper_identity = config.keeper.identity()?;

        let token = Arc::new(InMemoryToken::new(asset.token().clone()));
        let pool = Arc::new(
            InMemoryLendingPool::new(config.strategy.venue()?, Arc::clone(&token))
                .with_index(config.simulation.starting_index),
        );
        let vault = Arc::new(InMemoryVault::new(vault_address, Arc::clone(&token)));
        let clock = Arc::new(ManualClock::default());

        let strategy = Arc::new(Self::strategy(
            &config,
            config.strategy.address()?,
            &asset,
            &token,
            &pool,
            &vault,
            &clock,
        )?);

        let deposit = config.simulation.initial_deposit_units(&asset)?;
        let step_length = config.simulation.step()?;
        token.mint(vault.address(), deposit);
        vault.lend(strategy.address(), deposit)?;

        let keeper = Keeper::new(
            Arc::clone(&strategy),
            keeper_identity,
            config.keeper.poll_interval(),
        );

        info!(
            asset = %asset,
            strategy = %strategy.address(),
            vault = %vault.address(),
            venue = %pool.address(),
            deposit = %deposit,
            "Simulation deployed"
        );

        Ok(Self {
            config,
            step_length,
            asset,
            token,
            pool,
            vault,
            clock,
            strategy,
            keeper,
        })
    }

    fn strategy(
        config: &Config,
        address: AccountId,
        asset: &Asset,
        token: &Arc<InMemoryToken>,
        pool: &Arc<InMemoryLendingPool>,
        vault: &Arc<InMemoryVault>,
        clock: &Arc<ManualClock>,
    ) -> Result<Strategy> {
        let mut keepers = config.strategy.keepers()?;
        keepers.push(config.keeper.identity()?);
        Strategy::new(StrategyParams {
            address,
            want: asset.clone(),
            vault: Arc::clone(vault) as Arc<dyn VaultPort>,
            venue: Arc::clone(pool) as Arc<dyn LendingVenue>,
            token: Arc::clone(token) as Arc<dyn TokenLedger>,
            clock: Arc::clone(clock) as Arc<dyn Clock>,
            policy: config.strategy.policy(asset)?,
            migration_mode: config.strategy.migration_mode,
            settlement_timeout: config.strategy.settlement_timeout(),
            keepers,
        })
    }

    /// Advance simulated time by one step and accrue pool interest.
    pub fn step(&self) {
        self.clock.advance(self.step_length);
        self.pool.accrue(self.config.simulation.rate_per_step());
    }

    /// Run the keeper while the simulated world advances one step per poll
    /// interval, then optionally migrate to a fresh strategy.
    pub async fn run(&self) -> Result<SimulationSummary> {
        let steps = self.config.simulation.steps;
        let pace = self.config.keeper.poll_interval();
        let (shutdown, watcher) = watch::channel(false);

        let world = async {
            for _ in 0..steps {
                tokio::time::sleep(pace).await;
                self.step();
            }
            // Let the keeper observe the last step before stopping it.
            tokio::time::sleep(pace).await;
            let _ = shutdown.send(true);
        };
        let (keeper_ticks, ()) = tokio::join!(self.keeper.run_until(watcher), world);

        let migration = if self.config.simulation.migrate_at_end {
            Some(self.migrate_to_successor().await?)
        } else {
            None
        };
        self.summary(keeper_ticks, migration).await
    }

    async fn migrate_to_successor(&self) -> Result<MigrationReport> {
        let address = AccountId::new(format!("{}-v2", self.strategy.address()));
        let successor = Self::strategy(
            &self.config,
            address,
            &self.asset,
            &self.token,
            &self.pool,
            &self.vault,
            &self.clock,
        )?;
        self.strategy
            .migrate(self.vault.address(), &successor)
            .await
    }

    async fn summary(
        &self,
        keeper_ticks: u64,
        migration: Option<MigrationReport>,
    ) -> Result<SimulationSummary> {
        let reports = self.vault.reports();
        let (gain, loss) = reports
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(gain, loss), (_, report)| {
                (gain + report.gain, loss + report.loss)
            });
        Ok(SimulationSummary {
            asset: self.asset.symbol().to_string(),
            steps: self.config.simulation.steps,
            keeper_ticks,
            harvests: reports.len(),
            gain,
            loss,
            final_index: self.pool.index(),
            position: self.strategy.snapshot().await?,
            migration,
        })
    }
}
