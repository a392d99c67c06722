//! A strategy wired to in-memory adapters.
//!
//! Defaults: an 18-decimal DAI-like asset, pool index 1, a clock frozen at
//! 2024-01-01 00:00 UTC, in-kind migration, 24h harvest interval and a
//! keeper named `keeper`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::adapter::outbound::clock::ManualClock;
use crate::adapter::outbound::memory::{InMemoryLendingPool, InMemoryToken, InMemoryVault};
use crate::application::{ExecutionGuard, Keeper, Strategy, StrategyParams, TriggerPolicy};
use crate::domain::{AccountId, Amount, Asset, MigrationMode, Rate, TokenId};
use crate::port::outbound::{Clock, LendingVenue, TokenLedger, VaultPort};

const KEEPER: &str = "keeper";

/// Builder for [`Deployment`].
#[derive(Debug, Clone)]
pub struct DeploymentBuilder {
    funded: Amount,
    index: Rate,
    policy: TriggerPolicy,
    migration_mode: MigrationMode,
    settlement_timeout: Duration,
}

impl Default for DeploymentBuilder {
    fn default() -> Self {
        Self {
            funded: Amount::ZERO,
            index: Rate::ONE,
            policy: TriggerPolicy::default(),
            migration_mode: MigrationMode::InKind,
            settlement_timeout: Duration::from_secs(5),
        }
    }
}

impl DeploymentBuilder {
    /// Have the vault lend `amount` to the strategy at build time.
    #[must_use]
    pub fn funded(mut self, amount: Amount) -> Self {
        self.funded = amount;
        self
    }

    /// Start the pool at `index`.
    #[must_use]
    pub fn index(mut self, index: Rate) -> Self {
        self.index = index;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn migration_mode(mut self, mode: MigrationMode) -> Self {
        self.migration_mode = mode;
        self
    }

    #[must_use]
    pub fn settlement_timeout(mut self, timeout: Duration) -> Self {
        self.settlement_timeout = timeout;
        self
    }

    pub fn build(self) -> Deployment {
        let asset = Asset::try_new(TokenId::new("dai"), "DAI", 18).unwrap();
        let token = Arc::new(InMemoryToken::new(asset.token().clone()));
        let pool = Arc::new(
            InMemoryLendingPool::new(AccountId::new("lending-pool"), Arc::clone(&token))
                .with_index(self.index),
        );
        let vault = Arc::new(InMemoryVault::new(AccountId::new("vault"), Arc::clone(&token)));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));

        let strategy = Strategy::new(params(
            &self,
            AccountId::new("strategy"),
            &asset,
            &token,
            &pool,
            &vault,
            &clock,
        ))
        .unwrap();

        let deployment = Deployment {
            asset,
            token,
            pool,
            vault,
            clock,
            strategy: Arc::new(strategy),
            settings: self,
        };
        if deployment.settings.funded > Amount::ZERO {
            deployment.fund(deployment.settings.funded);
        }
        deployment
    }
}

fn params(
    settings: &DeploymentBuilder,
    address: AccountId,
    want: &Asset,
    token: &Arc<InMemoryToken>,
    pool: &Arc<InMemoryLendingPool>,
    vault: &Arc<InMemoryVault>,
    clock: &Arc<ManualClock>,
) -> StrategyParams {
    StrategyParams {
        address,
        want: want.clone(),
        vault: Arc::clone(vault) as Arc<dyn VaultPort>,
        venue: Arc::clone(pool) as Arc<dyn LendingVenue>,
        token: Arc::clone(token) as Arc<dyn TokenLedger>,
        clock: Arc::clone(clock) as Arc<dyn Clock>,
        policy: settings.policy.clone(),
        migration_mode: settings.migration_mode,
        settlement_timeout: settings.settlement_timeout,
        keepers: vec![AccountId::new(KEEPER)],
    }
}

/// A strategy plus every collaborator, all in memory.
pub struct Deployment {
    pub asset: Asset,
    pub token: Arc<InMemoryToken>,
    pub pool: Arc<InMemoryLendingPool>,
    pub vault: Arc<InMemoryVault>,
    pub clock: Arc<ManualClock>,
    pub strategy: Arc<Strategy>,
    settings: DeploymentBuilder,
}

impl Deployment {
    #[must_use]
    pub fn builder() -> DeploymentBuilder {
        DeploymentBuilder::default()
    }

    #[must_use]
    pub fn vault_address(&self) -> AccountId {
        self.vault.address().clone()
    }

    #[must_use]
    pub fn keeper_address(&self) -> AccountId {
        AccountId::new(KEEPER)
    }

    /// Mint `amount` to the vault and lend it to the strategy.
    pub fn fund(&self, amount: Amount) {
        self.token.mint(self.vault.address(), amount);
        self.vault.lend(self.strategy.address(), amount).unwrap();
    }

    /// Parameters for another strategy on the same vault, venue and clock.
    #[must_use]
    pub fn params_for(&self, address: AccountId, want: Asset) -> StrategyParams {
        params(
            &self.settings,
            address,
            &want,
            &self.token,
            &self.pool,
            &self.vault,
            &self.clock,
        )
    }

    /// A sibling strategy that is a valid migration target.
    #[must_use]
    pub fn spawn(&self, address: AccountId) -> Strategy {
        Strategy::new(self.params_for(address, self.asset.clone())).unwrap()
    }

    /// Keeper acting as `keeper` with a 10ms poll interval.
    #[must_use]
    pub fn keeper(&self) -> Keeper {
        Keeper::new(
            Arc::clone(&self.strategy),
            self.keeper_address(),
            Duration::from_millis(10),
        )
    }

    /// Hold the strategy's execution lock as `operation`.
    pub fn hold_lock(&self, operation: &'static str) -> ExecutionGuard<'_> {
        self.strategy.acquire(operation).unwrap()
    }

    /// Idle balance, read synchronously.
    #[must_use]
    pub fn idle(&self) -> Amount {
        self.token.balance(self.strategy.address())
    }

    /// Deployed value, read synchronously.
    #[must_use]
    pub fn deployed(&self) -> Amount {
        self.pool.value_of(self.strategy.address())
    }
}
