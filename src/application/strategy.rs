//! Strategy controller.
//!
//! A strategy holds a vault's capital either idle (want tokens) or deployed
//! (receipt tokens in the lending venue). Its state is never stored; the
//! region is always derived from live balances:
//!
//! ```text
//!            invest                    harvest / free_funds
//!   Idle ─────────────► Deployed ─────────────────────────► Idle / Mixed
//!    │                      │
//!    └──── migrate ─────────┴──────────────► Empty (retired)
//! ```
//!
//! Every state-changing operation runs under the per-strategy execution lock
//! inside a tracing span carrying a fresh operation id.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::ledger::StrategyLedger;
use super::lock::{ExecutionGuard, ExecutionLock};
use super::trigger::TriggerPolicy;
use super::venue::VenueAdapter;
use crate::domain::{
    AccountId, Amount, Asset, HarvestReport, InvestOutcome, MigrationMode, MigrationReport,
    PositionSnapshot,
};
use crate::error::{ConfigError, Result, StrategyError};
use crate::port::outbound::{Clock, LendingVenue, TokenLedger, VaultPort};

/// Everything a strategy is bound to at construction.
pub struct StrategyParams {
    /// The strategy's own custody account.
    pub address: AccountId,
    pub want: Asset,
    pub vault: Arc<dyn VaultPort>,
    pub venue: Arc<dyn LendingVenue>,
    pub token: Arc<dyn TokenLedger>,
    pub clock: Arc<dyn Clock>,
    pub policy: TriggerPolicy,
    pub migration_mode: MigrationMode,
    /// Upper bound on any single venue call.
    pub settlement_timeout: Duration,
    /// Accounts allowed to invest and harvest besides the vault.
    pub keepers: Vec<AccountId>,
}

/// A lending strategy bound to one vault, one want asset and one venue.
pub struct Strategy {
    address: AccountId,
    want: Asset,
    vault: Arc<dyn VaultPort>,
    token: Arc<dyn TokenLedger>,
    adapter: Arc<VenueAdapter>,
    ledger: StrategyLedger,
    clock: Arc<dyn Clock>,
    policy: TriggerPolicy,
    migration_mode: MigrationMode,
    last_report: RwLock<DateTime<Utc>>,
    keepers: RwLock<HashSet<AccountId>>,
    lock: ExecutionLock,
}

impl Strategy {
    /// Bind a strategy. `last_report` starts at the clock's current time.
    pub fn new(params: StrategyParams) -> Result<Self> {
        if params.token.token() != params.want.token() {
            return Err(ConfigError::InvalidValue {
                field: "want",
                reason: format!(
                    "token ledger tracks {}, strategy wants {}",
                    params.token.token(),
                    params.want.token()
                ),
            }
            .into());
        }
        if params.settlement_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "settlement_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let adapter = Arc::new(VenueAdapter::new(
            params.address.clone(),
            params.venue,
            Arc::clone(&params.token),
            params.settlement_timeout,
        ));
        let ledger = StrategyLedger::new(
            params.address.clone(),
            Arc::clone(&params.token),
            Arc::clone(&adapter),
        );
        let created_at = params.clock.now();

        Ok(Self {
            address: params.address,
            want: params.want,
            vault: params.vault,
            token: params.token,
            adapter,
            ledger,
            clock: params.clock,
            policy: params.policy,
            migration_mode: params.migration_mode,
            last_report: RwLock::new(created_at),
            keepers: RwLock::new(params.keepers.into_iter().collect()),
            lock: ExecutionLock::new(),
        })
    }

    #[must_use]
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    #[must_use]
    pub fn want(&self) -> &Asset {
        &self.want
    }

    #[must_use]
    pub fn vault_address(&self) -> &AccountId {
        self.vault.address()
    }

    #[must_use]
    pub fn venue_address(&self) -> &AccountId {
        self.adapter.venue_address()
    }

    #[must_use]
    pub fn migration_mode(&self) -> MigrationMode {
        self.migration_mode
    }

    #[must_use]
    pub fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    /// Time of the last successful harvest (construction time before that).
    #[must_use]
    pub fn last_report(&self) -> DateTime<Utc> {
        *self.last_report.read()
    }

    /// Operation currently holding the execution lock, if any.
    #[must_use]
    pub fn busy_with(&self) -> Option<&'static str> {
        self.lock.holder()
    }

    #[must_use]
    pub fn is_keeper(&self, account: &AccountId) -> bool {
        self.keepers.read().contains(account)
    }

    pub async fn want_balance(&self) -> Result<Amount> {
        self.ledger.want_balance().await
    }

    pub async fn aave_want_balance(&self) -> Result<Amount> {
        self.ledger.aave_want_balance().await
    }

    pub async fn snapshot(&self) -> Result<PositionSnapshot> {
        self.ledger.snapshot().await
    }

    /// Grant or revoke keeper rights. Vault only.
    pub fn set_keeper(&self, caller: &AccountId, keeper: AccountId, enabled: bool) -> Result<()> {
        self.require_vault(caller, "set_keeper")?;
        let mut keepers = self.keepers.write();
        if enabled {
            info!(strategy = %self.address, keeper = %keeper, "Keeper granted");
            keepers.insert(keeper);
        } else {
            info!(strategy = %self.address, keeper = %keeper, "Keeper revoked");
            keepers.remove(&keeper);
        }
        Ok(())
    }

    /// Deposit all idle want into the venue.
    pub async fn invest(&self, caller: &AccountId) -> Result<InvestOutcome> {
        self.require_keeper(caller, "invest")?;
        let _guard = self.acquire("invest")?;
        self.deposit_idle().instrument(self.span("invest")).await
    }

    async fn deposit_idle(&self) -> Result<InvestOutcome> {
        let idle = self.ledger.want_balance().await?;
        if idle.is_zero() {
            debug!("Nothing idle to invest");
            return Ok(InvestOutcome::Skipped);
        }
        let receipt = self.adapter.deposit(idle).await?;
        info!(amount = %idle, receipt = %receipt, "Invested idle funds");
        Ok(InvestOutcome::Deposited {
            amount: idle,
            receipt,
        })
    }

    /// Withdraw the whole deployed position and report the result to the vault.
    ///
    /// The vault's debt is read before anything moves, so once the
    /// withdrawal settles nothing further can fail.
    pub async fn harvest(&self, caller: &AccountId) -> Result<HarvestReport> {
        self.require_keeper(caller, "harvest")?;
        let _guard = self.acquire("harvest")?;
        let span = self.span("harvest");
        self.withdraw_and_report().instrument(span).await
    }

    async fn withdraw_and_report(&self) -> Result<HarvestReport> {
        let deployed = self.ledger.aave_want_balance().await?;
        if deployed.is_zero() {
            return Err(StrategyError::invalid_amount("nothing deployed to harvest").into());
        }
        let idle = self.ledger.want_balance().await?;
        let debt = self
            .vault
            .debt_of(&self.address)
            .await
            .map_err(|e| StrategyError::external("debt_of", e))?;

        let withdrawn = self.adapter.withdraw_all().await?;
        let now = self.clock.now();
        let report = HarvestReport::against_debt(withdrawn, idle + withdrawn, debt, now);
        *self.last_report.write() = now;

        if report.loss > Decimal::ZERO {
            warn!(
                loss = %report.loss,
                debt = %debt,
                total_assets = %report.total_assets,
                "Harvest realized a loss"
            );
        }
        info!(
            withdrawn = %withdrawn,
            deployed_before = %deployed,
            gain = %report.gain,
            loss = %report.loss,
            "Harvested"
        );
        self.vault.report(&self.address, &report).await;
        Ok(report)
    }

    /// Withdraw exactly `amount` from the venue into idle. Vault only.
    pub async fn free_funds(&self, caller: &AccountId, amount: Amount) -> Result<Amount> {
        self.require_vault(caller, "free_funds")?;
        let _guard = self.acquire("free_funds")?;
        let span = self.span("free_funds");
        self.release(amount).instrument(span).await
    }

    /// Same effect as [`free_funds`](Self::free_funds), logged as an emergency.
    pub async fn emergency_free_funds(&self, caller: &AccountId, amount: Amount) -> Result<Amount> {
        self.require_vault(caller, "emergency_free_funds")?;
        let _guard = self.acquire("emergency_free_funds")?;
        warn!(strategy = %self.address, amount = %amount, "Emergency withdrawal requested");
        let span = self.span("emergency_free_funds");
        self.release(amount).instrument(span).await
    }

    async fn release(&self, amount: Amount) -> Result<Amount> {
        let received = self.adapter.withdraw(amount).await?;
        info!(amount = %amount, "Freed funds");
        Ok(received)
    }

    /// Hand the whole position to `successor`. Vault only.
    ///
    /// Both strategies are locked for the duration. On success the source
    /// holds nothing.
    pub async fn migrate(
        &self,
        caller: &AccountId,
        successor: &Strategy,
    ) -> Result<MigrationReport> {
        self.require_vault(caller, "migrate")?;
        self.check_successor(successor)?;
        let _guard = self.acquire("migrate")?;
        let _successor_guard = successor.acquire("migration_in")?;

        let span = self.span("migrate");
        self.hand_over(successor).instrument(span).await
    }

    async fn hand_over(&self, successor: &Strategy) -> Result<MigrationReport> {
        let before = self.ledger.snapshot().await?;
        let report = match self.migration_mode {
            MigrationMode::InKind => self.migrate_in_kind(successor, before).await?,
            MigrationMode::Withdraw => self.migrate_by_withdrawal(successor, before).await?,
        };
        info!(
            target = %successor.address,
            mode = self.migration_mode.as_str(),
            value_before = %report.value_before,
            want = %report.want_transferred,
            receipt = %report.receipt_transferred,
            "Migrated"
        );
        Ok(report)
    }

    async fn migrate_in_kind(
        &self,
        successor: &Strategy,
        before: PositionSnapshot,
    ) -> Result<MigrationReport> {
        let receipt = self.adapter.transfer_position(&successor.address).await?;
        let idle = self.ledger.want_balance().await?;

        if let Err(err) = self.send_want(&successor.address, idle).await {
            if !receipt.is_zero() {
                if let Err(undo) = successor
                    .adapter
                    .transfer_receipt(&self.address, receipt)
                    .await
                {
                    error!(
                        target = %successor.address,
                        receipt = %receipt,
                        error = %undo,
                        "Could not return receipt tokens after failed migration"
                    );
                    return Err(StrategyError::external(
                        "migrate",
                        format!("{err}; returning receipt tokens failed: {undo}"),
                    )
                    .into());
                }
            }
            return Err(err);
        }

        Ok(MigrationReport {
            target: successor.address.clone(),
            mode: MigrationMode::InKind,
            value_before: before.total(),
            want_transferred: idle,
            receipt_transferred: receipt,
            realized_loss: Decimal::ZERO,
        })
    }

    async fn migrate_by_withdrawal(
        &self,
        successor: &Strategy,
        before: PositionSnapshot,
    ) -> Result<MigrationReport> {
        let received = if self.adapter.receipt_balance().await?.is_zero() {
            Decimal::ZERO
        } else {
            self.adapter.withdraw_all().await?
        };
        let realized_loss = (before.deployed - received).max(Decimal::ZERO);
        let idle = self.ledger.want_balance().await?;

        if let Err(err) = self.send_want(&successor.address, idle).await {
            if !received.is_zero() {
                if let Err(undo) = self.adapter.deposit(received).await {
                    error!(
                        amount = %received,
                        error = %undo,
                        "Could not redeploy funds after failed migration"
                    );
                    return Err(StrategyError::external(
                        "migrate",
                        format!("{err}; redeploying withdrawn funds failed: {undo}"),
                    )
                    .into());
                }
            }
            return Err(err);
        }

        if realized_loss > Decimal::ZERO {
            warn!(realized_loss = %realized_loss, "Migration realized a loss on withdrawal");
        }
        Ok(MigrationReport {
            target: successor.address.clone(),
            mode: MigrationMode::Withdraw,
            value_before: before.total(),
            want_transferred: idle,
            receipt_transferred: Decimal::ZERO,
            realized_loss,
        })
    }

    async fn send_want(&self, to: &AccountId, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        Ok(self
            .token
            .transfer(&self.address, to, amount)
            .await
            .map_err(|e| StrategyError::external("transfer", e))?)
    }

    /// Idle balance is worth depositing.
    pub async fn invest_trigger(&self) -> Result<bool> {
        let idle = self.ledger.want_balance().await?;
        Ok(self.policy.should_invest(idle))
    }

    /// The harvest interval has elapsed since the last report.
    #[must_use]
    pub fn harvest_trigger(&self) -> bool {
        let now = self.clock.now();
        self.policy.should_harvest(self.last_report(), now)
    }

    fn check_successor(&self, successor: &Strategy) -> Result<()> {
        let reason = if successor.address == self.address {
            Some("cannot migrate to itself".to_string())
        } else if successor.want != self.want {
            Some(format!("wants {}, expected {}", successor.want, self.want))
        } else if successor.venue_address() != self.venue_address() {
            Some(format!(
                "deploys into {}, expected {}",
                successor.venue_address(),
                self.venue_address()
            ))
        } else if successor.vault_address() != self.vault_address() {
            Some(format!(
                "belongs to vault {}, expected {}",
                successor.vault_address(),
                self.vault_address()
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StrategyError::MigrationTargetMismatch {
                target: successor.address.clone(),
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn require_vault(&self, caller: &AccountId, operation: &'static str) -> Result<()> {
        if caller == self.vault.address() {
            Ok(())
        } else {
            Err(self.unauthorized(caller, operation))
        }
    }

    fn require_keeper(&self, caller: &AccountId, operation: &'static str) -> Result<()> {
        if caller == self.vault.address() || self.is_keeper(caller) {
            Ok(())
        } else {
            Err(self.unauthorized(caller, operation))
        }
    }

    fn unauthorized(&self, caller: &AccountId, operation: &'static str) -> crate::error::Error {
        warn!(strategy = %self.address, caller = %caller, operation, "Unauthorized call");
        StrategyError::Unauthorized {
            caller: caller.clone(),
            operation,
        }
        .into()
    }

    /// Take the execution lock for `operation`, failing with `Locked` when
    /// another operation holds it. Held until the guard drops.
    pub fn acquire(&self, operation: &'static str) -> Result<ExecutionGuard<'_>> {
        self.lock.try_acquire(operation).map_err(|held_by| {
            debug!(strategy = %self.address, operation, held_by, "Strategy busy");
            StrategyError::Locked {
                strategy: self.address.clone(),
                held_by,
            }
            .into()
        })
    }

    fn span(&self, operation: &'static str) -> Span {
        info_span!(
            "strategy",
            operation,
            strategy = %self.address,
            want = %self.want.symbol(),
            op_id = %Uuid::new_v4()
        )
    }
}
