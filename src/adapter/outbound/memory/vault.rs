//! In-memory vault that lends want tokens and records harvest reports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;

use super::token::InMemoryToken;
use crate::domain::{AccountId, Amount, HarvestReport};
use crate::error::Result;
use crate::port::outbound::VaultPort;

/// Vault stand-in: tracks per-strategy debt and keeps every report received.
///
/// A report folds its gain into the strategy's debt and writes its loss
/// off, so the next report is measured against what was already credited.
#[derive(Debug)]
pub struct InMemoryVault {
    address: AccountId,
    token: Arc<InMemoryToken>,
    debts: Mutex<HashMap<AccountId, Amount>>,
    reports: Mutex<Vec<(AccountId, HarvestReport)>>,
}

impl InMemoryVault {
    /// Create a vault holding want tokens on `token`.
    #[must_use]
    pub fn new(address: AccountId, token: Arc<InMemoryToken>) -> Self {
        Self {
            address,
            token,
            debts: Mutex::new(HashMap::new()),
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Send `amount` of the vault's want tokens to `strategy` and record the debt.
    pub fn lend(&self, strategy: &AccountId, amount: Amount) -> Result<()> {
        self.token.move_tokens(&self.address, strategy, amount)?;
        *self
            .debts
            .lock()
            .entry(strategy.clone())
            .or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    /// Every report received so far, oldest first.
    #[must_use]
    pub fn reports(&self) -> Vec<(AccountId, HarvestReport)> {
        self.reports.lock().clone()
    }

    /// Most recent report from `strategy`.
    #[must_use]
    pub fn last_report(&self, strategy: &AccountId) -> Option<HarvestReport> {
        self.reports
            .lock()
            .iter()
            .rev()
            .find(|(from, _)| from == strategy)
            .map(|(_, report)| report.clone())
    }
}

#[async_trait]
impl VaultPort for InMemoryVault {
    fn address(&self) -> &AccountId {
        &self.address
    }

    async fn debt_of(&self, strategy: &AccountId) -> Result<Amount> {
        Ok(self
            .debts
            .lock()
            .get(strategy)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    async fn report(&self, strategy: &AccountId, report: &HarvestReport) {
        info!(
            strategy = %strategy,
            gain = %report.gain,
            loss = %report.loss,
            total_assets = %report.total_assets,
            "Vault received harvest report"
        );
        {
            let mut debts = self.debts.lock();
            let debt = debts.entry(strategy.clone()).or_insert(Decimal::ZERO);
            *debt = (*debt + report.gain - report.loss).max(Decimal::ZERO);
        }
        self.reports.lock().push((strategy.clone(), report.clone()));
    }
}
