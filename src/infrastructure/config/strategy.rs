//! Asset and strategy configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::TriggerPolicy;
use crate::domain::{AccountId, Asset, MigrationMode, TokenId};
use crate::error::{ConfigError, Result};

/// The want asset the strategy manages.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Token identifier on the ledger.
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Base-unit decimals (18 for DAI, 6 for USDC).
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_token() -> String {
    "dai".to_string()
}

fn default_symbol() -> String {
    "DAI".to_string()
}

const fn default_decimals() -> u32 {
    18
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

impl AssetConfig {
    /// Validated asset.
    pub fn asset(&self) -> Result<Asset> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "asset.token" }.into());
        }
        Asset::try_new(TokenId::new(self.token.as_str()), self.symbol.as_str(), self.decimals)
            .map_err(|e| {
                ConfigError::InvalidValue {
                    field: "asset",
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

/// Strategy binding and trigger thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// The strategy's own account.
    #[serde(default = "default_address")]
    pub address: String,
    /// Owning vault.
    #[serde(default = "default_vault")]
    pub vault: String,
    /// Lending venue.
    #[serde(default = "default_venue")]
    pub venue: String,
    /// Idle balance, in whole tokens, that must be exceeded before investing.
    #[serde(default)]
    pub min_invest_amount: Decimal,
    #[serde(default = "default_harvest_interval_secs")]
    pub harvest_interval_secs: u64,
    /// Upper bound on a single venue call.
    #[serde(default = "default_settlement_timeout_ms")]
    pub settlement_timeout_ms: u64,
    #[serde(default)]
    pub migration_mode: MigrationMode,
    /// Extra keeper accounts besides `[keeper].identity`.
    #[serde(default)]
    pub keepers: Vec<String>,
}

fn default_address() -> String {
    "strategy".to_string()
}

fn default_vault() -> String {
    "vault".to_string()
}

fn default_venue() -> String {
    "lending-pool".to_string()
}

const fn default_harvest_interval_secs() -> u64 {
    24 * 60 * 60
}

const fn default_settlement_timeout_ms() -> u64 {
    30_000
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            vault: default_vault(),
            venue: default_venue(),
            min_invest_amount: Decimal::ZERO,
            harvest_interval_secs: default_harvest_interval_secs(),
            settlement_timeout_ms: default_settlement_timeout_ms(),
            migration_mode: MigrationMode::default(),
            keepers: Vec::new(),
        }
    }
}

impl StrategyConfig {
    pub fn address(&self) -> Result<AccountId> {
        account("strategy.address", &self.address)
    }

    pub fn vault(&self) -> Result<AccountId> {
        account("strategy.vault", &self.vault)
    }

    pub fn venue(&self) -> Result<AccountId> {
        account("strategy.venue", &self.venue)
    }

    pub fn keepers(&self) -> Result<Vec<AccountId>> {
        self.keepers
            .iter()
            .map(|k| account("strategy.keepers", k))
            .collect()
    }

    #[must_use]
    pub fn settlement_timeout(&self) -> Duration {
        Duration::from_millis(self.settlement_timeout_ms)
    }

    /// Trigger policy with the threshold scaled to `asset` base units.
    pub fn policy(&self, asset: &Asset) -> Result<TriggerPolicy> {
        let min_invest_amount = asset.units(self.min_invest_amount).map_err(|e| {
            ConfigError::InvalidValue {
                field: "min_invest_amount",
                reason: e.to_string(),
            }
        })?;
        TriggerPolicy::try_new(
            min_invest_amount,
            seconds("harvest_interval_secs", self.harvest_interval_secs)?,
        )
    }
}

/// Whole seconds as a `chrono::Duration`, rejecting values it cannot hold.
pub(crate) fn seconds(field: &'static str, secs: u64) -> Result<chrono::Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field,
                reason: format!("{secs}s is out of range"),
            }
            .into()
        })
}

pub(crate) fn account(field: &'static str, value: &str) -> Result<AccountId> {
    AccountId::try_new(value).map_err(|_| ConfigError::MissingField { field }.into())
}
