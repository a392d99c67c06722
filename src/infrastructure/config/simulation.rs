//! Simulated venue settings used by `yieldkeeper run`.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::strategy::seconds;
use crate::domain::{Amount, Asset};
use crate::error::{ConfigError, Result};

/// Each simulated step advances the clock by `step_secs` and accrues
/// `apy` pro rata into the lending pool.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Whole tokens the vault lends the strategy at start.
    #[serde(default = "default_initial_deposit")]
    pub initial_deposit: Decimal,
    /// Annual yield of the pool (0.05 = 5%).
    #[serde(default = "default_apy")]
    pub apy: Decimal,
    /// Liquidity index the pool starts from.
    #[serde(default = "default_starting_index")]
    pub starting_index: Decimal,
    /// Simulated seconds per step.
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Migrate to a fresh strategy once the steps are done.
    #[serde(default)]
    pub migrate_at_end: bool,
}

fn default_initial_deposit() -> Decimal {
    Decimal::from(10_000)
}

fn default_apy() -> Decimal {
    Decimal::new(5, 2)
}

fn default_starting_index() -> Decimal {
    Decimal::ONE
}

/// Longest simulated step.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

const fn default_step_secs() -> u64 {
    60 * 60
}

const fn default_steps() -> u32 {
    72
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_deposit: default_initial_deposit(),
            apy: default_apy(),
            starting_index: default_starting_index(),
            step_secs: default_step_secs(),
            steps: default_steps(),
            migrate_at_end: false,
        }
    }
}

impl SimulationConfig {
    /// Simulated time per step.
    pub fn step(&self) -> Result<chrono::Duration> {
        seconds("step_secs", self.step_secs)
    }

    /// The initial deposit in `asset` base units.
    pub fn initial_deposit_units(&self, asset: &Asset) -> Result<Amount> {
        asset.units(self.initial_deposit).map_err(|e| {
            ConfigError::InvalidValue {
                field: "initial_deposit",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Pool growth applied per step.
    #[must_use]
    pub fn rate_per_step(&self) -> Decimal {
        self.apy * Decimal::from(self.step_secs) / Decimal::from(SECONDS_PER_YEAR)
    }
}
