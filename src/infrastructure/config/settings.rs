//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section is optional; missing values fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use yieldkeeper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::keeper::KeeperConfig;
use super::logging::LoggingConfig;
use super::simulation::{SimulationConfig, SECONDS_PER_YEAR};
use super::strategy::{AssetConfig, StrategyConfig};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The want asset.
    #[serde(default)]
    pub asset: AssetConfig,

    /// Strategy binding, trigger thresholds and migration mode.
    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub keeper: KeeperConfig,

    /// Simulated lending pool driven by `yieldkeeper run`.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize the tracing subscriber from `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Check that all values are present and within acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected pretty or json, got {}", self.logging.format),
            }
            .into());
        }

        let asset = self.asset.asset()?;

        let strategy = self.strategy.address()?;
        let vault = self.strategy.vault()?;
        self.strategy.venue()?;
        self.strategy.keepers()?;
        if strategy == vault {
            return Err(ConfigError::InvalidValue {
                field: "strategy.vault",
                reason: "must differ from strategy.address".to_string(),
            }
            .into());
        }
        if self.strategy.settlement_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "settlement_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.strategy.policy(&asset)?;

        self.keeper.identity()?;
        if self.keeper.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let simulation = &self.simulation;
        if simulation.initial_deposit < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "initial_deposit",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if simulation.apy < Decimal::ZERO || simulation.apy > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "apy",
                reason: "must be between 0 and 1".to_string(),
            }
            .into());
        }
        if simulation.starting_index <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "starting_index",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        simulation.initial_deposit_units(&asset)?;
        simulation.step()?;
        if simulation.step_secs > SECONDS_PER_YEAR {
            return Err(ConfigError::InvalidValue {
                field: "step_secs",
                reason: format!("must be at most {SECONDS_PER_YEAR}"),
            }
            .into());
        }
        if simulation.step_secs == 0 || simulation.steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "simulation",
                reason: "step_secs and steps must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MigrationMode;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.asset.decimals, 18);
        assert_eq!(config.strategy.harvest_interval_secs, 86_400);
        assert_eq!(config.strategy.migration_mode, MigrationMode::InKind);
        assert_eq!(config.strategy.min_invest_amount, dec!(0));
        assert_eq!(config.keeper.identity, "keeper");
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
[logging]
level = "debug"
format = "json"

[asset]
token = "usdc"
symbol = "USDC"
decimals = 6

[strategy]
address = "strategy-usdc"
vault = "yv-usdc"
venue = "aave-v2"
min_invest_amount = "250"
harvest_interval_secs = 3600
settlement_timeout_ms = 500
migration_mode = "withdraw"
keepers = ["ops"]

[keeper]
identity = "bot"
poll_interval_ms = 50

[simulation]
initial_deposit = "5000"
apy = "0.1"
steps = 10
"#;
        let config = Config::parse_toml(toml).unwrap();
        let asset = config.asset.asset().unwrap();

        assert_eq!(asset.symbol(), "USDC");
        assert_eq!(config.strategy.migration_mode, MigrationMode::Withdraw);
        assert_eq!(
            config.strategy.policy(&asset).unwrap().min_invest_amount(),
            dec!(250_000_000)
        );
        assert_eq!(config.strategy.keepers().unwrap().len(), 1);
        assert_eq!(config.simulation.steps, 10);
    }

    #[test]
    fn rejects_zero_harvest_interval() {
        let result = Config::parse_toml("[strategy]\nharvest_interval_secs = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "harvest_interval_secs",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_blank_vault() {
        let result = Config::parse_toml("[strategy]\nvault = \" \"\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField {
                field: "strategy.vault"
            }))
        ));
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = Config::parse_toml("[logging]\nlevel = \"info\"\nformat = \"xml\"\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "logging.format",
                ..
            }))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::parse_toml("[strategy"),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }
}
