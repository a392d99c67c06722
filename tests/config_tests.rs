use std::io::Write;

use rust_decimal_macros::dec;
use tempfile::NamedTempFile;
use yieldkeeper::domain::MigrationMode;
use yieldkeeper::error::{ConfigError, Error};
use yieldkeeper::infrastructure::config::settings::Config;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn loads_config_from_file() {
    let file = write_temp_config(
        r#"
[logging]
level = "warn"
format = "json"

[asset]
token = "usdc"
symbol = "USDC"
decimals = 6

[strategy]
min_invest_amount = "10"
migration_mode = "withdraw"
"#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.strategy.migration_mode, MigrationMode::Withdraw);
    let asset = config.asset.asset().unwrap();
    assert_eq!(
        config.strategy.policy(&asset).unwrap().min_invest_amount(),
        dec!(10_000_000)
    );
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn rejects_too_many_decimals() {
    let file = write_temp_config("[asset]\ndecimals = 40\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue { field: "asset", .. })) => {}
        Err(err) => panic!("Expected invalid asset error, got {err}"),
        Ok(config) => panic!("Expected rejection, got {} decimals", config.asset.decimals),
    }
}

#[test]
fn rejects_negative_min_invest_amount() {
    let file = write_temp_config("[strategy]\nmin_invest_amount = \"-1\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "min_invest_amount",
            ..
        }))
    ));
}

#[test]
fn rejects_vault_equal_to_strategy() {
    let file = write_temp_config("[strategy]\naddress = \"same\"\nvault = \"same\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "strategy.vault",
            ..
        }))
    ));
}

#[test]
fn rejects_unknown_migration_mode() {
    let file = write_temp_config("[strategy]\nmigration_mode = \"teleport\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn rejects_apy_above_one() {
    let file = write_temp_config("[simulation]\napy = \"1.5\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue { field: "apy", .. }))
    ));
}

fn invalid_field(toml: &str) -> &'static str {
    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
        Err(err) => panic!("Expected an invalid value error, got {err}"),
        Ok(_) => panic!("Expected rejection of {toml:?}"),
    }
}

#[test]
fn rejects_min_invest_amount_too_large_for_base_units() {
    assert_eq!(
        invalid_field("[strategy]\nmin_invest_amount = \"100000000000\"\n"),
        "min_invest_amount"
    );
}

#[test]
fn rejects_initial_deposit_too_large_for_base_units() {
    assert_eq!(
        invalid_field("[simulation]\ninitial_deposit = \"100000000000\"\n"),
        "initial_deposit"
    );
}

#[test]
fn rejects_harvest_interval_out_of_range() {
    assert_eq!(
        invalid_field("[strategy]\nharvest_interval_secs = 9223372036854775807\n"),
        "harvest_interval_secs"
    );
}

#[test]
fn rejects_step_secs_out_of_range() {
    assert_eq!(
        invalid_field("[simulation]\nstep_secs = 9223372036854775807\n"),
        "step_secs"
    );
    assert_eq!(
        invalid_field("[simulation]\nstep_secs = 31536001\n"),
        "step_secs"
    );
}

#[test]
fn large_amounts_at_low_precision_are_accepted() {
    let config = Config::parse_toml(
        "[asset]\ndecimals = 6\n[strategy]\nmin_invest_amount = \"100000000000\"\n",
    )
    .unwrap();
    let asset = config.asset.asset().unwrap();

    assert_eq!(
        config.strategy.policy(&asset).unwrap().min_invest_amount(),
        dec!(100_000_000_000_000_000)
    );
}
