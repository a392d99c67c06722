#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use yieldkeeper::domain::money::within;
use yieldkeeper::domain::Amount;
use yieldkeeper::error::{Error, StrategyError};

/// Venue rounding allowed on an 18-decimal asset.
pub const TOLERANCE: Decimal = dec!(100);

/// Whole tokens of an 18-decimal asset, in base units.
pub fn tokens(n: i64) -> Amount {
    Decimal::from(n) * Decimal::from(1_000_000_000_000_000_000u64)
}

#[track_caller]
pub fn assert_close(actual: Amount, expected: Amount) {
    assert!(
        within(actual, expected, TOLERANCE),
        "expected {expected} (±{TOLERANCE}), got {actual}"
    );
}

/// The strategy error inside a failed result.
#[track_caller]
pub fn strategy_err<T: std::fmt::Debug>(result: Result<T, Error>) -> StrategyError {
    match result {
        Ok(value) => panic!("expected a strategy error, got Ok({value:?})"),
        Err(Error::Strategy(err)) => err,
        Err(other) => panic!("expected a strategy error, got {other}"),
    }
}
