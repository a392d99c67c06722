//! Monetary types for token amounts and exchange rates.
//!
//! Amounts are integral base units (18 decimals for DAI, 6 for USDC) carried
//! in a `Decimal`. Anything derived through a rate is rounded back to whole
//! base units: [`floor_units`] when paying out, [`ceil_units`] when charging,
//! so rounding always favours the party holding the backing.

use rust_decimal::{Decimal, RoundingStrategy};

/// Token amount in base units.
pub type Amount = Decimal;

/// Exchange rate between receipt tokens and the underlying asset.
pub type Rate = Decimal;

/// Round a derived amount to whole base units, half away from zero.
#[must_use]
pub fn round_units(value: Decimal) -> Amount {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a derived amount down to whole base units.
#[must_use]
pub fn floor_units(value: Decimal) -> Amount {
    value.floor()
}

/// Round a derived amount up to whole base units.
#[must_use]
pub fn ceil_units(value: Decimal) -> Amount {
    value.ceil()
}

/// True when `a` and `b` differ by at most `tolerance`.
#[must_use]
pub fn within(a: Amount, b: Amount, tolerance: Amount) -> bool {
    (a - b).abs() <= tolerance
}

/// Scale a whole-token quantity into base units for an asset with `decimals`.
///
/// Returns `None` when the result does not fit a `Decimal`.
#[must_use]
pub fn to_base_units(tokens: Decimal, decimals: u32) -> Option<Amount> {
    let mut scale = Decimal::ONE;
    for _ in 0..decimals {
        scale = scale.checked_mul(Decimal::TEN)?;
    }
    tokens.checked_mul(scale).map(round_units)
}
