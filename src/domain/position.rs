//! Point-in-time view of where a strategy's capital sits.

use serde::Serialize;

use super::money::Amount;

/// Region of the implicit strategy state machine.
///
/// Always derived from balances; a strategy never stores one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Nothing idle, nothing deployed.
    Empty,
    /// Only idle want tokens.
    Idle,
    /// Only receipt tokens in the venue.
    Deployed,
    /// Both idle and deployed capital.
    Mixed,
}

impl Region {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Idle => "idle",
            Self::Deployed => "deployed",
            Self::Mixed => "mixed",
        }
    }
}

/// Balances read from the token ledger and the venue at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionSnapshot {
    /// Want tokens held directly by the strategy.
    pub idle: Amount,
    /// Redemption value of the receipt tokens held by the strategy.
    pub deployed: Amount,
}

impl PositionSnapshot {
    /// Create a snapshot.
    #[must_use]
    pub const fn new(idle: Amount, deployed: Amount) -> Self {
        Self { idle, deployed }
    }

    /// Total claim of the strategy.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.idle + self.deployed
    }

    /// Which region of the state machine these balances fall into.
    #[must_use]
    pub fn region(&self) -> Region {
        match (self.idle.is_zero(), self.deployed.is_zero()) {
            (true, true) => Region::Empty,
            (false, true) => Region::Idle,
            (true, false) => Region::Deployed,
            (false, false) => Region::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn region_follows_balances() {
        assert_eq!(PositionSnapshot::new(dec!(0), dec!(0)).region(), Region::Empty);
        assert_eq!(PositionSnapshot::new(dec!(5), dec!(0)).region(), Region::Idle);
        assert_eq!(
            PositionSnapshot::new(dec!(0), dec!(5)).region(),
            Region::Deployed
        );
        assert_eq!(PositionSnapshot::new(dec!(1), dec!(5)).region(), Region::Mixed);
    }

    #[test]
    fn total_sums_both_sides() {
        let snapshot = PositionSnapshot::new(dec!(10000), dec!(10001));
        assert_eq!(snapshot.total(), dec!(20001));
        assert_eq!(snapshot.region().as_str(), "mixed");
    }
}
