//! Keeper trigger policy.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::Amount;
use crate::error::{ConfigError, Result};

/// Default time between harvests.
pub const DEFAULT_HARVEST_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// When a keeper should call `invest` and `harvest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPolicy {
    min_invest_amount: Amount,
    harvest_interval: Duration,
}

impl TriggerPolicy {
    /// Build a policy, rejecting a negative threshold or a non-positive interval.
    pub fn try_new(min_invest_amount: Amount, harvest_interval: Duration) -> Result<Self> {
        if min_invest_amount < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_invest_amount",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if harvest_interval <= Duration::zero() {
            return Err(ConfigError::InvalidValue {
                field: "harvest_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(Self {
            min_invest_amount,
            harvest_interval,
        })
    }

    #[must_use]
    pub fn min_invest_amount(&self) -> Amount {
        self.min_invest_amount
    }

    #[must_use]
    pub fn harvest_interval(&self) -> Duration {
        self.harvest_interval
    }

    /// Idle balance is worth depositing.
    #[must_use]
    pub fn should_invest(&self, idle: Amount) -> bool {
        idle > Decimal::ZERO && idle > self.min_invest_amount
    }

    /// The harvest interval has fully elapsed since `last_report`.
    ///
    /// A clock reading earlier than `last_report` never triggers.
    #[must_use]
    pub fn should_harvest(&self, last_report: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= last_report && now - last_report >= self.harvest_interval
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            min_invest_amount: Decimal::ZERO,
            harvest_interval: Duration::seconds(DEFAULT_HARVEST_INTERVAL_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn invest_needs_positive_idle_above_threshold() {
        let policy = TriggerPolicy::default();
        assert!(!policy.should_invest(dec!(0)));
        assert!(policy.should_invest(dec!(1)));

        let policy = TriggerPolicy::try_new(dec!(100), Duration::hours(1)).unwrap();
        assert!(!policy.should_invest(dec!(100)));
        assert!(policy.should_invest(dec!(101)));
    }

    #[test]
    fn harvest_fires_at_exactly_the_interval() {
        let policy = TriggerPolicy::default();
        let day = Duration::seconds(DEFAULT_HARVEST_INTERVAL_SECS);

        assert!(!policy.should_harvest(t0(), t0() + day - Duration::seconds(1)));
        assert!(policy.should_harvest(t0(), t0() + day));
    }

    #[test]
    fn clock_behind_last_report_never_fires() {
        let policy = TriggerPolicy::try_new(dec!(0), Duration::seconds(1)).unwrap();
        assert!(!policy.should_harvest(t0(), t0() - Duration::days(3)));
    }

    #[test]
    fn malformed_policy_is_rejected() {
        assert!(TriggerPolicy::try_new(dec!(-1), Duration::hours(1)).is_err());
        assert!(TriggerPolicy::try_new(dec!(0), Duration::zero()).is_err());
    }
}
