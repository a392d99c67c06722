//! Results produced by state-changing strategy operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::AccountId;
use super::money::Amount;

/// Outcome of `invest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvestOutcome {
    /// No idle balance; nothing was sent to the venue.
    Skipped,
    /// Idle balance was deposited.
    Deposited {
        /// Want tokens moved into the venue.
        amount: Amount,
        /// Receipt tokens minted for them.
        receipt: Amount,
    },
}

impl InvestOutcome {
    /// Want tokens deposited, zero when skipped.
    #[must_use]
    pub fn deposited(&self) -> Amount {
        match self {
            Self::Skipped => Decimal::ZERO,
            Self::Deposited { amount, .. } => *amount,
        }
    }
}

/// What a harvest realized, as delivered to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Want tokens pulled out of the venue by this harvest.
    pub withdrawn: Amount,
    /// Strategy total after the harvest.
    pub total_assets: Amount,
    /// Vault debt the result is measured against.
    pub debt: Amount,
    /// Realized yield above the debt.
    pub gain: Amount,
    /// Shortfall below the debt. Reported, never hidden.
    pub loss: Amount,
    /// When the harvest completed.
    pub timestamp: DateTime<Utc>,
}

impl HarvestReport {
    /// Build a report by measuring `total_assets` against the vault's `debt`.
    #[must_use]
    pub fn against_debt(
        withdrawn: Amount,
        total_assets: Amount,
        debt: Amount,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (gain, loss) = if total_assets >= debt {
            (total_assets - debt, Decimal::ZERO)
        } else {
            (Decimal::ZERO, debt - total_assets)
        };
        Self {
            withdrawn,
            total_assets,
            debt,
            gain,
            loss,
            timestamp,
        }
    }
}

/// How a migration moves the deployed position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    /// Hand receipt tokens to the successor as they are.
    #[default]
    InKind,
    /// Redeem the deployed position first, then hand over want tokens only.
    Withdraw,
}

impl MigrationMode {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InKind => "in_kind",
            Self::Withdraw => "withdraw",
        }
    }
}

/// Result of moving a whole position to a successor strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// The successor strategy.
    pub target: AccountId,
    /// How the deployed side was moved.
    pub mode: MigrationMode,
    /// Source total (idle + deployed value) before the migration.
    pub value_before: Amount,
    /// Want tokens handed to the successor.
    pub want_transferred: Amount,
    /// Receipt tokens handed to the successor (zero in withdraw mode).
    pub receipt_transferred: Amount,
    /// Value lost redeeming the deployed position (withdraw mode only).
    pub realized_loss: Amount,
}
