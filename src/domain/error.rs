//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate inputs.
//!
//! # Examples
//!
//! ```
//! use yieldkeeper::domain::{Asset, DomainError, TokenId};
//!
//! let result = Asset::try_new(TokenId::new("dai"), "DAI", 40);
//! assert!(matches!(result, Err(DomainError::TooManyDecimals { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identifiers must not be blank.
    #[error("{kind} identifier cannot be empty")]
    EmptyIdentifier {
        /// Which identifier was empty.
        kind: &'static str,
    },

    /// Asset symbols must not be blank.
    #[error("asset symbol cannot be empty")]
    EmptySymbol,

    /// Decimal precision above what base-unit arithmetic can represent.
    #[error("asset decimals {decimals} exceed the supported maximum of {max}")]
    TooManyDecimals {
        /// The rejected precision.
        decimals: u32,
        /// The largest supported precision.
        max: u32,
    },

    /// A whole-token quantity too large to express in base units.
    #[error("{tokens} tokens at {decimals} decimals exceeds the representable range")]
    AmountOutOfRange {
        /// The rejected quantity, in whole tokens.
        tokens: Decimal,
        /// Precision it was scaled by.
        decimals: u32,
    },
}
