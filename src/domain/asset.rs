//! Underlying asset ("want token") metadata.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::TokenId;
use super::money::{to_base_units, Amount};

/// Largest precision supported by `Decimal` base-unit arithmetic.
pub const MAX_DECIMALS: u32 = 24;

/// The asset a strategy manages and returns to its vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    token: TokenId,
    symbol: String,
    decimals: u32,
}

impl Asset {
    /// Create a validated asset description.
    pub fn try_new(
        token: TokenId,
        symbol: impl Into<String>,
        decimals: u32,
    ) -> Result<Self, DomainError> {
        let symbol = symbol.into();
        if token.as_str().trim().is_empty() {
            return Err(DomainError::EmptyIdentifier { kind: "token" });
        }
        if symbol.trim().is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        if decimals > MAX_DECIMALS {
            return Err(DomainError::TooManyDecimals {
                decimals,
                max: MAX_DECIMALS,
            });
        }
        Ok(Self {
            token,
            symbol,
            decimals,
        })
    }

    /// Token identifier on the token ledger.
    #[must_use]
    pub fn token(&self) -> &TokenId {
        &self.token
    }

    /// Ticker symbol, for logs.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of decimals in one whole token.
    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Convert a whole-token quantity into base units.
    pub fn units(&self, tokens: Decimal) -> Result<Amount, DomainError> {
        to_base_units(tokens, self.decimals).ok_or(DomainError::AmountOutOfRange {
            tokens,
            decimals: self.decimals,
        })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn try_new_validates_inputs() {
        assert_eq!(
            Asset::try_new(TokenId::new(""), "DAI", 18),
            Err(DomainError::EmptyIdentifier { kind: "token" })
        );
        assert_eq!(
            Asset::try_new(TokenId::new("dai"), " ", 18),
            Err(DomainError::EmptySymbol)
        );
        assert!(Asset::try_new(TokenId::new("usdc"), "USDC", 6).is_ok());
    }

    #[test]
    fn units_uses_asset_precision() {
        let usdc = Asset::try_new(TokenId::new("usdc"), "USDC", 6).unwrap();
        assert_eq!(usdc.units(dec!(2.5)), Ok(dec!(2_500_000)));
        assert_eq!(usdc.to_string(), "USDC");

        let dai = Asset::try_new(TokenId::new("dai"), "DAI", 18).unwrap();
        assert!(matches!(
            dai.units(dec!(100_000_000_000)),
            Err(DomainError::AmountOutOfRange { decimals: 18, .. })
        ));
    }
}
