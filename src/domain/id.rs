//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Account identifier (a strategy, a vault, a venue or any external holder).
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an AccountId, rejecting blank input.
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyIdentifier { kind: "account" });
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Token identifier - newtype for type safety.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new TokenId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the token ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_new_and_as_str() {
        let id = AccountId::new("vault-1");
        assert_eq!(id.as_str(), "vault-1");
    }

    #[test]
    fn account_id_try_new_rejects_blank() {
        assert_eq!(
            AccountId::try_new("  "),
            Err(DomainError::EmptyIdentifier { kind: "account" })
        );
        assert!(AccountId::try_new("0xabc").is_ok());
    }

    #[test]
    fn account_id_display() {
        let id = AccountId::from("strategy-a");
        assert_eq!(format!("{}", id), "strategy-a");
    }

    #[test]
    fn token_id_from_str() {
        let id = TokenId::from("dai");
        assert_eq!(id.as_str(), "dai");
    }
}
