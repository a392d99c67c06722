//! Keeper loop configuration.

use std::time::Duration;

use serde::Deserialize;

use super::strategy::account;
use crate::domain::AccountId;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct KeeperConfig {
    /// Account the keeper calls the strategy as.
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_identity() -> String {
    "keeper".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl KeeperConfig {
    pub fn identity(&self) -> Result<AccountId> {
        account("keeper.identity", &self.identity)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
