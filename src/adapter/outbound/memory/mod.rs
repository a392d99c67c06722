//! In-memory implementations of the outbound ports.
//!
//! Used by the simulator and the test suite. The lending pool follows the
//! usual index-based design: receipt balances are stored scaled by a
//! liquidity index that only grows, and redemption value is
//! `scaled * index` rounded down to whole base units.

mod pool;
mod token;
mod vault;

pub use pool::{Fault, InMemoryLendingPool};
pub use token::InMemoryToken;
pub use vault::InMemoryVault;
