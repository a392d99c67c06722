//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod clock;
pub mod token;
pub mod vault;
pub mod venue;

pub use clock::Clock;
pub use token::TokenLedger;
pub use vault::VaultPort;
pub use venue::{LendingVenue, Settlement, WithdrawRequest};
