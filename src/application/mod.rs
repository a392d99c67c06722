//! Application services (use cases).
//!
//! The strategy core: value conversion, venue access, the derived ledger,
//! the operation state machine, trigger policy and the keeper loop.

pub mod keeper;
pub mod ledger;
pub mod lock;
pub mod oracle;
pub mod strategy;
pub mod trigger;
pub mod venue;

pub use keeper::{Keeper, KeeperTick};
pub use ledger::StrategyLedger;
pub use lock::{ExecutionGuard, ExecutionLock};
pub use oracle::ValueOracle;
pub use strategy::{Strategy, StrategyParams};
pub use trigger::TriggerPolicy;
pub use venue::VenueAdapter;
