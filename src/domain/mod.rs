//! Venue-agnostic domain types.
//!
//! Identifiers, amounts, asset metadata, position snapshots and the reports a
//! strategy produces. Nothing in here performs I/O.

pub mod asset;
pub mod error;
pub mod id;
pub mod money;
pub mod position;
pub mod report;

pub use asset::Asset;
pub use error::DomainError;
pub use id::{AccountId, TokenId};
pub use money::{Amount, Rate};
pub use position::{PositionSnapshot, Region};
pub use report::{HarvestReport, InvestOutcome, MigrationReport, MigrationMode};
