//! yieldkeeper - Lending-strategy accounting and lifecycle core.
//!
//! A strategy holds capital lent by a vault, deploys it into an external
//! lending venue, harvests the yield on a schedule, frees funds on demand and
//! can hand its whole position to a successor strategy. Every operation
//! either completes or leaves the strategy exactly as it was.
//!
//! # Architecture
//!
//! - [`domain`] - Identifiers, amounts, assets, balance snapshots and reports
//! - [`port`] - Traits the core consumes: lending venue, token ledger, vault, clock
//! - [`application`] - Strategy controller, venue adapter, triggers and keeper
//! - [`adapter`] - In-memory port implementations and the CLI
//! - [`infrastructure`] - Configuration, logging and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use yieldkeeper::infrastructure::bootstrap::Simulation;
//! use yieldkeeper::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> yieldkeeper::error::Result<()> {
//! let simulation = Simulation::build(Config::load("config.toml")?)?;
//! let summary = simulation.run().await?;
//! println!("harvested {} times", summary.harvests);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
