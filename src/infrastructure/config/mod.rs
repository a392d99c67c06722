//! Infrastructure configuration modules.

pub mod keeper;
pub mod logging;
pub mod settings;
pub mod simulation;
pub mod strategy;
