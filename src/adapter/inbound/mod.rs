//! Inbound adapters: ways in to the application.

pub mod cli;
