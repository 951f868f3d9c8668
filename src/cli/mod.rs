//! CLI module for the entity-store-cli binary

pub mod commands;
pub mod error;
pub mod output;

pub use error::CliError;
