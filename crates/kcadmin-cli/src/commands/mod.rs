//! Subcommand implementations.

pub mod config;
pub mod groups;
pub mod request;
pub mod token;
pub mod users;
