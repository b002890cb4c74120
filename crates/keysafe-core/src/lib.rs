//! # keysafe-core
//!
//! Core types, configuration, and utilities for Keysafe.
//!
//! This crate provides shared functionality used across all Keysafe crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the json5 config file
//! - **Types**: Owner identifiers and zeroizing secret strings
//! - **Utilities**: Path resolution

pub mod config;
pub mod error;
pub mod id;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use id::OwnerId;
pub use secret::SecretString;
