//! # ephemera-core
//!
//! Shared building blocks for the Ephemera crates:
//!
//! - **Configuration**: the JSON5 config schema, loading, validation and
//!   environment overrides
//! - **Paths**: resolution of the `~/.ephemera` directory layout
//! - **Secrets in memory**: [`SecretString`], a zeroizing, redacting string

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
