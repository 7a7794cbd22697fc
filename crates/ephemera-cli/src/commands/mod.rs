//! CLI command implementations.

pub mod config;
pub mod create;
pub mod lookup;
pub mod start;
