//! HTTP API server for Ephemera.
//!
//! Exposes secret creation and one-time lookup as JSON endpoints and maps
//! lifecycle errors onto HTTP status codes.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::GatewayError;
pub use server::{Gateway, GatewayConfig, GatewayState};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
