//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Environment variable names read by Ephemera.
pub mod vars {
    /// Base directory override.
    pub const EPHEMERA_HOME: &str = "EPHEMERA_HOME";

    /// Config file override.
    pub const EPHEMERA_CONFIG: &str = "EPHEMERA_CONFIG";

    /// Server address used by the client commands.
    pub const EPHEMERA_SERVER: &str = "EPHEMERA_SERVER";

    /// HTTP port override.
    pub const EPHEMERA_PORT: &str = "EPHEMERA_PORT";

    /// Storage backend override (sqlite, consul, memory).
    pub const EPHEMERA_BACKEND: &str = "EPHEMERA_BACKEND";

    /// SQLite database path override.
    pub const EPHEMERA_DB_PATH: &str = "EPHEMERA_DB_PATH";

    /// Consul agent address override.
    pub const EPHEMERA_CONSUL_ADDR: &str = "EPHEMERA_CONSUL_ADDR";

    /// Consul ACL token.
    pub const EPHEMERA_CONSUL_TOKEN: &str = "EPHEMERA_CONSUL_TOKEN";
}
