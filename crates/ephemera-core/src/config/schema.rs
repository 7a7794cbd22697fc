//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Ephemera configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend selection.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Secret lifecycle settings.
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Attach a CORS layer to the router.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::default(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_port() -> u16 {
    8080
}

/// Bind mode for the HTTP server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to loopback only (127.0.0.1).
    #[default]
    Loopback,

    /// Bind to all interfaces.
    Lan,
}

impl std::str::FromStr for BindMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loopback" => Ok(Self::Loopback),
            "lan" => Ok(Self::Lan),
            other => Err(format!(
                "invalid bind mode '{}', expected loopback or lan",
                other
            )),
        }
    }
}

/// Storage configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to open at startup.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Logical namespace every record lives under.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Embedded SQLite settings.
    #[serde(default)]
    pub sqlite: SqliteConfig,

    /// Consul KV settings.
    #[serde(default)]
    pub consul: ConsulConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            namespace: default_namespace(),
            sqlite: SqliteConfig::default(),
            consul: ConsulConfig::default(),
        }
    }
}

fn default_namespace() -> String {
    "secrets".to_string()
}

/// Storage backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Embedded single-file SQLite database.
    #[default]
    Sqlite,

    /// Consul KV over HTTP.
    Consul,

    /// Process-local map; contents are lost on exit.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Consul => "consul",
            Self::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "consul" => Ok(Self::Consul),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "invalid storage backend '{}', expected sqlite, consul or memory",
                other
            )),
        }
    }
}

/// SQLite backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file. Defaults to `~/.ephemera/ephemera.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Consul KV backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsulConfig {
    /// Agent HTTP address.
    #[serde(default = "default_consul_address")]
    pub address: String,

    /// ACL token sent as `X-Consul-Token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Datacenter to target; the agent's own when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_consul_timeout")]
    pub timeout_secs: u64,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: default_consul_address(),
            token: None,
            datacenter: None,
            timeout_secs: default_consul_timeout(),
        }
    }
}

fn default_consul_address() -> String {
    "http://127.0.0.1:8500".to_string()
}

fn default_consul_timeout() -> u64 {
    5
}

/// Secret lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Maximum plaintext length in bytes accepted at creation.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// How view decrements are written back.
    #[serde(default)]
    pub view_accounting: ViewAccounting,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            max_text_len: default_max_text_len(),
            view_accounting: ViewAccounting::default(),
        }
    }
}

fn default_max_text_len() -> usize {
    100
}

/// How a read's view decrement is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAccounting {
    /// Write back only if the record is unchanged since it was read.
    /// Concurrent readers of the last view cannot both succeed.
    #[default]
    Strict,

    /// Unconditional write back. Two concurrent readers may both consume
    /// the same view.
    Relaxed,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_true() -> bool {
    true
}
