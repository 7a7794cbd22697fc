//! Configuration loading and persistence.

use super::{Config, StorageBackend};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        paths::ensure_parent(path)?;

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path` if given, else the default location.
    ///
    /// A missing file yields defaults. A file that exists but fails to parse
    /// is an error. Environment overrides are applied either way.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match env::get_var(env::vars::EPHEMERA_CONFIG) {
                Some(p) => paths::expand_tilde(&p),
                None => paths::config_file()?,
            },
        };

        let mut config = match Self::load(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded configuration");
                config
            }
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `EPHEMERA_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = env::get_u16(env::vars::EPHEMERA_PORT) {
            self.server.port = port;
        }

        if let Some(backend) = env::get_var(env::vars::EPHEMERA_BACKEND) {
            match backend.parse::<StorageBackend>() {
                Ok(b) => self.storage.backend = b,
                Err(e) => warn!("ignoring {}: {}", env::vars::EPHEMERA_BACKEND, e),
            }
        }

        if let Some(path) = env::get_var(env::vars::EPHEMERA_DB_PATH) {
            self.storage.sqlite.path = Some(paths::expand_tilde(&path));
        }

        if let Some(addr) = env::get_var(env::vars::EPHEMERA_CONSUL_ADDR) {
            self.storage.consul.address = addr;
        }

        if let Some(token) = env::get_var(env::vars::EPHEMERA_CONSUL_TOKEN) {
            self.storage.consul.token = Some(token);
        }
    }

    /// SQLite file to open, falling back to the default data location.
    pub fn sqlite_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.sqlite.path {
            Some(path) => Ok(path.clone()),
            None => paths::default_db_file(),
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        let namespace = &self.storage.namespace;
        if namespace.is_empty() {
            errors.push("Storage namespace must not be empty".to_string());
        } else if !namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            errors.push(format!(
                "Storage namespace '{}' may only contain alphanumerics, '_' and '-'",
                namespace
            ));
        }

        if self.storage.backend == StorageBackend::Consul {
            let address = &self.storage.consul.address;
            if !(address.starts_with("http://") || address.starts_with("https://")) {
                errors.push(format!(
                    "Consul address '{}' must start with http:// or https://",
                    address
                ));
            }
            if self.storage.consul.timeout_secs == 0 {
                errors.push("Consul timeout must be greater than 0".to_string());
            }
        }

        if self.secrets.max_text_len == 0 {
            errors.push("secrets.max_text_len must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
