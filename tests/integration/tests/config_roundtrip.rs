//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values.

use ephemera_core::config::{Config, StorageBackend, ViewAccounting};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ephemera.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, config.server.port);
    assert_eq!(loaded.server.bind, config.server.bind);
    assert_eq!(loaded.storage.backend, config.storage.backend);
    assert_eq!(loaded.storage.namespace, config.storage.namespace);
    assert_eq!(loaded.secrets.max_text_len, config.secrets.max_text_len);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ephemera.json5");

    let mut config = Config::default();
    config.server.port = 9090;
    config.storage.backend = StorageBackend::Consul;
    config.storage.consul.token = Some("acl".to_string());
    config.secrets.view_accounting = ViewAccounting::Relaxed;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 9090);
    assert_eq!(loaded.storage.backend, StorageBackend::Consul);
    assert_eq!(loaded.storage.consul.token.as_deref(), Some("acl"));
    assert_eq!(loaded.secrets.view_accounting, ViewAccounting::Relaxed);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/ephemera.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}
