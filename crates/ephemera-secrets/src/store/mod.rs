//! Secret storage backends.
//!
//! [`SecretStore`] is the capability every backend offers: upsert, exact-key
//! read and idempotent delete, plus conditional variants keyed on the
//! revision a read observed. Backends never see plaintext or passwords; the
//! shared [`encode_record`] blanks the password before anything is
//! serialized.

mod consul;
mod memory;
mod sqlite;

pub use consul::ConsulSecretStore;
pub use memory::MemorySecretStore;
pub use sqlite::SqliteSecretStore;

#[cfg(test)]
pub(crate) use consul::fake as consul_fake;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ephemera_core::config::{StorageBackend, StorageConfig};
use ephemera_core::SecretString;
use tracing::info;

use crate::error::{Result, SecretError};
use crate::types::Secret;

/// Opaque per-record version assigned by a backend.
///
/// Changes on every successful write. Only meaningful when handed back to the
/// backend that produced it.
pub type Revision = u64;

/// A record as read from storage, with the revision it was read at.
#[derive(Debug, Clone)]
pub struct StoredSecret {
    pub record: Secret,
    pub revision: Revision,
}

/// Async trait for secret storage backends.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Insert or replace the record keyed by `secret.id`.
    async fn write(&self, secret: &Secret) -> Result<()>;

    /// Fetch a record by id. Missing ids yield [`SecretError::NotFound`].
    async fn read(&self, id: &str) -> Result<StoredSecret>;

    /// Remove a record. Deleting a missing id succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Replace the record only if it is still at `revision`.
    async fn write_if(&self, secret: &Secret, revision: Revision) -> Result<()>;

    /// Remove the record only if it is still at `revision`.
    async fn delete_if(&self, id: &str, revision: Revision) -> Result<()>;

    /// Logical namespace this store was opened with.
    fn namespace(&self) -> &str;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Serialize a record for storage with its password stripped.
pub fn encode_record(secret: &Secret) -> Result<Vec<u8>> {
    let mut record = secret.clone();
    record.password = SecretString::default();
    serde_json::to_vec(&record).map_err(|e| SecretError::storage("encode", e))
}

pub fn decode_record(bytes: &[u8]) -> Result<Secret> {
    serde_json::from_slice(bytes).map_err(|e| SecretError::storage("decode", e))
}

/// Open the backend named by `config`.
pub async fn connect(
    config: &StorageConfig,
    sqlite_path: &std::path::Path,
) -> Result<Arc<dyn SecretStore>> {
    let namespace = config.namespace.clone();

    let store: Arc<dyn SecretStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemorySecretStore::new(namespace)),
        StorageBackend::Sqlite => Arc::new(SqliteSecretStore::open(sqlite_path, namespace).await?),
        StorageBackend::Consul => {
            let consul = &config.consul;
            let mut store = ConsulSecretStore::new(
                &consul.address,
                namespace,
                Duration::from_secs(consul.timeout_secs),
            )?;
            if let Some(token) = &consul.token {
                store = store.with_token(token.clone());
            }
            if let Some(dc) = &consul.datacenter {
                store = store.with_datacenter(dc.clone());
            }
            Arc::new(store)
        }
    };

    info!(
        backend = store.backend_name(),
        namespace = store.namespace(),
        "secret store ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_record_strips_password() {
        let secret = Secret {
            id: "abc".into(),
            text: "ciphertext".into(),
            password: SecretString::new("0123456789abcdef0123"),
            views: 2,
        };

        let bytes = encode_record(&secret).unwrap();
        let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(raw.get("password").is_none());

        let decoded = decode_record(&bytes).unwrap();
        assert_eq!(decoded.id, "abc");
        assert_eq!(decoded.views, 2);
        assert!(decoded.password.is_empty());
    }

    #[test]
    fn test_decode_record_garbage() {
        assert!(matches!(
            decode_record(b"not json"),
            Err(SecretError::Storage { op: "decode", .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            namespace: "ns".into(),
            ..Default::default()
        };
        let store = connect(&config, std::path::Path::new("unused.db"))
            .await
            .unwrap();
        assert_eq!(store.namespace(), "ns");
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_connect_sqlite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = StorageConfig::default();
        let store = connect(&config, &tmp.path().join("data").join("e.db"))
            .await
            .unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(store.namespace(), "secrets");
    }
}
