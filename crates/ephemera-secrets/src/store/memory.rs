//! In-process secret store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{decode_record, encode_record, Revision, SecretStore, StoredSecret};
use crate::error::{Result, SecretError};
use crate::types::Secret;

/// Process-local store. Contents are lost when the process exits.
pub struct MemorySecretStore {
    namespace: String,
    entries: RwLock<HashMap<String, (Vec<u8>, Revision)>>,
    next_revision: AtomicU64,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new("secrets")
    }
}

impl MemorySecretStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(HashMap::new()),
            next_revision: AtomicU64::new(1),
        }
    }

    fn bump(&self) -> Revision {
        self.next_revision.fetch_add(1, Ordering::Relaxed)
    }

    /// Raw persisted bytes for `id`, if present.
    pub async fn raw(&self, id: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(id).map(|(bytes, _)| bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn write(&self, secret: &Secret) -> Result<()> {
        let bytes = encode_record(secret)?;
        let revision = self.bump();
        let mut entries = self.entries.write().await;
        entries.insert(secret.id.clone(), (bytes, revision));
        debug!(id = %secret.id, revision, "memory write");
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<StoredSecret> {
        let entries = self.entries.read().await;
        let (bytes, revision) = entries
            .get(id)
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;
        Ok(StoredSecret {
            record: decode_record(bytes)?,
            revision: *revision,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(id);
        Ok(())
    }

    async fn write_if(&self, secret: &Secret, revision: Revision) -> Result<()> {
        let bytes = encode_record(secret)?;
        let mut entries = self.entries.write().await;
        match entries.get(&secret.id) {
            Some((_, current)) if *current == revision => {
                let next = self.bump();
                entries.insert(secret.id.clone(), (bytes, next));
                Ok(())
            }
            _ => Err(SecretError::StaleWrite(secret.id.clone())),
        }
    }

    async fn delete_if(&self, id: &str, revision: Revision) -> Result<()> {
        let mut entries = self.entries.write().await;
        match entries.get(id) {
            Some((_, current)) if *current == revision => {
                entries.remove(id);
                Ok(())
            }
            _ => Err(SecretError::StaleWrite(id.to_string())),
        }
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
