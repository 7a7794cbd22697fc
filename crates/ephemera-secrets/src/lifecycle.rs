//! Creation and one-time retrieval of secrets.
//!
//! [`SecretService`] is the only caller of the crypto and storage layers. It
//! validates input, encrypts under a freshly generated password, and on
//! retrieval decrements the view budget, destroying the record when the
//! budget is spent.

use std::sync::Arc;

use ephemera_core::config::{SecretsConfig, ViewAccounting};
use ephemera_core::SecretString;
use tracing::{debug, info, warn};

use crate::crypto;
use crate::error::{Result, SecretError};
use crate::store::SecretStore;
use crate::types::Secret;

/// Default cap on plaintext length, in bytes.
pub const DEFAULT_MAX_TEXT_LEN: usize = 100;

/// Orchestrates the secret lifecycle over an injected store.
#[derive(Clone)]
pub struct SecretService {
    store: Arc<dyn SecretStore>,
    max_text_len: usize,
    accounting: ViewAccounting,
}

impl SecretService {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            accounting: ViewAccounting::default(),
        }
    }

    pub fn from_config(store: Arc<dyn SecretStore>, config: &SecretsConfig) -> Self {
        Self::new(store)
            .with_max_text_len(config.max_text_len)
            .with_view_accounting(config.view_accounting)
    }

    pub fn with_max_text_len(mut self, max: usize) -> Self {
        self.max_text_len = max;
        self
    }

    pub fn with_view_accounting(mut self, accounting: ViewAccounting) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    pub fn view_accounting(&self) -> ViewAccounting {
        self.accounting
    }

    /// Encrypt and store `text`, readable `views` times.
    ///
    /// The returned secret carries the id and the one-time password; its
    /// text is empty. The password exists nowhere else.
    pub async fn add_secret(&self, text: &str, views: i64) -> Result<Secret> {
        if text.len() > self.max_text_len {
            return Err(SecretError::Validation("message too long".to_string()));
        }
        if views < 1 {
            return Err(SecretError::Validation("views must be positive".to_string()));
        }
        let views = u32::try_from(views)
            .map_err(|_| SecretError::Validation("views out of range".to_string()))?;

        let id = crypto::new_secret_id();
        let password = SecretString::new(crypto::random_token(crypto::PASSWORD_BYTES)?);

        let blob = crypto::encrypt(text.as_bytes(), password.expose_secret())?;

        let mut secret = Secret {
            id,
            text: crypto::to_base64(&blob),
            password: SecretString::default(),
            views,
        };
        self.store.write(&secret).await?;

        info!(id = %secret.id, views, "secret created");

        secret.text.clear();
        secret.password = password;
        Ok(secret)
    }

    /// Reveal a secret, consuming one view.
    ///
    /// Returns the plaintext and the views left after this read. When that
    /// reaches zero the record is gone.
    pub async fn get_secret(&self, id: &str, password: &str) -> Result<Secret> {
        if crypto::check_password_shape(password).is_err() {
            warn!(id, "rejected malformed password");
            return Err(SecretError::Authentication);
        }

        let stored = self.store.read(id).await?;
        let mut record = stored.record;

        let plaintext = crypto::from_base64(&record.text)
            .and_then(|blob| crypto::decrypt(&blob, password))
            .map_err(|_| {
                warn!(id, "decryption failed");
                SecretError::Authentication
            })?;
        let text = String::from_utf8(plaintext)
            .map_err(|e| SecretError::Crypto(format!("plaintext is not UTF-8: {e}")))?;

        record.id = id.to_string();
        record.views = record.views.saturating_sub(1);

        match (record.views, self.accounting) {
            (0, ViewAccounting::Strict) => self.store.delete_if(id, stored.revision).await?,
            (0, ViewAccounting::Relaxed) => self.store.delete(id).await?,
            (_, ViewAccounting::Strict) => self.store.write_if(&record, stored.revision).await?,
            (_, ViewAccounting::Relaxed) => self.store.write(&record).await?,
        }

        if record.views == 0 {
            info!(id, "secret destroyed after final view");
        } else {
            debug!(id, views = record.views, "secret viewed");
        }

        Ok(Secret {
            id: id.to_string(),
            text,
            password: SecretString::default(),
            views: record.views,
        })
    }
}
