//! One-time secrets for Ephemera.
//!
//! Text is encrypted under a generated password with AES-256-GCM, stored
//! through a pluggable [`SecretStore`], and destroyed once its view budget
//! is spent. [`SecretService`] drives that lifecycle.

pub mod crypto;
pub mod error;
pub mod lifecycle;
pub mod store;
pub mod types;

pub use error::{ErrorKind, Result, SecretError};
pub use lifecycle::SecretService;
pub use store::{
    ConsulSecretStore, MemorySecretStore, Revision, SecretStore, SqliteSecretStore, StoredSecret,
};
pub use types::{IdPassword, Secret, TextViews};
