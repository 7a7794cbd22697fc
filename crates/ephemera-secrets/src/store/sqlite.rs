//! Embedded single-file store on SQLite.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use super::{decode_record, encode_record, Revision, SecretStore, StoredSecret};
use crate::error::{Result, SecretError};
use crate::types::Secret;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS secrets (
    namespace TEXT NOT NULL,
    id        TEXT NOT NULL,
    body      BLOB NOT NULL,
    revision  INTEGER NOT NULL,
    PRIMARY KEY (namespace, id)
)
"#;

/// Secrets in one table of a local SQLite file, scoped by namespace.
pub struct SqliteSecretStore {
    pool: Pool<Sqlite>,
    namespace: String,
}

impl SqliteSecretStore {
    /// Open (creating if missing) the database at `path`.
    pub async fn open(path: &Path, namespace: impl Into<String>) -> Result<Self> {
        ephemera_core::paths::ensure_parent(path).map_err(|e| SecretError::storage("open", e))?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| SecretError::storage("open", e))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| SecretError::storage("migrate", e))?;

        debug!(path = %path.display(), "sqlite store opened");

        Ok(Self {
            pool,
            namespace: namespace.into(),
        })
    }
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
    async fn write(&self, secret: &Secret) -> Result<()> {
        let body = encode_record(secret)?;

        sqlx::query(
            r#"
            INSERT INTO secrets (namespace, id, body, revision)
            VALUES (?, ?, ?, 1)
            ON CONFLICT(namespace, id) DO UPDATE SET
                body = excluded.body,
                revision = secrets.revision + 1
            "#,
        )
        .bind(&self.namespace)
        .bind(&secret.id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| SecretError::storage("write", e))?;

        debug!(id = %secret.id, "sqlite write");
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<StoredSecret> {
        let row: Option<(Vec<u8>, i64)> =
            sqlx::query_as("SELECT body, revision FROM secrets WHERE namespace = ? AND id = ?")
                .bind(&self.namespace)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SecretError::storage("read", e))?;

        let (body, revision) = row.ok_or_else(|| SecretError::NotFound(id.to_string()))?;
        Ok(StoredSecret {
            record: decode_record(&body)?,
            revision: revision as Revision,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM secrets WHERE namespace = ? AND id = ?")
            .bind(&self.namespace)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SecretError::storage("delete", e))?;
        Ok(())
    }

    async fn write_if(&self, secret: &Secret, revision: Revision) -> Result<()> {
        let body = encode_record(secret)?;

        let result = sqlx::query(
            "UPDATE secrets SET body = ?, revision = revision + 1 \
             WHERE namespace = ? AND id = ? AND revision = ?",
        )
        .bind(body)
        .bind(&self.namespace)
        .bind(&secret.id)
        .bind(revision as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| SecretError::storage("write", e))?;

        if result.rows_affected() == 0 {
            return Err(SecretError::StaleWrite(secret.id.clone()));
        }
        Ok(())
    }

    async fn delete_if(&self, id: &str, revision: Revision) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM secrets WHERE namespace = ? AND id = ? AND revision = ?")
                .bind(&self.namespace)
                .bind(id)
                .bind(revision as i64)
                .execute(&self.pool)
                .await
                .map_err(|e| SecretError::storage("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(SecretError::StaleWrite(id.to_string()));
        }
        Ok(())
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
