//! Distributed store on the Consul KV HTTP API.
//!
//! Records live at `/v1/kv/<namespace>/<id>`. The key's `ModifyIndex` is the
//! revision, and conditional operations use Consul's `?cas=` check-and-set.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{decode_record, encode_record, Revision, SecretStore, StoredSecret};
use crate::error::{Result, SecretError};
use crate::types::Secret;

/// One entry of a Consul KV read response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvPair {
    value: Option<String>,
    modify_index: u64,
}

/// Secrets stored as Consul KV entries.
pub struct ConsulSecretStore {
    client: Client,
    base_url: Url,
    namespace: String,
    token: Option<String>,
    datacenter: Option<String>,
}

impl ConsulSecretStore {
    /// Build a store against the agent at `address` (e.g. `http://127.0.0.1:8500`).
    pub fn new(address: &str, namespace: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SecretError::storage("connect", e))?;

        let base_url = Url::parse(address).map_err(|e| SecretError::storage("connect", e))?;
        if base_url.cannot_be_a_base() {
            return Err(SecretError::storage(
                "connect",
                format!("consul address '{address}' is not an http url"),
            ));
        }

        Ok(Self {
            client,
            base_url,
            namespace: namespace.into(),
            token: None,
            datacenter: None,
        })
    }

    /// Send this ACL token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_datacenter(mut self, dc: impl Into<String>) -> Self {
        self.datacenter = Some(dc.into());
        self
    }

    /// URL of the key for `id`, with the namespace and id each escaped as a
    /// single path segment. `None` when `id` cannot name a key in this
    /// namespace.
    fn key_url(&self, id: &str) -> Option<Url> {
        // Dot segments are dropped by the url crate and would address the
        // namespace itself.
        if matches!(id, "" | "." | "..") {
            return None;
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["v1", "kv", self.namespace.as_str(), id]);
        Some(url)
    }

    fn write_url(&self, id: &str) -> Result<Url> {
        self.key_url(id)
            .ok_or_else(|| SecretError::storage("write", format!("'{id}' is not a valid key")))
    }

    fn decorate(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.header("X-Consul-Token", token);
        }
        if let Some(dc) = &self.datacenter {
            request = request.query(&[("dc", dc)]);
        }
        request
    }

    /// Send a mutating request and interpret Consul's `true`/`false` body.
    async fn send_bool(&self, op: &'static str, request: RequestBuilder) -> Result<bool> {
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(|e| SecretError::storage(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::storage(op, format!("consul returned {status}: {body}")));
        }

        response
            .json::<bool>()
            .await
            .map_err(|e| SecretError::storage(op, e))
    }
}

#[async_trait]
impl SecretStore for ConsulSecretStore {
    async fn write(&self, secret: &Secret) -> Result<()> {
        let body = encode_record(secret)?;
        let request = self.client.put(self.write_url(&secret.id)?).body(body);

        if !self.send_bool("write", request).await? {
            return Err(SecretError::storage("write", "consul rejected the write"));
        }
        debug!(id = %secret.id, "consul write");
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<StoredSecret> {
        let url = self
            .key_url(id)
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;
        let request = self.decorate(self.client.get(url));
        let response = request
            .send()
            .await
            .map_err(|e| SecretError::storage("read", e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(SecretError::NotFound(id.to_string())),
            status if !status.is_success() => {
                return Err(SecretError::storage(
                    "read",
                    format!("consul returned {status}"),
                ))
            }
            _ => {}
        }

        let pairs: Vec<KvPair> = response
            .json()
            .await
            .map_err(|e| SecretError::storage("read", e))?;

        let pair = pairs
            .into_iter()
            .next()
            .ok_or_else(|| SecretError::NotFound(id.to_string()))?;
        let encoded = pair
            .value
            .ok_or_else(|| SecretError::storage("read", "consul key has no value"))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| SecretError::storage("read", e))?;

        Ok(StoredSecret {
            record: decode_record(&bytes)?,
            revision: pair.modify_index,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let Some(url) = self.key_url(id) else {
            return Ok(());
        };
        let request = self.client.delete(url);
        self.send_bool("delete", request).await?;
        Ok(())
    }

    async fn write_if(&self, secret: &Secret, revision: Revision) -> Result<()> {
        let body = encode_record(secret)?;
        let request = self
            .client
            .put(self.write_url(&secret.id)?)
            .query(&[("cas", revision)])
            .body(body);

        if !self.send_bool("write", request).await? {
            return Err(SecretError::StaleWrite(secret.id.clone()));
        }
        Ok(())
    }

    async fn delete_if(&self, id: &str, revision: Revision) -> Result<()> {
        let url = self
            .key_url(id)
            .ok_or_else(|| SecretError::StaleWrite(id.to_string()))?;
        let request = self
            .client
            .delete(url)
            .query(&[("cas", revision)]);

        if !self.send_bool("delete", request).await? {
            return Err(SecretError::StaleWrite(id.to_string()));
        }
        Ok(())
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn backend_name(&self) -> &'static str {
        "consul"
    }
}

/// A minimal in-process stand-in for the Consul KV endpoints.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Bytes;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::Deserialize;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Kv {
        entries: HashMap<String, (Vec<u8>, u64)>,
        index: u64,
    }

    #[derive(Clone)]
    struct FakeState {
        kv: Arc<Mutex<Kv>>,
        token: Option<String>,
    }

    #[derive(Deserialize)]
    struct KvQuery {
        cas: Option<u64>,
    }

    fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
        match &state.token {
            None => true,
            Some(expected) => headers
                .get("X-Consul-Token")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == expected)
                .unwrap_or(false),
        }
    }

    async fn get_key(
        State(state): State<FakeState>,
        headers: HeaderMap,
        Path(key): Path<String>,
    ) -> Response {
        if !authorized(&state, &headers) {
            return StatusCode::FORBIDDEN.into_response();
        }
        let kv = state.kv.lock().await;
        match kv.entries.get(&key) {
            Some((bytes, index)) => Json(serde_json::json!([{
                "Key": key,
                "Value": STANDARD.encode(bytes),
                "ModifyIndex": index,
                "CreateIndex": index,
                "Flags": 0,
            }]))
            .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn put_key(
        State(state): State<FakeState>,
        headers: HeaderMap,
        Path(key): Path<String>,
        Query(query): Query<KvQuery>,
        body: Bytes,
    ) -> Response {
        if !authorized(&state, &headers) {
            return StatusCode::FORBIDDEN.into_response();
        }
        let mut kv = state.kv.lock().await;
        if let Some(cas) = query.cas {
            let current = kv.entries.get(&key).map(|(_, i)| *i).unwrap_or(0);
            if current != cas {
                return Json(false).into_response();
            }
        }
        kv.index += 1;
        let index = kv.index;
        kv.entries.insert(key, (body.to_vec(), index));
        Json(true).into_response()
    }

    async fn delete_key(
        State(state): State<FakeState>,
        headers: HeaderMap,
        Path(key): Path<String>,
        Query(query): Query<KvQuery>,
    ) -> Response {
        if !authorized(&state, &headers) {
            return StatusCode::FORBIDDEN.into_response();
        }
        let mut kv = state.kv.lock().await;
        if let Some(cas) = query.cas {
            let current = kv.entries.get(&key).map(|(_, i)| *i).unwrap_or(0);
            if current != cas {
                return Json(false).into_response();
            }
        }
        kv.entries.remove(&key);
        Json(true).into_response()
    }

    /// Serve a fake KV on an ephemeral port and return its base URL.
    pub async fn spawn(token: Option<&str>) -> String {
        let state = FakeState {
            kv: Arc::new(Mutex::new(Kv::default())),
            token: token.map(str::to_string),
        };
        let app = Router::new()
            .route("/v1/kv/*key", get(get_key).put(put_key).delete(delete_key))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}
