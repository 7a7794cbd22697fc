//! Request handlers for the secret API.

use crate::error::GatewayError;
use crate::server::{GatewayState, PASSWORD_HEADER};
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use ephemera_secrets::{IdPassword, TextViews};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `POST /api/secret`
pub async fn create_secret(
    State(state): State<Arc<GatewayState>>,
    payload: std::result::Result<Json<TextViews>, JsonRejection>,
) -> Result<Json<IdPassword>> {
    let Json(request) = payload.map_err(|e| GatewayError::BadRequest(e.body_text()))?;

    let created = state
        .service
        .add_secret(&request.text, request.views)
        .await?;

    Ok(Json(IdPassword {
        id: created.id,
        password: created.password,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub id: String,
}

/// `GET /api/secret?id=<id>` with the password in `X-Password`.
pub async fn get_secret(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<LookupQuery>,
    headers: HeaderMap,
) -> Result<Json<TextViews>> {
    if query.id.is_empty() {
        return Err(GatewayError::BadRequest("missing id".to_string()));
    }

    let password = headers
        .get(PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let secret = state.service.get_secret(&query.id, password).await?;
    Ok(Json(secret.into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub namespace: String,
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<GatewayState>>) -> Json<HealthResponse> {
    let store = state.service.store();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: store.backend_name().to_string(),
        namespace: store.namespace().to_string(),
    })
}
