//! HTTP client for a running Ephemera server.

use ephemera_secrets::{IdPassword, TextViews};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors surfaced to CLI users.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("incorrect id/password")]
    Unauthorized,

    #[error("secret not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("server returned {0}")]
    Server(StatusCode),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server address: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin wrapper over the `/api/secret` endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn endpoint(&self) -> Result<Url, ClientError> {
        Ok(self.base.join("api/secret")?)
    }

    /// Store `text` for `views` reads.
    pub async fn create(&self, text: &str, views: i64) -> Result<IdPassword, ClientError> {
        let body = TextViews {
            text: text.to_string(),
            views,
        };
        let response = self.http.post(self.endpoint()?).json(&body).send().await?;
        Ok(check_response(response).await?.json().await?)
    }

    /// Reveal the secret `id`, consuming one view.
    pub async fn lookup(&self, id: &str, password: &str) -> Result<TextViews, ClientError> {
        let response = self
            .http
            .get(self.endpoint()?)
            .query(&[("id", id)])
            .header("X-Password", password)
            .send()
            .await?;
        Ok(check_response(response).await?.json().await?)
    }
}

/// Map non-success statuses onto [`ClientError`].
async fn check_response(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST => {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| "bad request".to_string());
            ClientError::BadRequest(message)
        }
        other => ClientError::Server(other),
    })
}
