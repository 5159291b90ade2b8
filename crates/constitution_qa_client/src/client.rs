//! HTTP client for the question-answering backend: one `POST /api/v1/query` per question.

use async_trait::async_trait;
use url::Url;

use crate::messages::{QueryRequest, QueryResponse};

/// Path of the query endpoint, relative to the API base.
pub const QUERY_PATH: &str = "api/v1/query";

/// Client error. The session folds all of these into one user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can answer a [`QueryRequest`].
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;
}

/// reqwest-backed client for `{base}/api/v1/query`.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    http: reqwest::Client,
}

impl Client {
    /// Build a client for the API at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: query_endpoint(base_url)?,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Join the query path onto `base_url`, keeping any path prefix the base carries.
pub fn query_endpoint(base_url: &str) -> Result<Url, ClientError> {
    let mut base = Url::parse(base_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(QUERY_PATH)?)
}

#[async_trait]
impl QueryBackend for Client {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, document = %request.documents, "sending query");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(ClientError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "query rejected by server");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<QueryResponse>()
            .await
            .map_err(ClientError::Decode)?;
        tracing::debug!(
            answers = parsed.answers.as_ref().map_or(0, Vec::len),
            "query answered"
        );
        Ok(parsed)
    }
}
