//! HTTP transport for the Securden API.
//!
//! One request, one response body. The transport attaches the `authtoken`
//! header, encodes query parameters or the JSON body, and hands back the raw
//! bytes. It never looks at the HTTP status; the JSON envelope's
//! `status_code` is what counts, and that is the decoder's job.

use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use crate::config::AuthContext;
use crate::error::SecurdenError;

/// Header carrying the API token on every request.
pub const AUTH_HEADER: &str = "authtoken";

/// A single outbound API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// `GET {base}{path}?{query}`. Pairs with empty values are dropped.
    Get {
        path: &'static str,
        query: Vec<(&'static str, String)>,
    },
    /// `POST {base}{path}` with a JSON object body.
    Post {
        path: &'static str,
        body: serde_json::Value,
    },
}

impl ApiRequest {
    /// Endpoint path, relative to the server base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Get { path, .. } | Self::Post { path, .. } => path,
        }
    }
}

/// Issues API requests and returns raw response bodies.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and read the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Transport`] if the request cannot be built,
    /// the network call fails, or the body cannot be read.
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, SecurdenError>;
}

/// Join the base URL and path, then append every non-empty query pair.
///
/// # Errors
///
/// Returns [`SecurdenError::Config`] if the base URL does not parse.
pub fn build_url(
    base_url: &str,
    path: &str,
    query: &[(&str, String)],
) -> Result<Url, SecurdenError> {
    let mut url = Url::parse(&format!("{base_url}{path}"))
        .map_err(|e| SecurdenError::Config(format!("invalid server_url '{base_url}': {e}")))?;
    let mut pairs = query.iter().filter(|(_, value)| !value.is_empty()).peekable();
    if pairs.peek().is_some() {
        url.query_pairs_mut().extend_pairs(pairs.map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    auth: Arc<AuthContext>,
}

impl HttpTransport {
    fn user_agent() -> String {
        format!("securden-core/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Create a transport using the client library's default timeouts and
    /// redirect handling.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Transport`] if the HTTP client cannot be built.
    pub fn new(auth: Arc<AuthContext>) -> Result<Self, SecurdenError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(SecurdenError::Transport)?;
        Ok(Self { http, auth })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, SecurdenError> {
        let builder = match &request {
            ApiRequest::Get { path, query } => {
                let url = build_url(self.auth.server_url(), path, query)?;
                debug!(method = "GET", path, params = query.len(), "securden request");
                self.http.get(url)
            }
            ApiRequest::Post { path, body } => {
                let url = build_url(self.auth.server_url(), path, &[])?;
                debug!(method = "POST", path, "securden request");
                // `.json` sets `content-type: application/json`.
                self.http.post(url).json(body)
            }
        };

        let resp = builder
            .header(AUTH_HEADER, self.auth.auth_token())
            .send()
            .await
            .map_err(SecurdenError::Transport)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(SecurdenError::Transport)?;
        debug!(
            path = request.path(),
            http_status = status.as_u16(),
            bytes = body.len(),
            "securden response"
        );
        Ok(body.to_vec())
    }
}
