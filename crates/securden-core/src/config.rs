//! Connection settings for the Securden server.
//!
//! The server URL and auth token are read once at startup into an
//! [`AuthContext`]. The value has no setters; the client shares it behind an
//! `Arc` so every request sees the same settings.

use std::fmt;

use crate::error::SecurdenError;

/// Environment variable holding the Securden server base URL.
pub const SERVER_URL_ENV: &str = "SECURDEN_SERVER_URL";

/// Environment variable holding the Securden API auth token.
pub const AUTH_TOKEN_ENV: &str = "SECURDEN_AUTHTOKEN";

/// Server base URL plus the token sent in the `authtoken` header.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    server_url: String,
    auth_token: String,
}

impl AuthContext {
    /// Build a context from explicit values.
    ///
    /// Trailing slashes are stripped from the URL so endpoint paths can be
    /// appended directly.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Config`] if either value is empty or the URL
    /// does not parse.
    pub fn new(
        server_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, SecurdenError> {
        let server_url = server_url.into();
        let auth_token = auth_token.into();

        let server_url = server_url.trim().trim_end_matches('/');
        if server_url.is_empty() {
            return Err(SecurdenError::Config(format!(
                "missing server_url — set {SERVER_URL_ENV} or pass --server-url"
            )));
        }
        reqwest::Url::parse(server_url).map_err(|e| {
            SecurdenError::Config(format!("invalid server_url '{server_url}': {e}"))
        })?;
        let auth_token = auth_token.trim();
        if auth_token.is_empty() {
            return Err(SecurdenError::Config(format!(
                "missing authtoken — set {AUTH_TOKEN_ENV} or pass --authtoken"
            )));
        }

        Ok(Self {
            server_url: server_url.to_owned(),
            auth_token: auth_token.to_owned(),
        })
    }

    /// Load from `SECURDEN_SERVER_URL` and `SECURDEN_AUTHTOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Config`] if either variable is unset or empty.
    pub fn from_env() -> Result<Self, SecurdenError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Config`] if either key is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecurdenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(SERVER_URL_ENV).unwrap_or_default();
        let auth_token = lookup(AUTH_TOKEN_ENV).unwrap_or_default();
        Self::new(server_url, auth_token)
    }

    /// Base URL without a trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Value of the `authtoken` header.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("server_url", &self.server_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}
