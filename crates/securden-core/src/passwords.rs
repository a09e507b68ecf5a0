//! Batch password retrieval.
//!
//! Every identifier is validated before anything is sent: one bad id rejects
//! the whole batch. Ids the server leaves out of its answer are simply absent
//! from the result.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::envelope::{self, DecodeMode, null_as_default};
use crate::error::SecurdenError;
use crate::transport::{ApiRequest, Transport};

/// Batch password endpoint.
pub const MULTIPLE_PASSWORDS_PATH: &str = "/api/get_multiple_accounts_passwords";

/// Account id (decimal string) to password.
pub type PasswordBatch = HashMap<String, String>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PasswordsPayload {
    /// A `null` password reads as an empty string.
    #[serde(deserialize_with = "null_as_default")]
    passwords: HashMap<String, Option<String>>,
}

impl PasswordsPayload {
    fn into_batch(self) -> PasswordBatch {
        self.passwords
            .into_iter()
            .map(|(id, password)| (id, password.unwrap_or_default()))
            .collect()
    }
}

/// Parse every identifier as a base-10 integer.
///
/// # Errors
///
/// Returns [`SecurdenError::Validation`] for the first id that does not parse.
pub fn parse_account_ids<S: AsRef<str>>(ids: &[S]) -> Result<Vec<i64>, SecurdenError> {
    ids.iter()
        .map(|id| {
            id.as_ref().parse::<i64>().map_err(|e| {
                SecurdenError::Validation(format!("Invalid account ID format: {e}"))
            })
        })
        .collect()
}

/// Fetch the passwords of several accounts in one request.
///
/// # Errors
///
/// - [`SecurdenError::Validation`] if any id is not an integer (no request is sent).
/// - [`SecurdenError::Transport`] if the request fails.
/// - [`SecurdenError::Decode`] if the body is not valid JSON.
/// - [`SecurdenError::Api`] if the server's `status_code` is not 200.
pub async fn resolve_passwords<S: AsRef<str>>(
    transport: &dyn Transport,
    ids: &[S],
) -> Result<PasswordBatch, SecurdenError> {
    let account_ids = parse_account_ids(ids)?;
    let request = ApiRequest::Post {
        path: MULTIPLE_PASSWORDS_PATH,
        body: serde_json::json!({ "account_ids": account_ids }),
    };
    let body = transport.send(request).await?;
    let (payload, _message) =
        envelope::decode::<PasswordsPayload>(&body, DecodeMode::Strict)?.into_result()?;

    debug!(
        requested = account_ids.len(),
        returned = payload.passwords.len(),
        "resolved securden password batch"
    );
    Ok(payload.into_batch())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[test]
    fn parse_account_ids_accepts_integers() {
        assert_eq!(parse_account_ids(&["1", "-2", "300"]).unwrap(), vec![1, -2, 300]);
    }

    #[test]
    fn parse_account_ids_rejects_first_bad_id() {
        let err = parse_account_ids(&["1", "2", "x"]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().starts_with("Invalid account ID format: "));
    }

    #[tokio::test]
    async fn invalid_id_sends_nothing() {
        let transport = RecordingTransport::replying(r#"{"status_code":200}"#);
        let err = resolve_passwords(&transport, &["1", "2", "x"]).await.unwrap_err();
        assert!(matches!(err, SecurdenError::Validation(_)));
        assert_eq!(err.status_code(), 400);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn posts_numeric_ids() {
        let transport = RecordingTransport::replying(r#"{"status_code":200,"passwords":{}}"#);
        resolve_passwords(&transport, &["5", "6"]).await.unwrap();
        assert_eq!(
            transport.requests(),
            vec![ApiRequest::Post {
                path: MULTIPLE_PASSWORDS_PATH,
                body: serde_json::json!({ "account_ids": [5, 6] }),
            }]
        );
    }

    #[tokio::test]
    async fn partial_answer_is_not_an_error() {
        let transport =
            RecordingTransport::replying(r#"{"passwords":{"1":"p1"},"status_code":200}"#);
        let passwords = resolve_passwords(&transport, &["1", "2"]).await.unwrap();
        assert_eq!(passwords.len(), 1);
        assert_eq!(passwords.get("1").map(String::as_str), Some("p1"));
        assert!(!passwords.contains_key("2"));
    }

    #[tokio::test]
    async fn null_password_reads_as_empty() {
        let transport =
            RecordingTransport::replying(r#"{"status_code":200,"passwords":{"1":null,"2":"p2"}}"#);
        let passwords = resolve_passwords(&transport, &["1", "2"]).await.unwrap();
        assert_eq!(passwords.get("1").map(String::as_str), Some(""));
        assert_eq!(passwords.get("2").map(String::as_str), Some("p2"));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let transport = RecordingTransport::replying("<html>502 Bad Gateway</html>");
        let err = resolve_passwords(&transport, &["1"]).await.unwrap_err();
        assert!(matches!(err, SecurdenError::Decode(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn api_failure_prefers_nested_error() {
        let transport = RecordingTransport::replying(
            r#"{"status_code":401,"message":"Unauthorized",
                "error":{"code":"AUTH","message":"Invalid auth token"}}"#,
        );
        let err = resolve_passwords(&transport, &["1"]).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid auth token");
    }
}
