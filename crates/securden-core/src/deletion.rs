//! Bulk account deletion.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::envelope::{self, DecodeMode, STATUS_OK, null_as_default};
use crate::error::SecurdenError;
use crate::transport::{ApiRequest, Transport};

/// Bulk deletion endpoint.
pub const DELETE_ACCOUNTS_PATH: &str = "/api/delete_accounts";

/// Optional modifiers for a deletion request.
///
/// Defaults are left to the server: `reason` is sent only when non-empty and
/// `delete_permanently` only when `permanent` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub reason: Option<String>,
    pub permanent: bool,
}

/// Outcome of a deletion request.
///
/// `deleted_ids` may be a strict subset of the requested ids when the server
/// refuses some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub message: String,
    pub deleted_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeletionPayload {
    #[serde(deserialize_with = "null_as_default")]
    deleted_accounts: Vec<i64>,
}

/// Build the request body, omitting modifiers left at their defaults.
fn request_body(ids: &[i64], options: &DeleteOptions) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("account_ids".to_owned(), serde_json::json!(ids));
    if let Some(reason) = options.reason.as_deref().filter(|r| !r.is_empty()) {
        body.insert("reason".to_owned(), serde_json::Value::from(reason));
    }
    if options.permanent {
        body.insert("delete_permanently".to_owned(), serde_json::Value::Bool(true));
    }
    serde_json::Value::Object(body)
}

/// What the server answered to a deletion request.
///
/// The report is kept whatever the status, so callers that accept a
/// status-0 answer still see the server's message and deleted ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub status_code: i64,
    /// Failure message (nested `error.message` first, then flat `message`).
    pub message: String,
    pub report: DeletionReport,
}

impl DeletionOutcome {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    /// The body carried no `status_code` at all.
    pub fn is_no_response(&self) -> bool {
        self.status_code == 0
    }

    /// Keep the report only for a 200 answer.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Api`] for any other status, 0 included.
    pub fn into_result(self) -> Result<DeletionReport, SecurdenError> {
        if self.is_success() {
            Ok(self.report)
        } else {
            Err(SecurdenError::Api {
                status_code: self.status_code,
                message: self.message,
            })
        }
    }
}

/// Delete several accounts in one request.
///
/// A non-200 status is not an error here; it comes back in the
/// [`DeletionOutcome`] alongside the decoded report.
///
/// # Errors
///
/// - [`SecurdenError::Transport`] if the request fails.
/// - [`SecurdenError::Decode`] if the body is not valid JSON.
pub async fn delete_accounts(
    transport: &dyn Transport,
    ids: &[i64],
    options: &DeleteOptions,
) -> Result<DeletionOutcome, SecurdenError> {
    let request = ApiRequest::Post {
        path: DELETE_ACCOUNTS_PATH,
        body: request_body(ids, options),
    };
    let body = transport.send(request).await?;
    let decoded = envelope::decode_parts::<DeletionPayload>(&body, DecodeMode::Strict)?;

    let deleted = decoded.payload.deleted_accounts.len();
    if deleted < ids.len() {
        debug!(
            requested = ids.len(),
            deleted,
            "server deleted a subset of the requested accounts"
        );
    }
    info!(
        status_code = decoded.status_code,
        deleted,
        permanent = options.permanent,
        "securden delete request answered"
    );

    let message = decoded.failure_message().to_owned();
    Ok(DeletionOutcome {
        status_code: decoded.status_code,
        message,
        report: DeletionReport {
            message: decoded.message,
            deleted_ids: decoded.payload.deleted_accounts,
        },
    })
}
