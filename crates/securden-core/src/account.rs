//! Single-account resolution.
//!
//! Both lookup modes share one request/decode pipeline against
//! `GET /api/get_account_details_dict` and differ only in how the decoded
//! payload is projected:
//!
//! - [`AccountRecord`] — fixed set of typed secret attributes.
//! - [`AccountAttributes`] — identity fields plus an open-ended attribute map.
//!
//! Malformed response bodies are not fatal here: they decode as an empty
//! envelope and surface as a status-0 failure.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::criteria::AccountCriteria;
use crate::envelope::{self, DecodeMode};
use crate::error::SecurdenError;
use crate::transport::{ApiRequest, Transport};

/// Account lookup endpoint.
pub const ACCOUNT_DETAILS_PATH: &str = "/api/get_account_details_dict";

/// A resolved account with its typed secret attributes.
///
/// Attributes the account type does not carry come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub account_id: i64,
    #[serde(deserialize_with = "lenient_text")]
    pub account_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub account_title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub password: String,
    #[serde(deserialize_with = "lenient_text")]
    pub key_value: String,
    #[serde(deserialize_with = "lenient_text")]
    pub private_key: String,
    #[serde(deserialize_with = "lenient_text")]
    pub putty_private_key: String,
    #[serde(deserialize_with = "lenient_text")]
    pub passphrase: String,
    #[serde(deserialize_with = "lenient_text")]
    pub ppk_passphrase: String,
    #[serde(deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(deserialize_with = "lenient_text")]
    pub client_id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub client_secret: String,
    #[serde(deserialize_with = "lenient_text")]
    pub account_alias: String,
    #[serde(deserialize_with = "lenient_text")]
    pub account_file: String,
    #[serde(deserialize_with = "lenient_text")]
    pub oracle_sid: String,
    #[serde(deserialize_with = "lenient_text")]
    pub oracle_service_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub default_database: String,
    #[serde(deserialize_with = "lenient_text")]
    pub port: String,
}

/// A resolved account as identity fields plus every other scalar attribute
/// the server returned, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountAttributes {
    pub account_id: i64,
    pub account_name: String,
    pub account_title: String,
    pub account_type: String,
    pub attributes: BTreeMap<String, String>,
}

impl AccountAttributes {
    /// Build from the raw payload object.
    ///
    /// Identity fields are lifted out; `null`, arrays and nested objects are
    /// skipped; numbers and booleans are rendered as strings.
    fn from_payload(payload: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut account = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "account_id" => account.account_id = as_i64(&value),
                "account_name" => {
                    account.account_name = scalar_string(&value).unwrap_or_default();
                }
                "account_title" => {
                    account.account_title = scalar_string(&value).unwrap_or_default();
                }
                "account_type" => {
                    account.account_type = scalar_string(&value).unwrap_or_default();
                }
                _ => {
                    if let Some(text) = scalar_string(&value) {
                        account.attributes.insert(key, text);
                    }
                }
            }
        }
        account
    }
}

fn scalar_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar attributes may arrive as strings, numbers (ports) or `null`.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_string).unwrap_or_default())
}

/// Account ids arrive as numbers from most endpoints and as strings from some.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, as_i64))
}

fn as_i64(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or_default(),
        serde_json::Value::String(s) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}

/// Issue the lookup and decode the envelope into `T`.
async fn fetch<T>(transport: &dyn Transport, criteria: &AccountCriteria) -> Result<T, SecurdenError>
where
    T: DeserializeOwned + Default,
{
    let request = ApiRequest::Get {
        path: ACCOUNT_DETAILS_PATH,
        query: criteria.to_query(),
    };
    let body = transport.send(request).await?;
    let (payload, _message) = envelope::decode::<T>(&body, DecodeMode::Lenient)?.into_result()?;
    Ok(payload)
}

/// Resolve one account into its typed attribute set.
///
/// The caller is expected to have checked
/// [`AccountCriteria::ensure_identifiable`] first.
///
/// # Errors
///
/// Returns [`SecurdenError::Transport`] if the request fails, or
/// [`SecurdenError::Api`] when the server's `status_code` is not 200
/// (including 0 for an unparseable body).
pub async fn resolve(
    transport: &dyn Transport,
    criteria: &AccountCriteria,
) -> Result<AccountRecord, SecurdenError> {
    let record: AccountRecord = fetch(transport, criteria).await?;
    debug!(account_id = record.account_id, "resolved securden account");
    Ok(record)
}

/// Resolve one account into identity fields plus an attribute map.
///
/// # Errors
///
/// Same as [`resolve`].
pub async fn resolve_attributes(
    transport: &dyn Transport,
    criteria: &AccountCriteria,
) -> Result<AccountAttributes, SecurdenError> {
    let payload: serde_json::Map<String, serde_json::Value> = fetch(transport, criteria).await?;
    let account = AccountAttributes::from_payload(payload);
    debug!(
        account_id = account.account_id,
        attributes = account.attributes.len(),
        "resolved securden account attributes"
    );
    Ok(account)
}
