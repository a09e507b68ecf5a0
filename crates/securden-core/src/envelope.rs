//! Decoder for the Securden JSON response envelope.
//!
//! Every API response is one flat JSON object mixing domain fields (account
//! attributes, a passwords map, ...) with three control fields:
//!
//! ```json
//! { "status_code": 403, "message": "generic", "error": { "code": 12, "message": "forbidden" } }
//! ```
//!
//! Only `status_code == 200` is success. On failure the nested
//! `error.message` wins over the flat `message` when it is non-empty; the two
//! are filled by different server code paths.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SecurdenError;

/// The only `status_code` treated as success.
pub const STATUS_OK: i64 = 200;

/// How tolerant to be of bodies that do not match the expected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Field by field: a control field of the wrong type reads as its zero
    /// value, a payload that does not fit reads as the payload's default, and
    /// a body that is not JSON at all reads as an empty envelope (status 0).
    /// Used by single-account lookups.
    Lenient,
    /// Any mismatch fails with [`SecurdenError::Decode`].
    Strict,
}

/// Canonical decoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeResult<T> {
    /// `status_code == 200`. `message` is whatever the server sent alongside.
    Success { payload: T, message: String },
    /// Any other status, including 0 when the body carried none.
    Failure { status_code: i64, message: String },
}

impl<T> EnvelopeResult<T> {
    /// Turn a failure into [`SecurdenError::Api`], keeping its code and message.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Api`] for [`EnvelopeResult::Failure`].
    pub fn into_result(self) -> Result<(T, String), SecurdenError> {
        match self {
            Self::Success { payload, message } => Ok((payload, message)),
            Self::Failure {
                status_code,
                message,
            } => Err(SecurdenError::Api {
                status_code,
                message,
            }),
        }
    }
}

/// Every field of a decoded envelope, whatever its status.
///
/// Callers that act on the payload of a non-200 answer (bulk deletion with
/// status 0) start from here; everyone else goes through [`decode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded<T> {
    pub status_code: i64,
    /// Flat `message`.
    pub message: String,
    /// Nested `error.message`.
    pub error_message: String,
    pub payload: T,
}

impl<T> Decoded<T> {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    /// Nested `error.message` when non-empty, flat `message` otherwise.
    pub fn failure_message(&self) -> &str {
        if self.error_message.is_empty() {
            &self.message
        } else {
            &self.error_message
        }
    }

    pub fn into_envelope_result(self) -> EnvelopeResult<T> {
        if self.is_success() {
            return EnvelopeResult::Success {
                payload: self.payload,
                message: self.message,
            };
        }
        let message = self.failure_message().to_owned();
        EnvelopeResult::Failure {
            status_code: self.status_code,
            message,
        }
    }
}

/// Nested `error` object.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorDetail {
    /// Integer on some endpoints, string on others; kept for logging only.
    #[serde(deserialize_with = "null_as_default")]
    code: Value,
    #[serde(deserialize_with = "null_as_default")]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope<T> {
    #[serde(flatten)]
    payload: T,
    #[serde(default, deserialize_with = "null_as_default")]
    status_code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    error: ErrorDetail,
}

/// Decode a response body into an [`EnvelopeResult`].
///
/// Missing or `null` control fields take their zero value and unknown fields
/// are ignored. `null` in payload fields is accepted where the payload type
/// declares it (see [`null_as_default`]).
///
/// # Errors
///
/// Returns [`SecurdenError::Decode`] in [`DecodeMode::Strict`] when the body
/// is not a JSON object of the expected shape.
pub fn decode<T>(body: &[u8], mode: DecodeMode) -> Result<EnvelopeResult<T>, SecurdenError>
where
    T: DeserializeOwned + Default,
{
    Ok(decode_parts(body, mode)?.into_envelope_result())
}

/// Decode a response body, keeping the payload whatever the status.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_parts<T>(body: &[u8], mode: DecodeMode) -> Result<Decoded<T>, SecurdenError>
where
    T: DeserializeOwned + Default,
{
    let decoded = match mode {
        DecodeMode::Strict => {
            let envelope =
                serde_json::from_slice::<Envelope<T>>(body).map_err(SecurdenError::Decode)?;
            if !envelope.error.message.is_empty() {
                debug!(error_code = %envelope.error.code, "securden reported nested error");
            }
            Decoded {
                status_code: envelope.status_code,
                message: envelope.message,
                error_message: envelope.error.message,
                payload: envelope.payload,
            }
        }
        DecodeMode::Lenient => decode_lenient(body),
    };

    debug!(status_code = decoded.status_code, "decoded securden envelope");
    Ok(decoded)
}

fn decode_lenient<T>(body: &[u8]) -> Decoded<T>
where
    T: DeserializeOwned + Default,
{
    let mut fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            warn!(kind = json_kind(&other), "ignoring non-object securden response body");
            return Decoded::default();
        }
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "ignoring malformed securden response body");
            return Decoded::default();
        }
    };

    let status_code = fields
        .remove("status_code")
        .as_ref()
        .and_then(Value::as_i64)
        .unwrap_or_default();
    let message = take_string(&mut fields, "message");
    let error_message = fields
        .remove("error")
        .as_ref()
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();

    let payload = serde_json::from_value::<T>(Value::Object(fields)).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring securden payload that does not fit the expected shape");
        T::default()
    });

    Decoded {
        status_code,
        message,
        error_message,
        payload,
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize `null` as the type's zero value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
