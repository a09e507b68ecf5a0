//! Error types for `securden-core`.
//!
//! Every operation reports one of five failure classes. Each class maps onto
//! the `(status_code, message)` pair the host layer turns into warnings or
//! hard errors. Messages never include the auth token or secret values.

/// Status code reported for input rejected before any request is sent.
pub const STATUS_VALIDATION: i64 = 400;

/// Status code reported for transport and decode failures.
pub const STATUS_INTERNAL: i64 = 500;

/// All errors produced by the Securden client core.
#[derive(Debug, thiserror::Error)]
pub enum SecurdenError {
    /// Missing auth token or server URL. Fatal to every later call.
    #[error("securden config error: {0}")]
    Config(String),

    /// Malformed input or missing identifying criteria, caught before any
    /// network call.
    #[error("{0}")]
    Validation(String),

    /// Request construction, network, or body-read failure.
    #[error("Error in API call: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body is not a JSON envelope.
    #[error("Failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The server reported `status_code != 200`.
    #[error("{status_code} - {message}")]
    Api {
        /// `status_code` from the envelope; `0` when the body carried none.
        status_code: i64,
        /// Message chosen by the envelope's error precedence rule.
        message: String,
    },
}

impl SecurdenError {
    /// Status code surfaced to the host layer.
    pub fn status_code(&self) -> i64 {
        match self {
            Self::Validation(_) => STATUS_VALIDATION,
            Self::Config(_) | Self::Transport(_) | Self::Decode(_) => STATUS_INTERNAL,
            Self::Api { status_code, .. } => *status_code,
        }
    }

    /// Human-readable message surfaced to the host layer.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// True when the server gave no usable status (`status_code == 0`).
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::Api { status_code: 0, .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = SecurdenError::Validation("Invalid account ID format: x".to_owned());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid account ID format: x");
    }

    #[test]
    fn decode_maps_to_500_with_prefix() {
        let cause = serde_json::from_slice::<serde_json::Value>(b"{oops").unwrap_err();
        let err = SecurdenError::Decode(cause);
        assert_eq!(err.status_code(), 500);
        assert!(err.message().starts_with("Failed to parse response: "));
    }

    #[test]
    fn api_error_keeps_server_code_and_message() {
        let err = SecurdenError::Api {
            status_code: 404,
            message: "not found".to_owned(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "not found");
        assert_eq!(err.to_string(), "404 - not found");
        assert!(!err.is_no_response());
    }

    #[test]
    fn zero_status_is_no_response() {
        let err = SecurdenError::Api {
            status_code: 0,
            message: String::new(),
        };
        assert!(err.is_no_response());
    }
}
