//! Per-command severity rules for API outcomes.
//!
//! Each command decides for itself whether a failed call is a warning (print
//! and carry on, exit 0) or a hard error (exit non-zero):
//!
//! | command                          | warning                        | hard error       |
//! |----------------------------------|--------------------------------|------------------|
//! | `account`, `account-attributes`  | any failure                    | missing criteria |
//! | `passwords`                      | none                           | any failure      |
//! | `delete-accounts`                | status not in {200, 0}, I/O    | none             |

use anyhow::{Result, bail};
use securden_core::{DeletionOutcome, DeletionReport, SecurdenError};

/// What a command should do with an API outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Print the value.
    Value(T),
    /// Print `"<code> - <message>"` as a warning and print nothing else.
    Warning(String),
}

fn describe(err: &SecurdenError) -> String {
    format!("{} - {}", err.status_code(), err.message())
}

/// Account lookups: every failure, transport errors included, is a warning.
pub fn account<T>(result: Result<T, SecurdenError>) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Value(value),
        Err(err) => Outcome::Warning(describe(&err)),
    }
}

/// Batch passwords: every failure is a hard error.
pub fn passwords<T>(result: Result<T, SecurdenError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => bail!("{}", describe(&err)),
    }
}

/// Deletion: status 200 and status 0 both print the server's report;
/// any other status, and any transport or decode failure, is a warning.
pub fn deletion(result: Result<DeletionOutcome, SecurdenError>) -> Outcome<DeletionReport> {
    match result {
        Ok(outcome) if outcome.is_success() || outcome.is_no_response() => {
            Outcome::Value(outcome.report)
        }
        Ok(outcome) => Outcome::Warning(format!("{} - {}", outcome.status_code, outcome.message)),
        Err(err) => Outcome::Warning(describe(&err)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api(status_code: i64, message: &str) -> SecurdenError {
        SecurdenError::Api {
            status_code,
            message: message.to_owned(),
        }
    }

    #[test]
    fn account_failure_is_warning() {
        let outcome = account::<()>(Err(api(404, "Account not found")));
        assert_eq!(outcome, Outcome::Warning("404 - Account not found".to_owned()));
    }

    #[test]
    fn account_zero_status_is_still_warning() {
        let outcome = account::<()>(Err(api(0, "")));
        assert_eq!(outcome, Outcome::Warning("0 - ".to_owned()));
    }

    #[test]
    fn passwords_failure_is_error() {
        let err = passwords::<()>(Err(SecurdenError::Validation(
            "Invalid account ID format: invalid digit found in string".to_owned(),
        )))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "400 - Invalid account ID format: invalid digit found in string"
        );
    }

    fn answered(status_code: i64, message: &str, deleted_ids: Vec<i64>) -> DeletionOutcome {
        DeletionOutcome {
            status_code,
            message: message.to_owned(),
            report: DeletionReport {
                message: message.to_owned(),
                deleted_ids,
            },
        }
    }

    #[test]
    fn deletion_zero_status_prints_server_report() {
        let outcome = deletion(Ok(answered(0, "Accounts deleted", vec![5])));
        assert_eq!(
            outcome,
            Outcome::Value(DeletionReport {
                message: "Accounts deleted".to_owned(),
                deleted_ids: vec![5],
            })
        );
    }

    #[test]
    fn deletion_success_prints_report() {
        let outcome = deletion(Ok(answered(200, "Deleted", vec![1, 2])));
        assert_eq!(
            outcome,
            Outcome::Value(DeletionReport {
                message: "Deleted".to_owned(),
                deleted_ids: vec![1, 2],
            })
        );
    }

    #[test]
    fn deletion_rejection_is_warning() {
        let outcome = deletion(Ok(answered(403, "Not permitted to delete", vec![])));
        assert_eq!(outcome, Outcome::Warning("403 - Not permitted to delete".to_owned()));
    }

    #[test]
    fn deletion_decode_failure_is_warning() {
        let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let outcome = deletion(Err(SecurdenError::Decode(err)));
        let Outcome::Warning(msg) = outcome else {
            unreachable!("expected a warning");
        };
        assert!(msg.starts_with("500 - Failed to parse response"), "{msg}");
    }
}
