//! Client core for the Securden privileged-account vault.
//!
//! Resolves account records (passwords, keys, passphrases, connection
//! metadata) over the Securden HTTP API, fetches passwords in bulk, and
//! deletes accounts in bulk. Every operation is one request and one decoded
//! outcome; there is no caching and no retry.
//!
//! # Example
//!
//! ```rust,no_run
//! use securden_core::{AccountCriteria, AuthContext, SecurdenClient};
//!
//! # async fn example() -> Result<(), securden_core::SecurdenError> {
//! let client = SecurdenClient::new(AuthContext::from_env()?)?;
//! let criteria = AccountCriteria::by_name("root").with_reason("nightly backup");
//! criteria.ensure_identifiable()?;
//! let account = client.resolve_account(&criteria).await?;
//! assert!(!account.account_name.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod criteria;
pub mod deletion;
pub mod envelope;
pub mod error;
pub mod passwords;
pub mod transport;

#[cfg(test)]
mod testing;

pub use account::{AccountAttributes, AccountRecord};
pub use config::AuthContext;
pub use criteria::AccountCriteria;
pub use deletion::{DeleteOptions, DeletionOutcome, DeletionReport};
pub use envelope::{DecodeMode, Decoded, EnvelopeResult};
pub use error::SecurdenError;
pub use passwords::PasswordBatch;
pub use transport::{ApiRequest, HttpTransport, Transport};

use std::sync::Arc;

/// Securden API client.
///
/// Holds the connection settings fixed at construction and the transport
/// every operation goes through. Cheap to clone.
#[derive(Clone)]
pub struct SecurdenClient {
    auth: Arc<AuthContext>,
    transport: Arc<dyn Transport>,
}

impl SecurdenClient {
    /// Create a client that talks HTTP to `auth.server_url()`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Transport`] if the HTTP client cannot be built.
    pub fn new(auth: AuthContext) -> Result<Self, SecurdenError> {
        let auth = Arc::new(auth);
        let transport = HttpTransport::new(Arc::clone(&auth))?;
        Ok(Self {
            auth,
            transport: Arc::new(transport),
        })
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(auth: AuthContext, transport: Arc<dyn Transport>) -> Self {
        Self {
            auth: Arc::new(auth),
            transport,
        }
    }

    /// Connection settings this client was built with.
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Resolve one account into its typed attribute set.
    ///
    /// # Errors
    ///
    /// See [`account::resolve`].
    pub async fn resolve_account(
        &self,
        criteria: &AccountCriteria,
    ) -> Result<AccountRecord, SecurdenError> {
        account::resolve(self.transport.as_ref(), criteria).await
    }

    /// Resolve one account into identity fields plus an attribute map.
    ///
    /// # Errors
    ///
    /// See [`account::resolve_attributes`].
    pub async fn resolve_account_attributes(
        &self,
        criteria: &AccountCriteria,
    ) -> Result<AccountAttributes, SecurdenError> {
        account::resolve_attributes(self.transport.as_ref(), criteria).await
    }

    /// Fetch passwords for several accounts, keyed by account id.
    ///
    /// # Errors
    ///
    /// See [`passwords::resolve_passwords`].
    pub async fn resolve_passwords<S: AsRef<str> + Sync>(
        &self,
        ids: &[S],
    ) -> Result<PasswordBatch, SecurdenError> {
        passwords::resolve_passwords(self.transport.as_ref(), ids).await
    }

    /// Delete several accounts.
    ///
    /// # Errors
    ///
    /// See [`deletion::delete_accounts`].
    pub async fn delete_accounts(
        &self,
        ids: &[i64],
        options: &DeleteOptions,
    ) -> Result<DeletionOutcome, SecurdenError> {
        deletion::delete_accounts(self.transport.as_ref(), ids, options).await
    }
}

impl std::fmt::Debug for SecurdenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurdenClient")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
