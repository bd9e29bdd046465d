//! Port for account credentials: lookup, first-login binding, and the
//! administrative create/reset operations.

use async_trait::async_trait;

use crate::domain::{CredentialRecord, FriendGroup, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential store adapters.
    pub enum CredentialRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "credential store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// `create_user` found an existing record.
        AlreadyExists { username: String } => "user '{username}' already exists",
        /// `reset_password` found no record.
        NotFound { username: String } => "user '{username}' does not exist",
    }
}

/// Result of attempting the unset → digest transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// This call stored the digest.
    Bound,
    /// The password was already bound (or the account vanished); nothing
    /// was written.
    AlreadyBound,
}

/// Credential store contract shared by every storage backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Fetch the record for `username`, if provisioned.
    async fn get_user_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<CredentialRecord>, CredentialRepositoryError>;

    /// Store `digest` only if the account is still unset.
    ///
    /// Implementations must make the check and the write a single atomic
    /// step so concurrent callers see exactly one [`BindOutcome::Bound`].
    async fn set_user_credentials(
        &self,
        username: &Username,
        digest: &str,
    ) -> Result<BindOutcome, CredentialRepositoryError>;

    /// Provision an account awaiting its first login.
    async fn create_user(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
    ) -> Result<(), CredentialRepositoryError>;

    /// Return an existing account to the unset state.
    async fn reset_password(&self, username: &Username) -> Result<(), CredentialRepositoryError>;
}
