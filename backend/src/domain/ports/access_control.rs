//! Driving port for request authentication.
//!
//! Inbound adapters hand over decoded Basic credentials and receive the
//! caller's identity, without knowing how passwords are stored or bound.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, BasicCredentials, Error};

/// Domain use-case port for authenticating a request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Validate credentials, binding the password on an account's first
    /// login, and return the caller's identity.
    ///
    /// Fails with [`crate::domain::ErrorCode::Unauthorized`] for unknown
    /// users and wrong passwords.
    async fn authenticate(
        &self,
        credentials: &BasicCredentials,
    ) -> Result<AuthenticatedUser, Error>;
}
