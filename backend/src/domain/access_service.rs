//! Basic-Auth verification with claim-on-first-login binding.
//!
//! Accounts are provisioned with an unset password. The first request that
//! names such an account binds whatever password it presents; every later
//! request must present the same password. When two first logins race, the
//! credential store lets exactly one bind succeed and the loser is checked
//! against the winner's digest.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccessControl, BindOutcome, CredentialRepository, CredentialRepositoryError,
};
use crate::domain::{AuthenticatedUser, BasicCredentials, Error, StoredPassword, hash_password};

/// Message carried by every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// [`AccessControl`] implementation over a [`CredentialRepository`].
#[derive(Clone)]
pub struct AccessService {
    credentials: Arc<dyn CredentialRepository>,
}

impl AccessService {
    /// Create the service over a credential store.
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { credentials }
    }

    async fn bind_first_password(
        &self,
        credentials: &BasicCredentials,
        caller: AuthenticatedUser,
    ) -> Result<AuthenticatedUser, Error> {
        let username = credentials.username();
        let digest = hash_password(credentials.password());
        match self
            .credentials
            .set_user_credentials(username, &digest)
            .await
            .map_err(map_credentials_error)?
        {
            BindOutcome::Bound => {
                info!(username = %username, "password bound on first login");
                Ok(caller)
            }
            BindOutcome::AlreadyBound => {
                // Another request bound first; only its password is valid now.
                let current = self
                    .credentials
                    .get_user_credentials(username)
                    .await
                    .map_err(map_credentials_error)?;
                match current {
                    Some(record) if record.hashed_password.verify(credentials.password()) => {
                        Ok(AuthenticatedUser {
                            username: username.clone(),
                            friend_group: record.friend_group,
                        })
                    }
                    _ => {
                        warn!(username = %username, "lost first-login bind race");
                        Err(Error::unauthorized(UNAUTHORIZED_MESSAGE))
                    }
                }
            }
        }
    }
}

fn map_credentials_error(error: CredentialRepositoryError) -> Error {
    Error::internal(format!("credential lookup failed: {error}"))
}

#[async_trait]
impl AccessControl for AccessService {
    async fn authenticate(
        &self,
        credentials: &BasicCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let username = credentials.username();
        let Some(record) = self
            .credentials
            .get_user_credentials(username)
            .await
            .map_err(map_credentials_error)?
        else {
            debug!(username = %username, "unknown user");
            return Err(Error::unauthorized(UNAUTHORIZED_MESSAGE));
        };

        let caller = AuthenticatedUser {
            username: username.clone(),
            friend_group: record.friend_group,
        };
        match record.hashed_password {
            StoredPassword::Unset => self.bind_first_password(credentials, caller).await,
            stored if stored.verify(credentials.password()) => Ok(caller),
            StoredPassword::Digest(_) => {
                debug!(username = %username, "password mismatch");
                Err(Error::unauthorized(UNAUTHORIZED_MESSAGE))
            }
        }
    }
}
