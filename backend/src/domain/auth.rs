//! Authentication primitives: Basic credentials and stored password state.
//!
//! Keep header parsing and digest comparison here so the HTTP adapter only
//! forwards raw header values and the storage adapters only persist strings.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{FriendGroup, Username};

/// Stored value marking an account whose password binds on first login.
pub const UNSET_PASSWORD: &str = "tbd";

/// Reasons an `Authorization` header could not be turned into credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsParseError {
    /// The scheme was not `Basic`.
    #[error("authorization scheme must be Basic")]
    UnsupportedScheme,
    /// The token was not valid base64.
    #[error("basic credentials are not valid base64")]
    InvalidEncoding,
    /// The decoded token was not UTF-8.
    #[error("basic credentials are not valid UTF-8")]
    InvalidUtf8,
    /// The decoded token had no `:` separator.
    #[error("basic credentials must contain ':'")]
    MissingSeparator,
    /// The username part was empty.
    #[error("basic credentials carry an empty username")]
    EmptyUsername,
}

/// Username and password decoded from `Authorization: Basic ...`.
///
/// The password is everything after the first `:` and may itself contain
/// colons or be empty.
///
/// # Examples
/// ```
/// use grouptrack::domain::BasicCredentials;
///
/// // "alice:pw"
/// let creds = BasicCredentials::from_header("Basic YWxpY2U6cHc=").unwrap();
/// assert_eq!(creds.username().as_str(), "alice");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl BasicCredentials {
    /// Parse an `Authorization` header value.
    pub fn from_header(value: &str) -> Result<Self, CredentialsParseError> {
        let (scheme, token) = value
            .trim()
            .split_once(' ')
            .ok_or(CredentialsParseError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(CredentialsParseError::UnsupportedScheme);
        }

        let decoded = Zeroizing::new(
            STANDARD
                .decode(token.trim())
                .map_err(|_| CredentialsParseError::InvalidEncoding)?,
        );
        let text = std::str::from_utf8(&decoded).map_err(|_| CredentialsParseError::InvalidUtf8)?;
        let (username, password) = text
            .split_once(':')
            .ok_or(CredentialsParseError::MissingSeparator)?;
        let username = Username::new(username).map_err(|_| CredentialsParseError::EmptyUsername)?;

        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Construct credentials directly, bypassing header parsing.
    pub fn new(username: Username, password: &str) -> Self {
        Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        }
    }

    /// The claimed account.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The presented password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Lowercase hex SHA-256 digest of `password`, the stored password format.
///
/// # Examples
/// ```
/// use grouptrack::domain::hash_password;
///
/// assert_eq!(
///     hash_password("pw"),
///     "30c952fab122c3f9759f02a6d95c3758b246b4fee239957b2d4fee46e26170c4"
/// );
/// ```
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Password column state: either unset (claim on first login) or a digest.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StoredPassword {
    /// Any password is accepted once and then bound.
    Unset,
    /// Hex SHA-256 digest of the bound password.
    Digest(String),
}

impl StoredPassword {
    /// Interpret a stored column value.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw == UNSET_PASSWORD {
            Self::Unset
        } else {
            Self::Digest(raw)
        }
    }

    /// Digest for a freshly bound password.
    pub fn for_password(password: &str) -> Self {
        Self::Digest(hash_password(password))
    }

    /// The value written to storage.
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Unset => UNSET_PASSWORD,
            Self::Digest(digest) => digest.as_str(),
        }
    }

    /// Whether the account still awaits its first login.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Byte-for-byte comparison of the presented password's digest.
    ///
    /// Always false for [`StoredPassword::Unset`]; binding is decided by the
    /// caller, not here.
    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Unset => false,
            Self::Digest(digest) => hash_password(password) == *digest,
        }
    }
}

impl From<String> for StoredPassword {
    fn from(value: String) -> Self {
        Self::from_stored(value)
    }
}

impl From<StoredPassword> for String {
    fn from(value: StoredPassword) -> Self {
        value.as_stored().to_owned()
    }
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Digest(_) => f.write_str("Digest(<redacted>)"),
        }
    }
}

/// Identity established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The account that authenticated.
    pub username: Username,
    /// The group taken from the credential record.
    pub friend_group: FriendGroup,
}
