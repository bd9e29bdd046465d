//! Account identity: usernames, friend groups, and credential records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::auth::StoredPassword;

/// Validation errors returned by the identity newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username contained a colon, which the Basic scheme cannot carry.
    #[error("username must not contain ':'")]
    UsernameContainsColon,
    /// Friend group was empty once trimmed.
    #[error("friend group must not be empty")]
    EmptyFriendGroup,
}

/// Account name used as the key of credential and location records.
///
/// ## Invariants
/// - Non-empty.
/// - Contains no `:` so it round-trips through `Authorization: Basic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use grouptrack::domain::Username;
    ///
    /// assert!(Username::new("alice").is_ok());
    /// assert!(Username::new("").is_err());
    /// assert!(Username::new("a:b").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.contains(':') {
            return Err(UserValidationError::UsernameContainsColon);
        }
        Ok(Self(raw))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Partition key shared by accounts that may see each other's locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FriendGroup(String);

impl FriendGroup {
    /// Validate and construct a [`FriendGroup`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyFriendGroup);
        }
        Ok(Self(raw))
    }

    /// Borrow the group name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FriendGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FriendGroup {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FriendGroup> for String {
    fn from(value: FriendGroup) -> Self {
        value.0
    }
}

/// Stored account: password state plus group membership.
///
/// Serialises as `{"hashed_password": "...", "friend_group": "..."}`, the
/// per-user value of `users.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Digest or the unset sentinel.
    pub hashed_password: StoredPassword,
    /// Group whose locations this account may read.
    pub friend_group: FriendGroup,
}

impl CredentialRecord {
    /// A freshly provisioned account awaiting its first login.
    pub fn provisioned(friend_group: FriendGroup) -> Self {
        Self {
            hashed_password: StoredPassword::Unset,
            friend_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("bob:builder", UserValidationError::UsernameContainsColon)]
    fn username_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Username::new(raw).expect_err("invalid"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    fn friend_group_rejects_blank_values(#[case] raw: &str) {
        assert_eq!(
            FriendGroup::new(raw).expect_err("invalid"),
            UserValidationError::EmptyFriendGroup
        );
    }

    #[rstest]
    fn credential_record_uses_stored_layout() {
        let record = CredentialRecord::provisioned(FriendGroup::new("g1").expect("group"));
        let value = serde_json::to_value(&record).expect("serialise");
        assert_eq!(value, json!({ "hashed_password": "tbd", "friend_group": "g1" }));
    }
}
