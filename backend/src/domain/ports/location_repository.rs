//! Port for latest-fix storage, one record per user.

use async_trait::async_trait;

use crate::domain::{FriendGroup, LocationFix, MemberLocation, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by location store adapters.
    pub enum LocationRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "location store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "location store query failed: {message}",
    }
}

/// Location store contract shared by every storage backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Replace the user's latest fix (last write wins).
    async fn save_user_location(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
        location: &LocationFix,
    ) -> Result<(), LocationRepositoryError>;

    /// Every stored fix belonging to a member of `friend_group`, in no
    /// particular order.
    async fn get_user_locations_in_group(
        &self,
        friend_group: &FriendGroup,
    ) -> Result<Vec<MemberLocation>, LocationRepositoryError>;
}
