//! Driving port for the location-sharing use-cases exposed over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AuthenticatedUser, Error, LocationFix, Rect, Username};

/// Label derived for one group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendLabel {
    /// Member the label describes.
    pub username: Username,
    /// `moving`, a rectangle name, or `unknown`.
    pub label: String,
}

/// Domain use-case port for publishing and reading group locations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationSharing: Send + Sync {
    /// Store the caller's fix when it is a location message, then return the
    /// latest fix of every other group member tagged with `tid`.
    async fn publish(
        &self,
        caller: &AuthenticatedUser,
        message: LocationFix,
    ) -> Result<Vec<LocationFix>, Error>;

    /// Replace the rectangle set.
    async fn replace_rects(&self, rects: Vec<Rect>) -> Result<(), Error>;

    /// Current rectangles in stored order.
    async fn rects(&self) -> Result<Vec<Rect>, Error>;

    /// Labels for every member of the caller's group with a stored fix.
    async fn friend_labels(&self, caller: &AuthenticatedUser) -> Result<Vec<FriendLabel>, Error>;

    /// One angle per configured clock hand, in configured order.
    async fn hand_angles(&self, caller: &AuthenticatedUser) -> Result<Vec<f64>, Error>;
}
