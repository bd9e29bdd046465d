//! Location sharing use-cases: publish, rectangles, labels, and clock hands.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    FriendLabel, GeofenceRepository, GeofenceRepositoryError, LocationRepository,
    LocationRepositoryError, LocationSharing,
};
use crate::domain::{
    AuthenticatedUser, ClockConfig, Error, LabelingConfig, LocationFix, MemberLocation, Rect,
    label_location,
};

/// [`LocationSharing`] implementation over the location and geofence stores.
#[derive(Clone)]
pub struct TrackingService {
    locations: Arc<dyn LocationRepository>,
    geofences: Arc<dyn GeofenceRepository>,
    clock: Arc<ClockConfig>,
    labeling: LabelingConfig,
}

impl TrackingService {
    /// Create the service with the clock configuration fixed for its
    /// lifetime.
    pub fn new(
        locations: Arc<dyn LocationRepository>,
        geofences: Arc<dyn GeofenceRepository>,
        clock: ClockConfig,
    ) -> Self {
        let labeling = clock.labeling();
        Self {
            locations,
            geofences,
            clock: Arc::new(clock),
            labeling,
        }
    }

    async fn group_locations(
        &self,
        caller: &AuthenticatedUser,
    ) -> Result<Vec<MemberLocation>, Error> {
        self.locations
            .get_user_locations_in_group(&caller.friend_group)
            .await
            .map_err(map_locations_error)
    }

    async fn current_rects(&self) -> Result<Vec<Rect>, Error> {
        self.geofences.get_rects().await.map_err(map_geofences_error)
    }
}

fn map_locations_error(error: LocationRepositoryError) -> Error {
    Error::internal(format!("location store failed: {error}"))
}

fn map_geofences_error(error: GeofenceRepositoryError) -> Error {
    Error::internal(format!("geofence store failed: {error}"))
}

#[async_trait]
impl LocationSharing for TrackingService {
    async fn publish(
        &self,
        caller: &AuthenticatedUser,
        message: LocationFix,
    ) -> Result<Vec<LocationFix>, Error> {
        if message.is_location() {
            self.locations
                .save_user_location(&caller.username, &caller.friend_group, &message)
                .await
                .map_err(map_locations_error)?;
        } else {
            debug!(
                username = %caller.username,
                message_type = message.message_type().unwrap_or("<none>"),
                "ignoring non-location message"
            );
        }

        let members = self.group_locations(caller).await?;
        Ok(members
            .iter()
            .filter(|member| member.username != caller.username)
            .map(|member| member.location.with_tid(&member.username))
            .collect())
    }

    async fn replace_rects(&self, rects: Vec<Rect>) -> Result<(), Error> {
        self.geofences
            .save_rects(&rects)
            .await
            .map_err(map_geofences_error)
    }

    async fn rects(&self) -> Result<Vec<Rect>, Error> {
        self.current_rects().await
    }

    async fn friend_labels(&self, caller: &AuthenticatedUser) -> Result<Vec<FriendLabel>, Error> {
        let members = self.group_locations(caller).await?;
        let rects = self.current_rects().await?;
        Ok(members
            .into_iter()
            .map(|member| FriendLabel {
                label: label_location(&member.location, &rects, &self.labeling).to_string(),
                username: member.username,
            })
            .collect())
    }

    async fn hand_angles(&self, caller: &AuthenticatedUser) -> Result<Vec<f64>, Error> {
        let members = self.group_locations(caller).await?;
        let rects = self.current_rects().await?;
        let by_user: HashMap<_, _> = members
            .iter()
            .map(|member| (&member.username, &member.location))
            .collect();

        Ok(self
            .clock
            .tracked_users
            .iter()
            .map(|username| match by_user.get(username) {
                Some(fix) => self
                    .clock
                    .angle_for(&label_location(fix, &rects, &self.labeling)),
                None => self.clock.error_angle(),
            })
            .collect())
    }
}
