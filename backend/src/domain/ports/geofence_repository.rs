//! Port for the global rectangle set.

use async_trait::async_trait;

use crate::domain::Rect;

use super::define_port_error;

define_port_error! {
    /// Errors raised by geofence store adapters.
    pub enum GeofenceRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "geofence store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "geofence store query failed: {message}",
    }
}

/// Geofence store contract: whole-collection replace and read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeofenceRepository: Send + Sync {
    /// Replace every rectangle, preserving the given order.
    async fn save_rects(&self, rects: &[Rect]) -> Result<(), GeofenceRepositoryError>;

    /// The current rectangles in stored order; empty when none were saved.
    async fn get_rects(&self) -> Result<Vec<Rect>, GeofenceRepositoryError>;
}
