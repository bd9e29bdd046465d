//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`Storage`]) are implemented by outbound
//! adapters; driving ports ([`AccessControl`], [`LocationSharing`]) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_control;
mod credential_repository;
mod geofence_repository;
mod location_repository;
mod location_sharing;
mod storage;

#[cfg(test)]
pub use access_control::MockAccessControl;
pub use access_control::AccessControl;
#[cfg(test)]
pub use credential_repository::MockCredentialRepository;
pub use credential_repository::{BindOutcome, CredentialRepository, CredentialRepositoryError};
#[cfg(test)]
pub use geofence_repository::MockGeofenceRepository;
pub use geofence_repository::{GeofenceRepository, GeofenceRepositoryError};
#[cfg(test)]
pub use location_repository::MockLocationRepository;
pub use location_repository::{LocationRepository, LocationRepositoryError};
#[cfg(test)]
pub use location_sharing::MockLocationSharing;
pub use location_sharing::{FriendLabel, LocationSharing};
pub use storage::{Storage, StorageInitError, StoragePorts};
