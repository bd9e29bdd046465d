//! Storage facade: the three stores plus backend lifecycle.
//!
//! A backend is selected once at startup and held for the life of the
//! process. Callers observe backends only through latency and through the
//! concurrency guarantees each one documents for password binding.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CredentialRepository, GeofenceRepository, LocationRepository, define_port_error};

define_port_error! {
    /// Errors raised while preparing a backend for use.
    pub enum StorageInitError {
        /// Data could not be read or the directory could not be created.
        Io { message: String } => "storage initialisation failed: {message}",
        /// The remote store could not be reached.
        Connection { message: String } => "storage connection failed: {message}",
        /// Schema migrations failed.
        Migration { message: String } => "storage migration failed: {message}",
    }
}

/// A complete storage backend.
#[async_trait]
pub trait Storage: CredentialRepository + LocationRepository + GeofenceRepository {
    /// Idempotent setup. Missing data is empty state, not an error.
    async fn initialize(&self) -> Result<(), StorageInitError>;

    /// Short name used in logs (`file`, `postgres`).
    fn backend_name(&self) -> &'static str;
}

/// One backend viewed through each of its ports.
///
/// Services depend on the narrow port they need; the lifecycle handle keeps
/// the facade available for `initialize`.
#[derive(Clone)]
pub struct StoragePorts {
    /// Backend lifecycle and name.
    pub backend: Arc<dyn Storage>,
    /// Credential store view.
    pub credentials: Arc<dyn CredentialRepository>,
    /// Location store view.
    pub locations: Arc<dyn LocationRepository>,
    /// Geofence store view.
    pub geofences: Arc<dyn GeofenceRepository>,
}

impl StoragePorts {
    /// Split a concrete backend into its port views.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: Storage + 'static,
    {
        Self {
            backend: backend.clone(),
            credentials: backend.clone(),
            locations: backend.clone(),
            geofences: backend,
        }
    }
}
