//! Outbound adapters implementing the storage ports.
//!
//! - **file_store**: JSON documents in a local directory, for single-process
//!   deployments and development.
//! - **persistence**: PostgreSQL via Diesel, for deployments that share state
//!   across processes.
//!
//! Adapters translate between domain types and their storage representation.
//! They contain no business logic.

pub mod file_store;
pub mod persistence;

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{StorageInitError, StoragePorts};
use crate::settings::StorageBackend;

use self::file_store::JsonFileStorage;
use self::persistence::{DieselStorage, PoolConfig};

/// Build and initialise the selected backend.
///
/// # Errors
///
/// Returns [`StorageInitError`] when the backend cannot be reached or its
/// data cannot be loaded or migrated.
pub async fn open_storage(backend: &StorageBackend) -> Result<StoragePorts, StorageInitError> {
    let ports = match backend {
        StorageBackend::File { data_dir } => {
            StoragePorts::from_backend(Arc::new(JsonFileStorage::new(data_dir.clone())))
        }
        StorageBackend::Postgres {
            database_url,
            max_size,
        } => {
            let config = PoolConfig::new(database_url.clone()).with_max_size(*max_size);
            StoragePorts::from_backend(Arc::new(DieselStorage::connect(config).await?))
        }
    };
    ports.backend.initialize().await?;
    info!(backend = ports.backend.backend_name(), "storage ready");
    Ok(ports)
}
